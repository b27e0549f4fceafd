//! Goal persistence
//!
//! [`GoalRepository`] is the store-agnostic seam the handlers depend on.
//! [`SurrealGoalRepository`] implements it over a [`StoreHandle`], so every
//! call made while the handle is empty fails with `NotConnected`.

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    error::{StoreError, StoreErrorKind, StoreOperation, StoreResult},
    models::Goal,
};

use super::client::StoreHandle;

/// Table holding goal records
pub const GOALS_TABLE: &str = "goals";

const INSERT_GOAL: &str = "CREATE type::table($table) CONTENT { text: $text } RETURN meta::id(id) AS id, text";
const LIST_GOALS: &str = "SELECT meta::id(id) AS id, text FROM type::table($table)";
const DELETE_GOAL: &str = "DELETE type::thing($table, $id)";

/// Persistence operations for goals
#[async_trait]
pub trait GoalRepository: Send + Sync {
    /// Persist a new goal and return it with its store-assigned id
    async fn insert(&self, text: &str) -> StoreResult<Goal>;

    /// Every goal, in store order
    async fn list(&self) -> StoreResult<Vec<Goal>>;

    /// Delete the goal with `id`
    ///
    /// Deleting an id that does not exist succeeds.
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Whether the repository is backed by a configured store
    fn is_configured(&self) -> bool;

    /// Round-trip to the backing store
    async fn ping(&self) -> StoreResult<()>;
}

/// Row shape returned by the goal queries
#[derive(Debug, Deserialize)]
struct GoalRecord {
    id: String,
    text: String,
}

impl From<GoalRecord> for Goal {
    fn from(record: GoalRecord) -> Self {
        Self {
            id: record.id,
            text: record.text,
        }
    }
}

/// SurrealDB-backed goal repository
#[derive(Clone)]
pub struct SurrealGoalRepository {
    store: StoreHandle,
}

impl SurrealGoalRepository {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }
}

fn failed(operation: StoreOperation) -> impl Fn(surrealdb::Error) -> StoreError {
    move |e| StoreError::from_surreal(operation, &e)
}

#[async_trait]
impl GoalRepository for SurrealGoalRepository {
    async fn insert(&self, text: &str) -> StoreResult<Goal> {
        let op = StoreOperation::Insert;
        let client = self.store.client(op).await?;

        let mut response = client
            .query(INSERT_GOAL)
            .bind(("table", GOALS_TABLE))
            .bind(("text", text.to_string()))
            .await
            .map_err(failed(op))?;

        let created: Option<GoalRecord> = response.take(0).map_err(failed(op))?;
        created.map(Goal::from).ok_or_else(|| {
            StoreError::new(
                op,
                StoreErrorKind::QueryFailed,
                "create returned no record",
            )
        })
    }

    async fn list(&self) -> StoreResult<Vec<Goal>> {
        let op = StoreOperation::List;
        let client = self.store.client(op).await?;

        let mut response = client
            .query(LIST_GOALS)
            .bind(("table", GOALS_TABLE))
            .await
            .map_err(failed(op))?;

        let records: Vec<GoalRecord> = response.take(0).map_err(failed(op))?;
        Ok(records.into_iter().map(Goal::from).collect())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let op = StoreOperation::Delete;
        let client = self.store.client(op).await?;

        client
            .query(DELETE_GOAL)
            .bind(("table", GOALS_TABLE))
            .bind(("id", id.to_string()))
            .await
            .map_err(failed(op))?
            .check()
            .map_err(failed(op))?;

        Ok(())
    }

    fn is_configured(&self) -> bool {
        self.store.is_configured()
    }

    async fn ping(&self) -> StoreResult<()> {
        let op = StoreOperation::Connect;
        let client = self.store.client(op).await?;

        client
            .query("RETURN true")
            .await
            .map_err(failed(op))?
            .check()
            .map_err(failed(op))?;

        Ok(())
    }
}
