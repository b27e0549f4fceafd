//! Application state management

use std::sync::Arc;

use crate::{
    config::Config,
    store::{GoalRepository, StoreHandle, SurrealGoalRepository},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    goals: Arc<dyn GoalRepository>,
    store: StoreHandle,
}

impl AppState {
    /// Create an AppState over an existing store handle
    pub fn new(config: Config, store: StoreHandle) -> Self {
        Self {
            config: Arc::new(config),
            goals: Arc::new(SurrealGoalRepository::new(store.clone())),
            store,
        }
    }

    /// Create a new builder
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Goal persistence
    pub fn goals(&self) -> &dyn GoalRepository {
        self.goals.as_ref()
    }

    /// Shared store handle, used to release the connection at shutdown
    pub fn store(&self) -> &StoreHandle {
        &self.store
    }
}

/// Builder for AppState
///
/// Without an explicit store handle, `build` starts the background store
/// connection described by the configuration and returns immediately.
pub struct AppStateBuilder {
    config: Option<Config>,
    store: Option<StoreHandle>,
    goals: Option<Arc<dyn GoalRepository>>,
}

impl AppStateBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: None,
            store: None,
            goals: None,
        }
    }

    /// Set the configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Use an existing store handle instead of connecting
    pub fn store(mut self, store: StoreHandle) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the goal repository
    pub fn repository(mut self, goals: Arc<dyn GoalRepository>) -> Self {
        self.goals = Some(goals);
        self
    }

    /// Build the AppState
    ///
    /// Must be called from within a Tokio runtime when no store handle was
    /// given, since the connection attempt is spawned onto it.
    pub fn build(self) -> AppState {
        let config = self.config.unwrap_or_default();

        let store = self
            .store
            .unwrap_or_else(|| StoreHandle::connect_in_background(&config.store));

        let goals = self
            .goals
            .unwrap_or_else(|| Arc::new(SurrealGoalRepository::new(store.clone())));

        AppState {
            config: Arc::new(config),
            goals,
            store,
        }
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
