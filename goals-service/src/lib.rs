//! # goals-service
//!
//! HTTP service for creating, listing and deleting short text goals, backed by
//! a SurrealDB document store.
//!
//! ## Features
//!
//! - **Goal resource**: `GET /goals`, `POST /goals`, `DELETE /goals/{id}`
//! - **Degraded mode**: the listener starts immediately; goal operations fail
//!   with a fixed message until (and unless) the store connects
//! - **Connection strings**: explicit URL, or assembled from host and
//!   credentials, or none at all (standalone)
//! - **Access log**: Apache combined format, appended to a file
//! - **Health checks**: liveness and readiness endpoints
//! - **Graceful shutdown**: SIGTERM and SIGINT drain requests, then release the store
//!
//! ## Example
//!
//! ```rust,no_run
//! use goals_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     let _guard = init_tracing(&config)?;
//!
//!     let state = AppState::builder().config(config.clone()).build();
//!
//!     Server::new(config).serve(state).await
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod responses;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{AccessLogConfig, Config, MiddlewareConfig, ServiceConfig, StoreConfig};
    pub use crate::error::{Error, Result, StoreError, StoreErrorKind, StoreOperation};
    pub use crate::health::{health, readiness};
    pub use crate::models::{CreateGoalRequest, CreateGoalResponse, Goal, ListGoalsResponse};
    pub use crate::observability::init_tracing;
    pub use crate::responses::{Created, Message};
    pub use crate::routes::router;
    pub use crate::server::Server;
    pub use crate::state::{AppState, AppStateBuilder};
    pub use crate::store::{GoalRepository, StoreHandle, SurrealGoalRepository};
}
