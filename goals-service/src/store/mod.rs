//! Document store access
//!
//! - [`connection`] resolves the connection string from configuration
//! - [`client`] owns the shared, possibly empty, client handle
//! - [`repository`] implements goal persistence on top of it

pub mod client;
pub mod connection;
pub mod repository;

pub use client::{create_client, StoreHandle, SurrealClient};
pub use connection::{resolve, ConnectionSource, ConnectionString};
pub use repository::{GoalRepository, SurrealGoalRepository};
