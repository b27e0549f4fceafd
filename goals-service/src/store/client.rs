//! SurrealDB connection management
//!
//! Supports runtime protocol selection via URL scheme:
//! - `ws://` / `wss://` - WebSocket connections
//! - `http://` / `https://` - HTTP connections
//! - `mem://` - In-memory database (for testing)

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    config::StoreConfig,
    error::{StoreError, StoreOperation, StoreResult},
};

use super::connection::{self, ConnectionString, ConnectionTarget};

/// SurrealDB client type alias using the `Any` engine for runtime protocol selection
pub type SurrealClient = surrealdb::Surreal<surrealdb::engine::any::Any>;

/// Shared, possibly empty, store connection
///
/// Holds `None` until a background connection attempt succeeds, and forever
/// when no store is configured or the attempt fails. Cloning is cheap.
#[derive(Clone, Default)]
pub struct StoreHandle {
    client: Arc<RwLock<Option<SurrealClient>>>,
    configured: bool,
}

impl StoreHandle {
    /// A handle that never connects
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// A handle wrapping an already connected client
    pub fn connected(client: SurrealClient) -> Self {
        Self {
            client: Arc::new(RwLock::new(Some(client))),
            configured: true,
        }
    }

    /// Start connecting in the background and return immediately
    ///
    /// Without a connection string the handle stays empty. A failed attempt is
    /// logged and also leaves the handle empty.
    pub fn connect_in_background(config: &StoreConfig) -> Self {
        let Some(connection) = connection::resolve(config) else {
            tracing::warn!("Standalone mode: no store connection configured");
            return Self::disconnected();
        };

        let handle = Self {
            client: Arc::new(RwLock::new(None)),
            configured: true,
        };

        let slot = handle.client.clone();
        let config = config.clone();

        tokio::spawn(async move {
            tracing::info!(
                source = %connection.source(),
                "Connecting to store at {}",
                connection
            );
            match create_client(&connection, &config).await {
                Ok(client) => {
                    *slot.write().await = Some(client);
                    tracing::info!("Store connection established");
                }
                Err(e) => {
                    tracing::error!("Store connection failed: {}. Serving in degraded mode.", e);
                }
            }
        });

        handle
    }

    /// Whether a connection string was configured for this handle
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Whether a client is currently available
    pub async fn is_connected(&self) -> bool {
        self.client.read().await.is_some()
    }

    /// Get the client for `operation`, or a `NotConnected` error
    ///
    /// Returns a clone; `Surreal` is reference counted internally.
    pub async fn client(&self, operation: StoreOperation) -> StoreResult<SurrealClient> {
        self.client
            .read()
            .await
            .clone()
            .ok_or_else(|| StoreError::not_connected(operation))
    }

    /// Drop the client, returning the handle to degraded mode
    pub async fn close(&self) {
        if self.client.write().await.take().is_some() {
            tracing::info!("Store connection released");
        }
    }
}

/// Create a SurrealDB client with retry logic
///
/// Makes `max_retries + 1` attempts with exponential backoff between them.
pub async fn create_client(
    connection: &ConnectionString,
    config: &StoreConfig,
) -> StoreResult<SurrealClient> {
    let target = connection.target(config);
    let max_retries = config.max_retries;
    let base_delay = config.retry_delay();
    let mut attempt = 0;

    loop {
        match try_create_client(&target).await {
            Ok(client) => {
                if attempt > 0 {
                    tracing::info!(
                        "Store connection established after {} attempt(s)",
                        attempt + 1
                    );
                } else {
                    tracing::info!(
                        "Store connected: url={}, ns={}, db={}",
                        connection,
                        target.namespace,
                        target.database
                    );
                }
                return Ok(client);
            }
            Err(e) => {
                attempt += 1;

                if attempt > max_retries {
                    return Err(e);
                }

                let delay_multiplier = 2_u32.pow(attempt.saturating_sub(1));
                let delay = base_delay * delay_multiplier;

                tracing::warn!(
                    "Store connection attempt {} failed: {}. Retrying in {:?}...",
                    attempt,
                    e,
                    delay
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Attempt to create a SurrealDB client (single try)
async fn try_create_client(target: &ConnectionTarget) -> StoreResult<SurrealClient> {
    let endpoint = connection::sanitize_url(&target.endpoint);
    tracing::debug!("Connecting to SurrealDB: {}", endpoint);

    let client = surrealdb::engine::any::connect(target.endpoint.as_str())
        .await
        .map_err(|e| {
            StoreError::connection_failed(format!(
                "failed to connect to '{}': {}",
                endpoint, e
            ))
        })?;

    if let Some(credentials) = &target.credentials {
        client
            .signin(surrealdb::opt::auth::Root {
                username: &credentials.username,
                password: &credentials.password,
            })
            .await
            .map_err(|e| StoreError::from_surreal(StoreOperation::Connect, &e))?;
    }

    client
        .use_ns(&target.namespace)
        .use_db(&target.database)
        .await
        .map_err(|e| StoreError::from_surreal(StoreOperation::Connect, &e))?;

    Ok(client)
}
