//! Application state with repository-based storage.
//!
//! The state is cloned into every request handler and carries the injected
//! repository trait object plus the loaded configuration. Handlers never
//! reach for globals; tests swap in the in-memory backend.

use std::sync::Arc;

use userdir_core::storage::UserRepository;

use crate::config::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// User repository backing every store operation.
    pub users: Arc<dyn UserRepository>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates a new AppState with an explicitly injected repository.
    pub fn new(users: Arc<dyn UserRepository>, config: Config) -> Self {
        Self {
            users,
            config: Arc::new(config),
        }
    }
}

#[cfg(feature = "dynamodb")]
mod dynamodb_backend {
    use super::*;
    use crate::storage::DynamoDbRepository;

    impl AppState {
        /// Creates AppState with the DynamoDB storage backend.
        ///
        /// Uses the AWS SDK default credential chain with the configured
        /// region and table name.
        pub async fn from_env(config: Config) -> Result<Self, anyhow::Error> {
            let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.region.clone()))
                .load()
                .await;
            let client = aws_sdk_dynamodb::Client::new(&aws_config);
            let repo = DynamoDbRepository::new(client, config.table_name.clone());

            tracing::info!(
                table = %config.table_name,
                region = %config.region,
                "Using DynamoDB storage backend"
            );

            Ok(Self::new(Arc::new(repo), config))
        }
    }
}

#[cfg(not(feature = "dynamodb"))]
mod inmemory_backend {
    use super::*;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// Creates AppState with the in-memory storage backend.
        /// Useful for running without any external dependencies.
        pub async fn from_env(config: Config) -> Result<Self, anyhow::Error> {
            tracing::info!("Using in-memory storage backend");
            Ok(Self::new(Arc::new(InMemoryRepository::new()), config))
        }
    }
}
