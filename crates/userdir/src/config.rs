use std::env;

/// Application configuration loaded from environment variables.
///
/// The listening port is handled by the CLI (`--port`, `APP_PORT`) in
/// `main.rs`.
#[derive(Debug, Clone)]
pub struct Config {
    /// AWS region for the DynamoDB client (default: "us-east-1")
    pub region: String,
    /// DynamoDB table name (default: "userdir")
    pub table_name: String,
    /// Admin token guarding the read/update/list/delete routes.
    /// `None` when unset or empty; guarded routes then reject every request
    /// instead of degrading to no auth.
    pub admin_token: Option<String>,
    /// Environment label echoed by `GET /` (default: "")
    pub env: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `APP_REGION` - AWS region (default: "us-east-1")
    /// - `APP_TABLE_NAME` - DynamoDB table name (default: "userdir")
    /// - `APP_ADMIN_TOKEN` - admin token; no default
    /// - `APP_ENV` - environment label (default: "")
    pub fn from_env() -> Self {
        Self {
            region: env::var("APP_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            table_name: env::var("APP_TABLE_NAME").unwrap_or_else(|_| "userdir".to_string()),
            admin_token: env::var("APP_ADMIN_TOKEN").ok().filter(|t| !t.is_empty()),
            env: env::var("APP_ENV").unwrap_or_default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
