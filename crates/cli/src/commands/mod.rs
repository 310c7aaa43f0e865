//! CLI subcommands.

pub mod admin;
pub mod db;
pub mod seed;

use thiserror::Error;

use emporium_storefront::config::{ConfigError, StoreConfig, StorefrontConfig};
use emporium_storefront::db::{MongoStore, StoreError};
use emporium_storefront::services::auth::AuthError;
use emporium_storefront::services::catalog::CatalogError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The command only makes sense against MongoDB.
    #[error("This command requires EMPORIUM_STORE=mongodb")]
    NotMongo,

    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Load the server configuration and connect to its MongoDB deployment.
async fn connect() -> Result<(StorefrontConfig, MongoStore), CliError> {
    let config = StorefrontConfig::from_env()?;
    let StoreConfig::MongoDb(mongo) = &config.store else {
        return Err(CliError::NotMongo);
    };

    tracing::info!(database = %mongo.database, "Connecting to MongoDB...");
    let store = MongoStore::connect(mongo).await?;
    Ok((config, store))
}
