//! Database maintenance commands.

use super::{CliError, connect};

/// Create the unique indexes on `Users` and `Products`.
///
/// Safe to run repeatedly; existing indexes are left alone.
///
/// # Errors
///
/// Returns an error if configuration is invalid or MongoDB rejects the
/// index build (for example because duplicates already exist).
pub async fn indexes() -> Result<(), CliError> {
    let (_, store) = connect().await?;

    let names = store.ensure_indexes().await?;
    for name in &names {
        tracing::info!(index = %name, "Index ready");
    }
    tracing::info!(count = names.len(), "Indexes created");

    Ok(())
}
