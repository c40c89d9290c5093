use std::path::PathBuf;

use crate::config::ApiConfig;

/// Returns the path to the taskflow database
///
/// An explicit path from the command line or the `[database]` config section
/// wins; otherwise the platform data directory is used.
///
/// # Platform-specific paths
///
/// - **macOS**: `~/Library/Application Support/taskflow/taskflow.db`
/// - **Linux**: `~/.local/share/taskflow/taskflow.db`
/// - **Windows**: `%LOCALAPPDATA%\taskflow\taskflow.db`
pub fn get_db_path(override_path: Option<PathBuf>, config: &ApiConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path);
    }
    if let Some(database) = &config.database {
        return Ok(database.path.clone());
    }

    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(data_dir.join("taskflow").join("taskflow.db"))
}

/// Initialize the database connection
pub fn initialize_database(
    db_path: &std::path::Path,
) -> anyhow::Result<std::sync::Arc<crate::database::Database>> {
    let db = crate::database::Database::new(db_path)?;
    Ok(std::sync::Arc::new(db))
}
