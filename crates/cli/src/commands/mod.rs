pub mod doctor;
pub mod generate;
pub mod onboard;
pub mod show;
pub mod users;

use plansmith_config::AppConfig;
use plansmith_store::SqliteScheduleStore;

/// Open the SQLite store at the configured path, creating its directory.
pub async fn open_store(
    config: &AppConfig,
) -> Result<SqliteScheduleStore, Box<dyn std::error::Error>> {
    let path = config.database_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = SqliteScheduleStore::new(&format!("sqlite://{}", path.display())).await?;
    Ok(store)
}
