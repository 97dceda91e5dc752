//! `plansmith users` — Account management.

use plansmith_config::AppConfig;
use plansmith_core::store::ScheduleStore;

pub async fn add(username: String) -> Result<(), Box<dyn std::error::Error>> {
    let username = username.trim();
    if username.is_empty() {
        return Err("username cannot be empty".into());
    }

    let config = AppConfig::load()?;
    let store = super::open_store(&config).await?;
    let id = store.create_user(username).await?;

    println!("✅ Created user '{username}' with id {id}");
    Ok(())
}
