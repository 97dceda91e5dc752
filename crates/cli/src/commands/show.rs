//! `plansmith show` — Print a stored schedule.

use plansmith_config::AppConfig;
use plansmith_core::store::ScheduleStore;

pub async fn run(user_id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let store = super::open_store(&config).await?;

    if !store.user_exists(user_id).await? {
        return Err(format!("user {user_id} not found").into());
    }

    match store.load_schedule(user_id).await? {
        Some(schedule) => println!("{}", serde_json::to_string_pretty(&schedule)?),
        None => println!("No schedule stored for user {user_id}"),
    }
    Ok(())
}
