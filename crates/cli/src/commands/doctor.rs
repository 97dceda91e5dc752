//! `plansmith doctor` — Diagnose system health.

use plansmith_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Plansmith Doctor — System Diagnostics");
    println!("=======================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file — using defaults (run `plansmith onboard`)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config file invalid: {e}");
            println!("\n  ⚠️  Fix the config file before running further checks.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ⚠️  No API key configured — add api_key to config.toml or set OPENAI_API_KEY");
        issues += 1;
    }

    let provider = plansmith_providers::build_from_config(&config);
    match provider.health_check().await {
        Ok(true) => println!("  ✅ Provider '{}' reachable at {}", provider.name(), config.api_url),
        Ok(false) => {
            println!(
                "  ❌ Provider '{}' rejected the request at {}",
                provider.name(),
                config.api_url
            );
            issues += 1;
        }
        Err(e) => {
            println!("  ❌ Provider '{}' unreachable: {e}", provider.name());
            issues += 1;
        }
    }

    match super::open_store(&config).await {
        Ok(_) => println!("  ✅ Database ready at {}", config.database_path().display()),
        Err(e) => {
            println!("  ❌ Database could not be opened: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
