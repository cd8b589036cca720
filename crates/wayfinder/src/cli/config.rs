//! `wayfinder config`: resolved paths and the effective engine config.

use std::path::PathBuf;
use wayfinder_engine::EngineConfig;

pub struct ConfigArgs {
    pub json: bool,
    pub config_path: Option<PathBuf>,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let home = wayfinder_logging::wayfinder_home();
    let logs = wayfinder_logging::logs_dir();
    let config_path = args
        .config_path
        .clone()
        .unwrap_or_else(wayfinder::default_config_path);
    let config: EngineConfig = super::load_config(args.config_path.as_deref())?;

    if args.json {
        let output = serde_json::json!({
            "home": home.to_string_lossy(),
            "logs": {
                "path": logs.to_string_lossy(),
                "exists": logs.exists(),
            },
            "config_file": {
                "path": config_path.to_string_lossy(),
                "exists": config_path.exists(),
            },
            "engine": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("WAYFINDER CONFIGURATION");
    println!("=======================");
    println!();
    println!("Home:     {}", home.display());
    println!(
        "Logs:     {} ({})",
        logs.display(),
        if logs.exists() { "exists" } else { "not found" }
    );
    println!(
        "Config:   {} ({})",
        config_path.display(),
        if config_path.exists() { "loaded" } else { "not found, using defaults" }
    );
    println!();
    println!("Engine");
    println!("  max_alternative_routes:   {}", config.max_alternative_routes);
    println!("  initial_zoom:             {}", config.initial_zoom);
    println!(
        "  custom model single band: < {} m",
        config.custom_model.single_request_max_leg_m
    );
    println!("  custom model limit:       {} m", config.custom_model.max_leg_m);
    println!(
        "  navigation proximity:     {} m",
        config.navigation.proximity_threshold_m
    );
    Ok(())
}
