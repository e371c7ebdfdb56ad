//! Emitter file validation

use anyhow::Result;
use spark_particles::EmitterConfig;

pub fn run(path: &str, format: &str) -> Result<()> {
    let result = EmitterConfig::load(path).and_then(|config| {
        config.build()?;
        Ok(config)
    });

    if format == "json" {
        let output = match &result {
            Ok(config) => serde_json::json!({
                "file": path,
                "valid": true,
                "max_particles": config.max_particles,
                "time_to_live": config.time_to_live,
                "initializers": config.initializers.len(),
                "modifiers": config.modifiers.len(),
            }),
            Err(e) => serde_json::json!({
                "file": path,
                "valid": false,
                "error": e.to_string(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match &result {
            Ok(config) => {
                println!("{}: OK", path);
                println!(
                    "  {} particle(s), {}ms lifetime, {} initializer(s), {} modifier(s)",
                    config.max_particles,
                    config.time_to_live,
                    config.initializers.len(),
                    config.modifiers.len()
                );
            }
            Err(e) => println!("{}: {}", path, e),
        }
    }

    if result.is_err() {
        std::process::exit(1);
    }
    Ok(())
}
