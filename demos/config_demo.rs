//! Example demonstrating the settings store and icon cache paths
//!
//! Run with: cargo run --example config_demo

use particle_playground::config::{ConfigPaths, ConfigStore};
use particle_playground::icon::IconPipeline;
use particle_playground::palette::Palette;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Particle Playground Settings Demo ===\n");

    let mut config = ConfigStore::load()?;

    println!("Loaded from: {:?}", config.source());
    println!("Config file: {}", config.paths().user_file.display());
    println!(
        "Bundled defaults: {}",
        ConfigPaths::platform()?.bundled_defaults.display()
    );

    println!("\nCurrent settings:");
    println!(
        "  Window: {}x{}",
        config.get_int(&["window", "width"], 800),
        config.get_int(&["window", "height"], 600)
    );
    println!(
        "  Cursor size: {} (max {})",
        config.get_int(&["cursor", "size"], 5),
        config.get_int(&["cursor", "max_size"], 50)
    );

    let launches = config.get_int(&["demo", "launches"], 0) + 1;
    config.set(launches, &["demo", "launches"])?;
    println!("  Demo launches: {}", launches);

    let pipeline = IconPipeline::from_config(&config, IconPipeline::platform_cache_root()?);
    let palette = Palette::initial()?;
    println!("\nIcon cache entries ({}px):", pipeline.icon_size());
    for id in palette.iter_depth_first() {
        let key = palette.cache_key(id, &pipeline);
        println!(
            "  {:<8} {} {}",
            palette.node(id).id,
            key.resolve_in(pipeline.cache_root()).display(),
            if pipeline.is_cached(&key) { "(cached)" } else { "(missing)" }
        );
    }

    println!("\nSettings saved on every change; edit the file by hand or call ConfigStore::set.");

    Ok(())
}
