use anyhow::Context;
use particle_playground::config::ConfigStore;
use particle_playground::icon::IconPipeline;
use particle_playground::messages::ResponseMessage;
use particle_playground::palette::Palette;
use particle_playground::prefetch::spawn_prefetcher;
use particle_playground::{constant, logger};
use std::time::Duration;
use tracing::{error, info, warn};

const PREFETCH_TIMEOUT: Duration = Duration::from_secs(30);

fn main() -> anyhow::Result<()> {
    logger::init();
    info!("{} starting", constant::APP_NAME);

    let config = ConfigStore::load().context("Failed to load settings")?;
    info!(
        "Window {}x{}, cursor {}",
        config.get_int(&["window", "width"], constant::DEFAULT_WINDOW_WIDTH),
        config.get_int(&["window", "height"], constant::DEFAULT_WINDOW_HEIGHT),
        config.get_int(&["cursor", "size"], constant::DEFAULT_CURSOR_SIZE),
    );

    let mut palette = Palette::initial()?;
    palette.restore_selection(&config);
    if let Some(selected) = palette.selected() {
        info!("Selected group: {}", palette.node(selected).display_name);
    }

    let pipeline = IconPipeline::from_config(&config, IconPipeline::platform_cache_root()?);
    info!(
        "Icon cache at {:?}, {}px icons",
        pipeline.cache_root(),
        pipeline.icon_size()
    );

    // Warm the cache off the main thread; entries keep a placeholder until resolved
    let mut prefetcher = spawn_prefetcher(pipeline);
    let queued = prefetcher.request_palette(&palette);
    for _ in 0..queued {
        match prefetcher.recv_timeout(PREFETCH_TIMEOUT) {
            Some(ResponseMessage::IconResolved { id, key, result }) => match result {
                Ok(icon) => info!(
                    "Icon {} ready at {} ({}x{})",
                    id,
                    key,
                    icon.width(),
                    icon.height()
                ),
                Err(e) => warn!("Icon {} unavailable, using placeholder: {}", id, e),
            },
            None => {
                error!("Timed out waiting for palette icons");
                break;
            }
        }
    }

    Ok(())
}
