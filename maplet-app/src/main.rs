use std::time::{Duration, Instant};

use maplet::{
    Camera, FetchState, LayerNode, MapConfig, MapView, SceneSurface, TileServices,
    TileSourceConfig, ViewConfig,
};

const SEA_BASE: &str = "http://t2.openseamap.org/tile/{z}/{x}/{y}.png";
const SEA_MARKS: &str = "http://tiles.openseamap.org/seamark/{z}/{x}/{y}.png";
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Headless viewer: loads the visible tiles of a couple of sources around a
/// camera and reports what ended up on the surface.
///
/// Usage: `maplet-app [config.json]`
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    maplet::init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => MapConfig::from_file(path)?,
        None => demo_config(),
    };

    let services = TileServices::http(tokio::runtime::Handle::current())?;
    let mut view = MapView::from_config(config, services, SceneSurface::new())?;
    let camera = view.camera();
    log::info!(
        "lon: {:.6} lat: {:.6} zoom: {:.2}",
        camera.lon,
        camera.lat,
        camera.zoom
    );

    wait_for_tiles(&mut view).await;
    report(&view);

    Ok(())
}

fn demo_config() -> MapConfig {
    MapConfig {
        view: ViewConfig {
            camera: Camera::new(30.3223, 59.9292, 12.0),
            ..ViewConfig::default()
        },
        sources: vec![
            TileSourceConfig {
                name: Some("openseamap".to_string()),
                ..TileSourceConfig::new(SEA_BASE)
            },
            TileSourceConfig {
                name: Some("seamarks".to_string()),
                ..TileSourceConfig::new(SEA_MARKS)
            },
        ],
    }
}

async fn wait_for_tiles(view: &mut MapView) {
    let started = Instant::now();
    loop {
        tokio::select! {
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
            _ = tokio::signal::ctrl_c() => {
                log::warn!("interrupted");
                return;
            }
        }

        let produced = view.process_completions();
        if produced > 0 {
            log::debug!("{} new tiles on the surface", produced);
        }

        let pending: usize = view.layers().iter().map(pending_tiles).sum();
        if pending == 0 {
            log::info!("all tiles settled in {:.1?}", started.elapsed());
            return;
        }
        if started.elapsed() > LOAD_TIMEOUT {
            log::warn!("giving up with {} tiles still pending", pending);
            return;
        }
    }
}

fn pending_tiles(node: &LayerNode) -> usize {
    match node {
        LayerNode::Tiles(tiles) => tiles.cache().pending_count(),
        LayerNode::Group(group) => group.children().iter().map(pending_tiles).sum(),
        LayerNode::Leaf(_) => 0,
    }
}

fn report(view: &MapView) {
    let camera = view.camera();
    let (width, height) = view.viewport();
    println!(
        "camera ({:.4}, {:.4}) zoom {} in {}x{}",
        camera.lon, camera.lat, camera.zoom, width, height
    );
    for node in view.layers() {
        if let LayerNode::Tiles(tiles) = node {
            let cache = tiles.cache();
            println!(
                "  {:<12} z{} loaded {:>3} failed {:>3} pending {:>3}",
                tiles.name().unwrap_or("tiles"),
                tiles.z_value(),
                cache.count_in(FetchState::Loaded),
                cache.count_in(FetchState::Failed),
                cache.count_in(FetchState::Pending),
            );
        }
    }
    println!("  {} items on the surface", view.surface().len());
}
