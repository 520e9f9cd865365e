#![allow(dead_code)]

use std::sync::Arc;

use maplet::{
    runtime::AsyncSpawner,
    testing::{FixtureFetcher, RawDecoder},
    Camera, LayerNode, MapView, SceneSurface, TileServices, TileSourceConfig, ViewConfig,
};

pub const BASE: &str = "mem://base/{z}/{x}/{y}";
pub const OVERLAY: &str = "mem://overlay/{z}/{x}/{y}";

pub fn saint_petersburg() -> Camera {
    Camera::new(30.3223, 59.9292, 12.0)
}

pub fn services(fetcher: FixtureFetcher, spawner: impl AsyncSpawner) -> TileServices {
    TileServices::new(Arc::new(fetcher), Arc::new(RawDecoder), Arc::new(spawner))
}

/// 800x600 view at `camera` with no layers
pub fn view(camera: Camera, services: TileServices) -> MapView {
    let config = ViewConfig {
        camera,
        ..ViewConfig::default()
    };
    MapView::new(config, services, SceneSurface::new()).unwrap()
}

pub fn add_sources(view: &mut MapView) {
    view.add_tile_source(&TileSourceConfig::new(BASE)).unwrap();
    view.add_tile_source(&TileSourceConfig::new(OVERLAY)).unwrap();
}

pub fn pending_tiles(view: &MapView) -> usize {
    view.layers()
        .iter()
        .filter_map(LayerNode::as_tiles)
        .map(|t| t.cache().pending_count())
        .sum()
}
