use crate::{
    core::config::TileSourceConfig,
    layers::{
        layer::DrawableItem,
        node::{LayerEvent, LayerId, ViewContext},
    },
    tiles::{
        cache::{DiffReport, TileCache},
        loader::TileServices,
        source::TileSource,
        visible::VisibleSetCalculator,
    },
};

/// A layer that shows one tile source.
///
/// Pans and resizes diff the cache against the new visible set. A zoom change
/// clears it first: pixel keys of different zoom levels are not comparable.
#[derive(Debug)]
pub struct TileLayer {
    id: LayerId,
    name: Option<String>,
    z: i32,
    source: TileSource,
    cache: TileCache,
}

impl TileLayer {
    pub fn new(source: TileSource, services: TileServices) -> Self {
        Self {
            id: LayerId::next(),
            name: None,
            z: 0,
            source,
            cache: TileCache::new(services),
        }
    }

    pub fn from_config(config: &TileSourceConfig, services: TileServices) -> Self {
        let mut layer = Self::new(TileSource::from_config(config), services);
        layer.name = config.name.clone();
        layer
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn z_value(&self) -> i32 {
        self.z
    }

    pub fn source(&self) -> &TileSource {
        &self.source
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    pub fn set_z_value(&mut self, z: i32, events: &mut Vec<LayerEvent>) {
        self.z = z;
        self.cache.set_z_value(z, events);
    }

    /// Reconciles the cache with the tiles visible in `ctx`
    pub fn render(&mut self, ctx: &ViewContext, events: &mut Vec<LayerEvent>) -> DiffReport {
        let required =
            VisibleSetCalculator::new(ctx.tile_size).compute(ctx.width, ctx.height, &ctx.camera);
        log::trace!(
            "{} needs {} tiles at zoom {}",
            self.id,
            required.len(),
            ctx.camera.tile_zoom()
        );
        self.cache.render_tiles(&required, &self.source, self.z, events)
    }

    pub fn clear_tiles(&mut self, events: &mut Vec<LayerEvent>) -> usize {
        let cleared = self.cache.clear_tiles(events);
        if cleared > 0 {
            log::debug!("{} cleared {} tiles", self.id, cleared);
        }
        cleared
    }

    pub fn process_completions(&mut self, events: &mut Vec<LayerEvent>) -> usize {
        self.cache.process_completions(events)
    }

    pub fn items(&self) -> Vec<DrawableItem> {
        self.cache.items()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::camera::Camera,
        layers::node::LayerNode,
        runtime::QueuedSpawner,
        testing::{FixtureFetcher, RawDecoder},
        tiles::tile::FetchState,
    };
    use std::sync::Arc;

    fn layer(spawner: &QueuedSpawner) -> TileLayer {
        let services = TileServices::new(
            Arc::new(FixtureFetcher::serving_all()),
            Arc::new(RawDecoder),
            Arc::new(spawner.clone()),
        );
        TileLayer::new(TileSource::new("mem://{z}/{x}/{y}"), services)
    }

    fn ctx(camera: Camera) -> ViewContext {
        ViewContext {
            camera,
            width: 800,
            height: 600,
            tile_size: 256,
        }
    }

    #[test]
    fn test_pan_keeps_overlapping_tiles() {
        let spawner = QueuedSpawner::new();
        let mut node = LayerNode::from(layer(&spawner));
        let mut events = Vec::new();

        node.on_view_size_changed(&ctx(Camera::new(30.3223, 59.9292, 12.0)), &mut events);
        spawner.run_pending();
        node.poll(&mut events);
        let before = node.items().len();
        assert!(before > 0);
        events.clear();

        // a fraction of a tile east
        node.on_view_lon_lat_changed(&ctx(Camera::new(30.33, 59.9292, 12.0)), &mut events);
        let tiles = node.as_tiles().unwrap();
        assert!(tiles.cache().count_in(FetchState::Loaded) > 0);
        assert!(events.len() < before);
    }

    #[test]
    fn test_zoom_change_clears_then_renders() {
        let spawner = QueuedSpawner::new();
        let mut node = LayerNode::from(layer(&spawner));
        let mut events = Vec::new();

        node.on_view_size_changed(&ctx(Camera::new(0.0, 0.0, 3.0)), &mut events);
        spawner.run_pending();
        let loaded = node.poll(&mut events);
        assert!(loaded > 0);
        events.clear();

        node.on_view_zoom_changed(&ctx(Camera::new(0.0, 0.0, 4.0)), &mut events);
        let released = events
            .iter()
            .filter(|e| matches!(e, LayerEvent::ItemReleased(_)))
            .count();
        assert_eq!(released, loaded);

        let tiles = node.as_tiles().unwrap();
        assert!(tiles.cache().tiles().all(|t| t.coord().zoom == 4));
        assert_eq!(tiles.cache().pending_count(), tiles.cache().len());
    }

    #[test]
    fn test_from_config_takes_name_and_max_zoom() {
        let config = TileSourceConfig {
            url_template: "mem://{z}/{x}/{y}".to_string(),
            max_zoom: 5,
            name: Some("seamarks".to_string()),
        };
        let spawner = QueuedSpawner::new();
        let services = TileServices::new(
            Arc::new(FixtureFetcher::serving_all()),
            Arc::new(RawDecoder),
            Arc::new(spawner.clone()),
        );
        let mut tiles = TileLayer::from_config(&config, services);
        assert_eq!(tiles.name(), Some("seamarks"));
        assert_eq!(tiles.source().max_zoom(), 5);

        let mut events = Vec::new();
        let report = tiles.render(&ctx(Camera::new(0.0, 0.0, 6.0)), &mut events);
        assert_eq!(report.fetched, 0);
        assert!(report.invalid > 0);
    }
}
