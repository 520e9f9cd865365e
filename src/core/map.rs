use crate::{
    core::{
        camera::{Camera, CameraChange, CameraController, CameraEvent, SubscriptionId},
        config::{MapConfig, TileSourceConfig, ViewConfig},
        geo::GeoPoint,
        projection::scene_point_to_geo_zoom,
    },
    layers::{
        layer::DrawableItem,
        node::{LayerEvent, LayerId, LayerNode, ViewContext},
        tile::TileLayer,
    },
    rendering::surface::{apply_events, SceneSurface},
    tiles::loader::TileServices,
    traits::RenderSurface,
    MapError, Result,
};

/// The root of a map: camera, viewport, top-level layers and the surface
/// their items are drawn on.
///
/// Every camera or viewport change is forwarded to all top-level layers and
/// the resulting item changes are applied to the surface before returning.
pub struct MapView<S: RenderSurface = SceneSurface> {
    controller: CameraController,
    config: ViewConfig,
    layers: Vec<LayerNode>,
    next_z: i32,
    services: TileServices,
    surface: S,
}

impl<S: RenderSurface> MapView<S> {
    pub fn new(config: ViewConfig, services: TileServices, surface: S) -> Result<Self> {
        config.validate()?;
        let camera = clamp_camera(config.camera, config.max_zoom);
        Ok(Self {
            controller: CameraController::new(camera, config.tile_size),
            config: ViewConfig { camera, ..config },
            layers: Vec::new(),
            next_z: 0,
            services,
            surface,
        })
    }

    /// View with one tile layer per configured source, bottom first
    pub fn from_config(config: MapConfig, services: TileServices, surface: S) -> Result<Self> {
        config.validate()?;
        let mut view = Self::new(config.view, services, surface)?;
        for source in &config.sources {
            view.add_tile_source(source)?;
        }
        Ok(view)
    }

    pub fn camera(&self) -> Camera {
        self.controller.camera()
    }

    /// `(width, height)` in pixels
    pub fn viewport(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn tile_size(&self) -> u32 {
        self.config.tile_size
    }

    pub fn max_zoom(&self) -> i32 {
        self.config.max_zoom
    }

    /// Snapshot handed to layers
    pub fn context(&self) -> ViewContext {
        ViewContext {
            camera: self.controller.camera(),
            width: self.config.width,
            height: self.config.height,
            tile_size: self.config.tile_size,
        }
    }

    /// Moves the camera. Zoom is clamped to `[0, max_zoom]`, latitude to the
    /// Mercator band and longitude wrapped into `[-180, 180]` before the change
    /// is classified.
    pub fn set_camera(&mut self, camera: Camera) -> Result<CameraChange> {
        if !camera.lon.is_finite() || !camera.lat.is_finite() || !camera.zoom.is_finite() {
            return Err(MapError::InvalidCoordinates(format!(
                "camera {:?} is not finite",
                camera
            )));
        }

        let change = self
            .controller
            .set_camera(clamp_camera(camera, self.config.max_zoom));
        if change.is_empty() {
            return Ok(change);
        }

        let ctx = self.context();
        log::debug!(
            "camera -> ({:.6}, {:.6}) z{:.2}",
            ctx.camera.lon,
            ctx.camera.lat,
            ctx.camera.zoom
        );

        let mut events = Vec::new();
        if change.zoom_changed {
            for node in &mut self.layers {
                node.on_view_zoom_changed(&ctx, &mut events);
            }
        }
        if change.pan_changed {
            for node in &mut self.layers {
                node.on_view_lon_lat_changed(&ctx, &mut events);
            }
        }
        self.apply(&events);
        Ok(change)
    }

    /// Drags the map by `(dx, dy)` scene pixels at the current zoom
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Result<CameraChange> {
        let camera = self.camera();
        let target = self.controller.scene_point().offset(dx, dy);
        self.set_camera(scene_point_to_geo_zoom(
            target,
            camera.zoom,
            self.config.tile_size,
        ))
    }

    /// One zoom step in the direction of `delta`. A zero delta does nothing.
    pub fn wheel(&mut self, delta: f64) -> Result<CameraChange> {
        if delta == 0.0 || delta.is_nan() {
            return Ok(CameraChange::default());
        }
        let camera = self.camera();
        self.set_camera(Camera::new(
            camera.lon,
            camera.lat,
            camera.zoom + delta.signum(),
        ))
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == self.viewport() {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        log::debug!("viewport -> {}x{}", width, height);

        let ctx = self.context();
        let mut events = Vec::new();
        for node in &mut self.layers {
            node.on_view_size_changed(&ctx, &mut events);
        }
        self.apply(&events);
    }

    /// Attaches a top-level node above the existing ones.
    ///
    /// The node's z-value is one above every node attached before it, even
    /// removed ones. Items it already owns are drawn immediately, and tile
    /// layers render the current view.
    pub fn add_layer(&mut self, node: impl Into<LayerNode>) -> LayerId {
        let mut node = node.into();
        let z = self.next_z;
        self.next_z += 1;
        node.set_z_value(z, &mut Vec::new());

        let mut events: Vec<LayerEvent> = node
            .items()
            .into_iter()
            .map(LayerEvent::ItemProduced)
            .collect();
        node.refresh(&self.context(), &mut events);
        self.apply(&events);

        let id = node.id();
        log::info!("attached {} at z {}", id, z);
        self.layers.push(node);
        id
    }

    /// Attaches a tile layer for `config` using the view's services
    pub fn add_tile_source(&mut self, config: &TileSourceConfig) -> Result<LayerId> {
        config.validate()?;
        let layer = TileLayer::from_config(config, self.services.clone());
        Ok(self.add_layer(layer))
    }

    /// Adds `node` to the group `group_id`, anywhere in the tree
    pub fn add_to_group(
        &mut self,
        group_id: LayerId,
        node: impl Into<LayerNode>,
    ) -> Result<LayerId> {
        let ctx = self.context();
        let mut events = Vec::new();

        let group = self
            .layers
            .iter_mut()
            .find_map(|n| n.find_mut(group_id))
            .and_then(LayerNode::as_group_mut)
            .ok_or_else(|| MapError::Layer(format!("{} is not a group of this view", group_id)))?;
        let id = group.add_layer(node, &mut events);
        if let Some(child) = group.children_mut().iter_mut().find(|c| c.id() == id) {
            child.refresh(&ctx, &mut events);
        }

        self.apply(&events);
        Ok(id)
    }

    /// Detaches `id` (top-level or nested) and removes its items from the surface
    pub fn remove_layer(&mut self, id: LayerId) -> Result<LayerNode> {
        let mut events = Vec::new();
        let removed = if let Some(index) = self.layers.iter().position(|n| n.id() == id) {
            let mut node = self.layers.remove(index);
            node.teardown(&mut events);
            Some(node)
        } else {
            self.layers
                .iter_mut()
                .filter_map(LayerNode::as_group_mut)
                .find_map(|group| group.remove_layer(id, &mut events))
        };

        let node = removed.ok_or_else(|| MapError::Layer(format!("no layer {}", id)))?;
        self.apply(&events);
        log::info!("detached {}", id);
        Ok(node)
    }

    /// Applies finished fetches of every layer. Returns the number of items produced.
    pub fn process_completions(&mut self) -> usize {
        let mut events = Vec::new();
        let produced: usize = self
            .layers
            .iter_mut()
            .map(|node| node.poll(&mut events))
            .sum();
        self.apply(&events);
        produced
    }

    /// Registers a listener for camera changes
    pub fn subscribe(&mut self, listener: impl FnMut(&CameraEvent) + 'static) -> SubscriptionId {
        self.controller.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.controller.unsubscribe(id)
    }

    /// Every item currently produced by the layer tree
    pub fn items(&self) -> Vec<DrawableItem> {
        self.layers.iter().flat_map(LayerNode::items).collect()
    }

    pub fn layer(&self, id: LayerId) -> Option<&LayerNode> {
        self.layers.iter().find_map(|n| n.find(id))
    }

    pub fn layers(&self) -> &[LayerNode] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn services(&self) -> &TileServices {
        &self.services
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn apply(&mut self, events: &[LayerEvent]) {
        if !events.is_empty() {
            log::trace!("applying {} item events", events.len());
            apply_events(&mut self.surface, events);
        }
    }
}

impl<S: RenderSurface> std::fmt::Debug for MapView<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapView")
            .field("camera", &self.camera())
            .field("viewport", &self.viewport())
            .field("layers", &self.layers.len())
            .finish_non_exhaustive()
    }
}

fn clamp_camera(camera: Camera, max_zoom: i32) -> Camera {
    Camera::new(
        GeoPoint::wrap_lon(camera.lon),
        GeoPoint::clamp_lat(camera.lat),
        camera.zoom.clamp(0.0, max_zoom as f64),
    )
}
