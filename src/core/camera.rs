//! The map camera: the single source of truth for what is visible.

use serde::{Deserialize, Serialize};

use crate::core::{
    geo::{FractionalTile, GeoPoint, ScenePoint},
    projection::{geo_zoom_to_scene_point, geo_zoom_to_tile},
};

/// Camera position: longitude and latitude in degrees plus a real zoom level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub lon: f64,
    pub lat: f64,
    pub zoom: f64,
}

impl Camera {
    pub fn new(lon: f64, lat: f64, zoom: f64) -> Self {
        Self { lon, lat, zoom }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lon, self.lat)
    }

    /// Integer zoom level used to address tiles
    pub fn tile_zoom(&self) -> i32 {
        self.zoom.max(0.0).floor() as i32
    }

    /// Same position, zoom snapped to the tile zoom level
    pub fn at_tile_zoom(&self) -> Camera {
        Camera::new(self.lon, self.lat, self.tile_zoom() as f64)
    }

    pub fn scene_point(&self, tile_size: u32) -> ScenePoint {
        geo_zoom_to_scene_point(*self, tile_size)
    }

    pub fn tile(&self) -> FractionalTile {
        geo_zoom_to_tile(*self)
    }
}

impl Default for Camera {
    fn default() -> Self {
        let (lon, lat, zoom) = crate::core::constants::DEFAULT_CAMERA;
        Self::new(lon, lat, zoom)
    }
}

/// A single classified camera change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraEvent {
    ZoomChanged { zoom: f64 },
    PanChanged { lon: f64, lat: f64 },
}

/// Classification of one `set_camera` call. Both flags may be set at once.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraChange {
    pub zoom_changed: bool,
    pub pan_changed: bool,
    pub old_scene_pos: ScenePoint,
    pub new_scene_pos: ScenePoint,
}

impl CameraChange {
    pub fn is_empty(&self) -> bool {
        !self.zoom_changed && !self.pan_changed
    }

    /// The events this change fires, zoom before pan
    pub fn events(&self, camera: &Camera) -> Vec<CameraEvent> {
        let mut events = Vec::with_capacity(2);
        if self.zoom_changed {
            events.push(CameraEvent::ZoomChanged { zoom: camera.zoom });
        }
        if self.pan_changed {
            events.push(CameraEvent::PanChanged {
                lon: camera.lon,
                lat: camera.lat,
            });
        }
        events
    }
}

/// Handle returned by [`CameraController::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type CameraListener = Box<dyn FnMut(&CameraEvent)>;

/// Owns the current camera and notifies subscribers about classified changes
pub struct CameraController {
    camera: Camera,
    tile_size: u32,
    listeners: Vec<(SubscriptionId, CameraListener)>,
    next_subscription: u64,
}

impl CameraController {
    pub fn new(camera: Camera, tile_size: u32) -> Self {
        Self {
            camera,
            tile_size,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Scene position of the current camera
    pub fn scene_point(&self) -> ScenePoint {
        self.camera.scene_point(self.tile_size)
    }

    /// Registers a listener called once per classified change
    pub fn subscribe(&mut self, listener: impl FnMut(&CameraEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    /// Replaces the camera, classifies the change and notifies subscribers.
    ///
    /// A pan is reported when either longitude or latitude differs, so moving
    /// along a meridian or a parallel still counts.
    pub fn set_camera(&mut self, new: Camera) -> CameraChange {
        let old = self.camera;
        let change = CameraChange {
            zoom_changed: old.zoom != new.zoom,
            pan_changed: old.lon != new.lon || old.lat != new.lat,
            old_scene_pos: old.scene_point(self.tile_size),
            new_scene_pos: new.scene_point(self.tile_size),
        };
        self.camera = new;

        for event in change.events(&new) {
            for (_, listener) in self.listeners.iter_mut() {
                listener(&event);
            }
        }
        change
    }
}

impl std::fmt::Debug for CameraController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraController")
            .field("camera", &self.camera)
            .field("tile_size", &self.tile_size)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
