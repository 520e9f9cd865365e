//! Prelude module for common maplet types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use maplet::prelude::*;`

pub use crate::core::{
    camera::{Camera, CameraChange, CameraEvent},
    config::{MapConfig, TileSourceConfig, ViewConfig},
    geo::{GeoPoint, PixelKey, ScenePoint, TileCoord},
    map::MapView,
    projection::{
        geo_zoom_to_scene_point, geo_zoom_to_tile, scene_point_to_geo_zoom, tile_to_geo_zoom,
    },
};

pub use crate::layers::{
    group::LayerGroup,
    layer::{DrawableItem, ItemId, Layer},
    node::{LayerEvent, LayerId, LayerNode},
    tile::TileLayer,
};

pub use crate::tiles::{
    decode::TileImage, loader::TileServices, source::TileSource, tile::FetchState,
    visible::VisibleSetCalculator,
};

pub use crate::rendering::surface::SceneSurface;
pub use crate::runtime::{AsyncSpawner, InlineSpawner, QueuedSpawner};
pub use crate::traits::{RenderSurface, TileDecoder, TileFetcher};

#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::TokioSpawner;

#[cfg(feature = "render")]
pub use crate::tiles::decode::ImageDecoder;

pub use crate::{MapError, Result};
