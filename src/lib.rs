//! # Maplet
//!
//! A Rust-native slippy-map tile viewer core.
//!
//! Given a camera (longitude, latitude, zoom) and a viewport size, maplet works
//! out which Web Mercator tiles are visible, fetches them from templated tile
//! sources and keeps a per-source cache in sync as the camera moves. Tile
//! sources are composed as layers with z-ordering; the drawable items they
//! produce are pushed to an external rendering surface.
//!
//! The window shell, the HTTP transport and the image decoder are injected
//! through the traits in [`traits`].

pub mod core;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod runtime;
pub mod testing;
pub mod tiles;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    camera::{Camera, CameraChange, CameraController, CameraEvent, SubscriptionId},
    config::{MapConfig, TileSourceConfig, ViewConfig},
    geo::{BBox, FractionalTile, GeoPoint, PixelKey, Point, ScenePoint, TileCoord},
    map::MapView,
};

pub use layers::{
    group::LayerGroup,
    layer::{DrawableItem, ItemId, Layer},
    node::{LayerEvent, LayerId, LayerNode, ViewContext},
    tile::TileLayer,
};

pub use tiles::{
    cache::{DiffReport, TileCache},
    decode::TileImage,
    loader::{HttpFetcher, TileServices},
    source::TileSource,
    tile::{FetchState, Tile},
    visible::{TileInfo, VisibleSetCalculator},
};

pub use rendering::surface::SceneSurface;
pub use runtime::{AsyncHandle, AsyncSpawner, InlineSpawner, QueuedSpawner};
#[cfg(feature = "tokio-runtime")]
pub use runtime::TokioSpawner;
pub use traits::{RenderSurface, TileDecoder, TileFetcher};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Errors local to a single tile. They never leave the tile that hit them.
#[derive(Debug, thiserror::Error)]
pub enum TileError {
    #[error("Invalid tile index {zoom}/{x}/{y}")]
    InvalidTileIndex { x: i64, y: i64, zoom: i32 },

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Decode failed: {0}")]
    Decode(String),
}

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Tile error: {0}")]
    Tile(#[from] TileError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Initialise `env_logger` from `RUST_LOG`. Safe to call more than once.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
