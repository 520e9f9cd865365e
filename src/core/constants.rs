//! Core constants shared by the projection, the visible-set calculator and the view.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Default deepest zoom level a tile source serves.
pub const DEFAULT_MAX_ZOOM: i32 = 18;

/// Upper bound accepted for any configured `max_zoom` (2^30 tiles per edge still fits in i64 math).
pub const MAX_SUPPORTED_ZOOM: i32 = 30;

/// Web Mercator sphere radius in meters (EPSG:3857).
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude at which the Web Mercator square ends.
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

/// Tiles of padding added around the viewport. Fixed, not configurable.
pub const PADDING_TILES: u32 = 1;

/// Camera the view starts with when nothing else is configured (lon, lat, zoom).
pub const DEFAULT_CAMERA: (f64, f64, f64) = (-3.0, 40.0, 7.0);
