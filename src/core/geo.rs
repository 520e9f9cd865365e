use serde::{Deserialize, Serialize};

use crate::core::constants::MAX_LATITUDE;

/// A geographical coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    /// Creates a new coordinate
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Validates that the coordinates are within valid ranges.
    /// The poles themselves are not projectable.
    pub fn is_valid(&self) -> bool {
        self.lat > -90.0 && self.lat < 90.0 && self.lon >= -180.0 && self.lon <= 180.0
    }

    /// Clamps latitude to the Web Mercator band
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Wraps longitude into `[-180, 180]`; values already in range are kept as is
    pub fn wrap_lon(lon: f64) -> f64 {
        if (-180.0..=180.0).contains(&lon) {
            lon
        } else {
            (lon + 180.0).rem_euclid(360.0) - 180.0
        }
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a point in projected (Mercator meter) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pixel position in the unbounded scene plane.
///
/// The origin is the north-west corner of tile (0, 0); one tile spans
/// `tile_size` scene pixels at the zoom the point was projected with.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenePoint {
    pub x: f64,
    pub y: f64,
}

impl ScenePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns this point moved by `(dx, dy)` pixels
    pub fn offset(&self, dx: f64, dy: f64) -> ScenePoint {
        ScenePoint::new(self.x + dx, self.y + dy)
    }

    /// Integer cache key for this point, rounded to the nearest pixel
    pub fn key(&self) -> PixelKey {
        PixelKey::new(self.x.round() as i64, self.y.round() as i64)
    }
}

/// Integer scene pixel position, used to key tiles in a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PixelKey {
    pub px: i64,
    pub py: i64,
}

impl PixelKey {
    pub fn new(px: i64, py: i64) -> Self {
        Self { px, py }
    }
}

/// Integer tile address in the slippy map scheme.
///
/// Coordinates are signed: the visible-set enumeration can step outside the
/// world at the edges, and those tiles are only rejected when a source
/// validates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i64,
    pub y: i64,
    pub zoom: i32,
}

impl TileCoord {
    pub fn new(x: i64, y: i64, zoom: i32) -> Self {
        Self { x, y, zoom }
    }

    /// Number of tiles per edge at this zoom (`2^zoom`), `None` for negative or huge zooms
    pub fn tiles_per_edge(zoom: i32) -> Option<u64> {
        if (0..63).contains(&zoom) {
            Some(1u64 << zoom)
        } else {
            None
        }
    }

    /// Fractional form of this tile's north-west corner
    pub fn to_fractional(&self) -> FractionalTile {
        FractionalTile::new(self.x as f64, self.y as f64, self.zoom as f64)
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Tile-space position with fractional x/y (and zoom), used for intermediate math
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FractionalTile {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl FractionalTile {
    pub fn new(x: f64, y: f64, zoom: f64) -> Self {
        Self { x, y, zoom }
    }

    /// The integer tile containing this position
    pub fn containing_tile(&self) -> TileCoord {
        TileCoord::new(
            self.x.floor() as i64,
            self.y.floor() as i64,
            self.zoom.floor() as i32,
        )
    }
}

/// Half-open rectangle of tile indices at a fixed zoom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BBox {
    pub xmin: i64,
    pub ymin: i64,
    pub xmax: i64,
    pub ymax: i64,
}

impl BBox {
    pub fn new(xmin: i64, ymin: i64, xmax: i64, ymax: i64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    pub fn width(&self) -> i64 {
        (self.xmax - self.xmin).max(0)
    }

    pub fn height(&self) -> i64 {
        (self.ymax - self.ymin).max(0)
    }

    /// Number of tiles covered
    pub fn area(&self) -> i64 {
        self.width() * self.height()
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.xmin && x < self.xmax && y >= self.ymin && y < self.ymax
    }
}
