use crate::{
    core::{config::TileSourceConfig, constants::DEFAULT_MAX_ZOOM, geo::TileCoord},
    TileError,
};

/// A templated tile source: URL pattern plus validity bounds
#[derive(Debug, Clone, PartialEq)]
pub struct TileSource {
    url_template: String,
    max_zoom: i32,
}

impl TileSource {
    /// Creates a source from a template containing `{x}`, `{y}` and `{z}`
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }

    pub fn with_max_zoom(mut self, max_zoom: i32) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    pub fn from_config(config: &TileSourceConfig) -> Self {
        Self::new(config.url_template.clone()).with_max_zoom(config.max_zoom)
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    pub fn max_zoom(&self) -> i32 {
        self.max_zoom
    }

    /// Whether this source can serve tile `(x, y, zoom)`
    pub fn validate_tile(&self, x: i64, y: i64, zoom: i32) -> bool {
        validate_tile(x, y, zoom, self.max_zoom)
    }

    /// Same as [`validate_tile`](Self::validate_tile) but as a typed result
    pub fn check_tile(&self, x: i64, y: i64, zoom: i32) -> Result<TileCoord, TileError> {
        if self.validate_tile(x, y, zoom) {
            Ok(TileCoord::new(x, y, zoom))
        } else {
            Err(TileError::InvalidTileIndex { x, y, zoom })
        }
    }

    /// URL for a tile of this source
    pub fn url(&self, coord: TileCoord) -> String {
        build_url(&self.url_template, coord.x, coord.y, coord.zoom)
    }
}

/// Bounds check shared by every source: indices in `[0, 2^zoom)`, zoom in `[0, max_zoom]`
pub fn validate_tile(x: i64, y: i64, zoom: i32, max_zoom: i32) -> bool {
    if x < 0 || y < 0 || zoom < 0 {
        return false;
    }
    if zoom > max_zoom {
        return false;
    }
    let Some(tiles_per_edge) = TileCoord::tiles_per_edge(zoom) else {
        return false;
    };
    (x as u64) < tiles_per_edge && (y as u64) < tiles_per_edge
}

/// Substitutes the first `{x}`, `{y}` and `{z}` of `template` with decimal indices
pub fn build_url(template: &str, x: i64, y: i64, z: i32) -> String {
    template
        .replacen("{x}", &x.to_string(), 1)
        .replacen("{y}", &y.to_string(), 1)
        .replacen("{z}", &z.to_string(), 1)
}
