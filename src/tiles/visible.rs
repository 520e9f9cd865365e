//! Visible tile set computation.
//!
//! The calculator is source-agnostic: it enumerates the full padded rectangle
//! around the camera, including indices outside the world. Sources reject
//! those later, before anything is fetched.

use serde::{Deserialize, Serialize};

use crate::core::{
    camera::Camera,
    constants::{PADDING_TILES, TILE_SIZE},
    geo::{BBox, PixelKey, TileCoord},
    projection::geo_zoom_to_scene_point,
};

/// One entry of a visible set: tile index plus the scene pixel of its north-west corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileInfo {
    pub x: i64,
    pub y: i64,
    pub zoom: i32,
    pub px: i64,
    pub py: i64,
}

impl TileInfo {
    pub fn coord(&self) -> TileCoord {
        TileCoord::new(self.x, self.y, self.zoom)
    }

    pub fn key(&self) -> PixelKey {
        PixelKey::new(self.px, self.py)
    }
}

/// Computes which tiles must be on screen for a viewport and a camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleSetCalculator {
    tile_size: u32,
}

impl Default for VisibleSetCalculator {
    fn default() -> Self {
        Self::new(TILE_SIZE)
    }
}

impl VisibleSetCalculator {
    pub fn new(tile_size: u32) -> Self {
        Self { tile_size }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Half-open tile rectangle covering the viewport plus one tile of padding.
    ///
    /// Lower bounds use `floor` and upper bounds `ceil`, so a camera sitting
    /// exactly on a tile edge is still fully covered.
    pub fn bbox(&self, width: u32, height: u32, camera: &Camera) -> BBox {
        let tile_size = self.tile_size as f64;
        let center = geo_zoom_to_scene_point(camera.at_tile_zoom(), self.tile_size);

        let padding = (self.tile_size * PADDING_TILES) as f64;
        let client_width = width as f64 + padding;
        let client_height = height as f64 + padding;

        BBox::new(
            ((center.x - client_width / 2.0) / tile_size).floor() as i64,
            ((center.y - client_height / 2.0) / tile_size).floor() as i64,
            ((center.x + client_width / 2.0) / tile_size).ceil() as i64,
            ((center.y + client_height / 2.0) / tile_size).ceil() as i64,
        )
    }

    /// Every tile of [`bbox`](Self::bbox), column by column, with its scene position
    pub fn compute(&self, width: u32, height: u32, camera: &Camera) -> Vec<TileInfo> {
        let zoom = camera.tile_zoom();
        let bbox = self.bbox(width, height, camera);

        let tile_size = i64::from(self.tile_size);

        let mut tiles = Vec::with_capacity(bbox.area() as usize);
        for x in bbox.xmin..bbox.xmax {
            for y in bbox.ymin..bbox.ymax {
                // Exact form of projecting the tile corner to the scene. The
                // projected form saturates at the poles for rows off the world.
                tiles.push(TileInfo {
                    x,
                    y,
                    zoom,
                    px: x * tile_size,
                    py: y * tile_size,
                });
            }
        }
        tiles
    }

    /// Number of tiles [`compute`](Self::compute) would return
    pub fn tile_count(&self, width: u32, height: u32, camera: &Camera) -> usize {
        self.bbox(width, height, camera).area() as usize
    }
}
