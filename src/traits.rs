//! Capabilities the viewer consumes from its host.
//!
//! The viewer never talks to the network, an image codec or a drawing API
//! directly; it is handed implementations of these traits instead.

use async_trait::async_trait;

use crate::{
    layers::layer::{DrawableItem, ItemId},
    tiles::decode::TileImage,
    TileError,
};

/// Fetches raw tile bytes for a URL
#[async_trait]
pub trait TileFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, TileError>;
}

/// Turns fetched bytes into a raster that can be drawn
pub trait TileDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> std::result::Result<TileImage, TileError>;
}

/// The surface drawable items end up on
pub trait RenderSurface {
    /// Add an item, or replace the item with the same id
    fn add_item(&mut self, item: &DrawableItem);

    /// Remove an item. Unknown ids are ignored.
    fn remove_item(&mut self, id: ItemId);
}
