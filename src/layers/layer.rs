use std::sync::atomic::{AtomicU64, Ordering};

use crate::{layers::node::LayerId, tiles::decode::TileImage};

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a drawable item on the render surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    fn next() -> Self {
        Self(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

/// A raster placed in the scene at `(px, py)` with stacking order `z`
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableItem {
    pub id: ItemId,
    pub image: TileImage,
    pub px: i64,
    pub py: i64,
    pub z: i32,
}

/// Leaf layer: owns zero or one drawable item at a position and z-value
#[derive(Debug)]
pub struct Layer {
    id: LayerId,
    px: i64,
    py: i64,
    z: i32,
    item: Option<DrawableItem>,
}

impl Layer {
    pub fn new(px: i64, py: i64, z: i32) -> Self {
        Self {
            id: LayerId::next(),
            px,
            py,
            z,
            item: None,
        }
    }

    /// Leaf that already carries an image
    pub fn with_image(px: i64, py: i64, z: i32, image: TileImage) -> Self {
        let mut layer = Self::new(px, py, z);
        layer.set_item(image);
        layer
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn item(&self) -> Option<&DrawableItem> {
        self.item.as_ref()
    }

    /// Places `image` at the layer's position. Returns the id of the item it replaced.
    pub fn set_item(&mut self, image: TileImage) -> Option<ItemId> {
        let replaced = self.item.as_ref().map(|item| item.id);
        self.item = Some(DrawableItem {
            id: ItemId::next(),
            image,
            px: self.px,
            py: self.py,
            z: self.z,
        });
        replaced
    }

    pub fn take_item(&mut self) -> Option<DrawableItem> {
        self.item.take()
    }

    /// Moves the layer, and its item if any
    pub fn set_pos(&mut self, px: i64, py: i64, z: i32) {
        self.px = px;
        self.py = py;
        self.z = z;
        if let Some(item) = self.item.as_mut() {
            item.px = px;
            item.py = py;
            item.z = z;
        }
    }

    /// `(px, py, z)`
    pub fn pos(&self) -> (i64, i64, i32) {
        (self.px, self.py, self.z)
    }

    pub fn z_value(&self) -> i32 {
        self.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> TileImage {
        TileImage::new(1, 1, vec![0, 0, 0, 255])
    }

    #[test]
    fn test_set_pos_moves_item() {
        let mut layer = Layer::with_image(10, 20, 0, image());
        layer.set_pos(30, 40, 7);
        let item = layer.item().unwrap();
        assert_eq!((item.px, item.py, item.z), (30, 40, 7));
        assert_eq!(layer.pos(), (30, 40, 7));
    }

    #[test]
    fn test_set_item_replaces_and_reports_old_id() {
        let mut layer = Layer::new(0, 0, 1);
        assert!(layer.set_item(image()).is_none());
        let first = layer.item().unwrap().id;
        assert_eq!(layer.set_item(image()), Some(first));
        assert_ne!(layer.item().unwrap().id, first);
        assert_eq!(layer.item().unwrap().z, 1);
    }

    #[test]
    fn test_item_ids_are_unique() {
        let a = Layer::with_image(0, 0, 0, image());
        let b = Layer::with_image(0, 0, 0, image());
        assert_ne!(a.item().unwrap().id, b.item().unwrap().id);
        assert_ne!(a.id(), b.id());
    }
}
