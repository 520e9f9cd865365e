//! The layer tree.
//!
//! A view owns a list of [`LayerNode`]s. Each node is a plain leaf, a group of
//! nodes, or a tile layer. View changes are broadcast down the tree and every
//! change to what should be drawn is reported as a [`LayerEvent`].

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::{
    core::camera::Camera,
    layers::{
        group::LayerGroup,
        layer::{DrawableItem, ItemId, Layer},
        tile::TileLayer,
    },
};

static NEXT_LAYER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a node in the layer tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(u64);

impl LayerId {
    pub(crate) fn next() -> Self {
        Self(NEXT_LAYER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// A change to the set of drawable items
#[derive(Debug, Clone, PartialEq)]
pub enum LayerEvent {
    /// A new item should be drawn
    ItemProduced(DrawableItem),
    /// An item should no longer be drawn
    ItemReleased(ItemId),
    /// An item already drawn changed its placement or stacking
    ItemUpdated(DrawableItem),
}

impl LayerEvent {
    pub fn item_id(&self) -> ItemId {
        match self {
            LayerEvent::ItemProduced(item) | LayerEvent::ItemUpdated(item) => item.id,
            LayerEvent::ItemReleased(id) => *id,
        }
    }
}

/// Snapshot of the view handed to layers with every notification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewContext {
    pub camera: Camera,
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewChange {
    LonLat,
    Zoom,
    Size,
}

/// A node of the layer tree
#[derive(Debug)]
pub enum LayerNode {
    Leaf(Layer),
    Group(LayerGroup),
    Tiles(TileLayer),
}

impl LayerNode {
    pub fn id(&self) -> LayerId {
        match self {
            LayerNode::Leaf(layer) => layer.id(),
            LayerNode::Group(group) => group.id(),
            LayerNode::Tiles(tiles) => tiles.id(),
        }
    }

    pub fn z_value(&self) -> i32 {
        match self {
            LayerNode::Leaf(layer) => layer.z_value(),
            LayerNode::Group(group) => group.z_value(),
            LayerNode::Tiles(tiles) => tiles.z_value(),
        }
    }

    /// Sets the stacking order of this node and everything below it
    pub fn set_z_value(&mut self, z: i32, events: &mut Vec<LayerEvent>) {
        match self {
            LayerNode::Leaf(layer) => {
                let (px, py, _) = layer.pos();
                layer.set_pos(px, py, z);
                if let Some(item) = layer.item() {
                    events.push(LayerEvent::ItemUpdated(item.clone()));
                }
            }
            LayerNode::Group(group) => group.set_z_value(z, events),
            LayerNode::Tiles(tiles) => tiles.set_z_value(z, events),
        }
    }

    pub fn on_view_lon_lat_changed(&mut self, ctx: &ViewContext, events: &mut Vec<LayerEvent>) {
        self.notify(ViewChange::LonLat, ctx, events);
    }

    pub fn on_view_zoom_changed(&mut self, ctx: &ViewContext, events: &mut Vec<LayerEvent>) {
        self.notify(ViewChange::Zoom, ctx, events);
    }

    pub fn on_view_size_changed(&mut self, ctx: &ViewContext, events: &mut Vec<LayerEvent>) {
        self.notify(ViewChange::Size, ctx, events);
    }

    /// Brings the subtree up to date with `ctx` without discarding loaded tiles
    pub fn refresh(&mut self, ctx: &ViewContext, events: &mut Vec<LayerEvent>) {
        self.notify(ViewChange::Size, ctx, events);
    }

    fn notify(&mut self, change: ViewChange, ctx: &ViewContext, events: &mut Vec<LayerEvent>) {
        match self {
            // leaves are scene-positioned: the view moving does not move them
            LayerNode::Leaf(_) => {}
            LayerNode::Group(group) => {
                for child in group.children_mut() {
                    child.notify(change, ctx, events);
                }
            }
            LayerNode::Tiles(tiles) => match change {
                ViewChange::LonLat | ViewChange::Size => {
                    tiles.render(ctx, events);
                }
                ViewChange::Zoom => {
                    tiles.clear_tiles(events);
                    tiles.render(ctx, events);
                }
            },
        }
    }

    /// Applies finished fetches in the subtree. Returns the number of items produced.
    pub fn poll(&mut self, events: &mut Vec<LayerEvent>) -> usize {
        match self {
            LayerNode::Leaf(_) => 0,
            LayerNode::Group(group) => group
                .children_mut()
                .iter_mut()
                .map(|child| child.poll(events))
                .sum(),
            LayerNode::Tiles(tiles) => tiles.process_completions(events),
        }
    }

    /// Every item currently produced by the subtree
    pub fn items(&self) -> Vec<DrawableItem> {
        let mut out = Vec::new();
        self.collect_items(&mut out);
        out
    }

    fn collect_items(&self, out: &mut Vec<DrawableItem>) {
        match self {
            LayerNode::Leaf(layer) => out.extend(layer.item().cloned()),
            LayerNode::Group(group) => {
                for child in group.children() {
                    child.collect_items(out);
                }
            }
            LayerNode::Tiles(tiles) => out.extend(tiles.items()),
        }
    }

    /// Releases every item of the subtree and cancels pending fetches
    pub fn teardown(&mut self, events: &mut Vec<LayerEvent>) {
        match self {
            LayerNode::Leaf(layer) => {
                if let Some(item) = layer.take_item() {
                    events.push(LayerEvent::ItemReleased(item.id));
                }
            }
            LayerNode::Group(group) => {
                for child in group.children_mut() {
                    child.teardown(events);
                }
            }
            LayerNode::Tiles(tiles) => {
                tiles.clear_tiles(events);
            }
        }
    }

    /// Finds `id` in this subtree
    pub fn find(&self, id: LayerId) -> Option<&LayerNode> {
        if self.id() == id {
            return Some(self);
        }
        match self {
            LayerNode::Group(group) => group.children().iter().find_map(|c| c.find(id)),
            _ => None,
        }
    }

    pub fn find_mut(&mut self, id: LayerId) -> Option<&mut LayerNode> {
        if self.id() == id {
            return Some(self);
        }
        match self {
            LayerNode::Group(group) => group
                .children_mut()
                .iter_mut()
                .find_map(|c| c.find_mut(id)),
            _ => None,
        }
    }

    pub fn as_tiles(&self) -> Option<&TileLayer> {
        match self {
            LayerNode::Tiles(tiles) => Some(tiles),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&LayerGroup> {
        match self {
            LayerNode::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut LayerGroup> {
        match self {
            LayerNode::Group(group) => Some(group),
            _ => None,
        }
    }
}

impl From<Layer> for LayerNode {
    fn from(layer: Layer) -> Self {
        LayerNode::Leaf(layer)
    }
}

impl From<LayerGroup> for LayerNode {
    fn from(group: LayerGroup) -> Self {
        LayerNode::Group(group)
    }
}

impl From<TileLayer> for LayerNode {
    fn from(tiles: TileLayer) -> Self {
        LayerNode::Tiles(tiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::decode::TileImage;

    fn leaf(z: i32) -> LayerNode {
        Layer::with_image(0, 0, z, TileImage::new(1, 1, vec![0, 0, 0, 255])).into()
    }

    #[test]
    fn test_leaf_ignores_view_changes() {
        let mut node = leaf(1);
        let ctx = ViewContext {
            camera: Camera::default(),
            width: 800,
            height: 600,
            tile_size: 256,
        };
        let mut events = Vec::new();
        node.on_view_lon_lat_changed(&ctx, &mut events);
        node.on_view_zoom_changed(&ctx, &mut events);
        node.on_view_size_changed(&ctx, &mut events);
        assert!(events.is_empty());
        assert_eq!(node.items().len(), 1);
    }

    #[test]
    fn test_teardown_releases_leaf_item() {
        let mut node = leaf(0);
        let id = node.items()[0].id;
        let mut events = Vec::new();
        node.teardown(&mut events);
        assert_eq!(events, vec![LayerEvent::ItemReleased(id)]);
        assert!(node.items().is_empty());
    }

    #[test]
    fn test_find_nested() {
        let mut events = Vec::new();
        let mut inner = LayerGroup::new(0);
        let target = inner.add_layer(leaf(0), &mut events);
        let mut outer = LayerGroup::new(0);
        outer.add_layer(inner, &mut events);
        let root = LayerNode::from(outer);

        assert_eq!(root.find(target).map(LayerNode::id), Some(target));
        assert!(root.find(LayerId::next()).is_none());
    }
}
