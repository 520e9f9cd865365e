use fxhash::FxHashMap;

use crate::{
    layers::{
        layer::{DrawableItem, ItemId},
        node::LayerEvent,
    },
    traits::RenderSurface,
};

/// In-memory scene: the set of items a host would draw, keyed by id.
///
/// Hosts with their own scene graph implement [`RenderSurface`] instead;
/// this one backs headless use and tests.
#[derive(Debug, Default, Clone)]
pub struct SceneSurface {
    items: FxHashMap<ItemId, DrawableItem>,
}

impl SceneSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ItemId) -> Option<&DrawableItem> {
        self.items.get(&id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Paint order: ascending z, then scene position
    pub fn items_sorted_by_z(&self) -> Vec<&DrawableItem> {
        let mut items: Vec<&DrawableItem> = self.items.values().collect();
        items.sort_by_key(|item| (item.z, item.py, item.px, item.id));
        items
    }
}

impl RenderSurface for SceneSurface {
    fn add_item(&mut self, item: &DrawableItem) {
        self.items.insert(item.id, item.clone());
    }

    fn remove_item(&mut self, id: ItemId) {
        self.items.remove(&id);
    }
}

impl<S: RenderSurface + ?Sized> RenderSurface for Box<S> {
    fn add_item(&mut self, item: &DrawableItem) {
        (**self).add_item(item)
    }

    fn remove_item(&mut self, id: ItemId) {
        (**self).remove_item(id)
    }
}

/// Applies layer events to `surface` in order
pub fn apply_events<S: RenderSurface + ?Sized>(surface: &mut S, events: &[LayerEvent]) {
    for event in events {
        match event {
            LayerEvent::ItemProduced(item) | LayerEvent::ItemUpdated(item) => {
                surface.add_item(item)
            }
            LayerEvent::ItemReleased(id) => surface.remove_item(*id),
        }
    }
}
