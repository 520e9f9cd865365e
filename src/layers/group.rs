use crate::layers::{
    layer::DrawableItem,
    node::{LayerEvent, LayerId, LayerNode},
};

/// A node that owns child nodes and shares its stacking order with them.
///
/// Children take the group's z-value when added and whenever it changes.
#[derive(Debug)]
pub struct LayerGroup {
    id: LayerId,
    z: i32,
    children: Vec<LayerNode>,
}

impl LayerGroup {
    pub fn new(z: i32) -> Self {
        Self {
            id: LayerId::next(),
            z,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn z_value(&self) -> i32 {
        self.z
    }

    /// Adds a child at the group's z-value and reports the items it already has
    pub fn add_layer(
        &mut self,
        node: impl Into<LayerNode>,
        events: &mut Vec<LayerEvent>,
    ) -> LayerId {
        let mut node = node.into();
        // nothing of the child is drawn yet, so restacking needs no events
        node.set_z_value(self.z, &mut Vec::new());
        events.extend(node.items().into_iter().map(LayerEvent::ItemProduced));

        let id = node.id();
        self.children.push(node);
        id
    }

    /// Removes the child `id` from this group or any nested group.
    /// Returns the removed node after releasing its items.
    pub fn remove_layer(
        &mut self,
        id: LayerId,
        events: &mut Vec<LayerEvent>,
    ) -> Option<LayerNode> {
        if let Some(index) = self.children.iter().position(|c| c.id() == id) {
            let mut node = self.children.remove(index);
            node.teardown(events);
            return Some(node);
        }
        self.children
            .iter_mut()
            .filter_map(LayerNode::as_group_mut)
            .find_map(|group| group.remove_layer(id, events))
    }

    pub fn set_z_value(&mut self, z: i32, events: &mut Vec<LayerEvent>) {
        self.z = z;
        for child in &mut self.children {
            child.set_z_value(z, events);
        }
    }

    pub fn children(&self) -> &[LayerNode] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [LayerNode] {
        &mut self.children
    }

    pub fn items(&self) -> Vec<DrawableItem> {
        self.children.iter().flat_map(LayerNode::items).collect()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
