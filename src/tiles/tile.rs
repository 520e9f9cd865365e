use crate::{
    core::geo::{PixelKey, TileCoord},
    layers::layer::{DrawableItem, Layer},
    runtime::AsyncHandle,
    tiles::decode::TileImage,
};

/// Lifecycle of a tile's fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchState {
    Pending,
    Loaded,
    Failed,
}

/// A tile owned by exactly one cache entry.
///
/// Dropping a tile cancels its fetch if it is still pending.
pub struct Tile {
    coord: TileCoord,
    url: String,
    layer: Layer,
    state: FetchState,
    generation: u64,
    handle: Option<Box<dyn AsyncHandle>>,
}

impl Tile {
    pub(crate) fn pending(
        coord: TileCoord,
        url: String,
        key: PixelKey,
        z: i32,
        generation: u64,
    ) -> Self {
        Self {
            coord,
            url,
            layer: Layer::new(key.px, key.py, z),
            state: FetchState::Pending,
            generation,
            handle: None,
        }
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn key(&self) -> PixelKey {
        let (px, py, _) = self.layer.pos();
        PixelKey::new(px, py)
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn z_value(&self) -> i32 {
        self.layer.z_value()
    }

    pub fn item(&self) -> Option<&DrawableItem> {
        self.layer.item()
    }

    pub(crate) fn set_handle(&mut self, handle: Box<dyn AsyncHandle>) {
        self.handle = Some(handle);
    }

    pub(crate) fn set_z_value(&mut self, z: i32) {
        let (px, py, _) = self.layer.pos();
        self.layer.set_pos(px, py, z);
    }

    pub(crate) fn mark_loaded(&mut self, image: TileImage) -> Option<&DrawableItem> {
        self.handle = None;
        self.state = FetchState::Loaded;
        self.layer.set_item(image);
        self.layer.item()
    }

    pub(crate) fn mark_failed(&mut self) {
        self.handle = None;
        self.state = FetchState::Failed;
    }

    /// Advisory cancel of a pending fetch
    pub(crate) fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            if self.state == FetchState::Pending && !handle.is_finished() {
                log::debug!("cancelling fetch for tile {}", self.coord);
                handle.cancel();
            }
        }
    }
}

impl Drop for Tile {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tile")
            .field("coord", &self.coord)
            .field("key", &self.key())
            .field("state", &self.state)
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    struct FlagHandle(Arc<AtomicBool>);

    impl AsyncHandle for FlagHandle {
        fn is_finished(&self) -> bool {
            false
        }

        fn cancel(&self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    fn tile() -> Tile {
        Tile::pending(
            TileCoord::new(1, 2, 3),
            "u".to_string(),
            PixelKey::new(256, 512),
            4,
            9,
        )
    }

    #[test]
    fn test_drop_cancels_pending_fetch() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut t = tile();
        t.set_handle(Box::new(FlagHandle(Arc::clone(&cancelled))));
        drop(t);
        assert!(cancelled.load(Ordering::SeqCst));
    }

    #[test]
    fn test_loaded_tile_has_item_at_key() {
        let mut t = tile();
        let item = t.mark_loaded(TileImage::new(1, 1, vec![1, 2, 3, 4])).cloned().unwrap();
        assert_eq!((item.px, item.py, item.z), (256, 512, 4));
        assert_eq!(t.state(), FetchState::Loaded);
        t.set_z_value(8);
        assert_eq!(t.item().unwrap().z, 8);
        assert_eq!(t.key(), PixelKey::new(256, 512));
    }

    #[test]
    fn test_failed_tile_has_no_item() {
        let mut t = tile();
        t.mark_failed();
        assert_eq!(t.state(), FetchState::Failed);
        assert!(t.item().is_none());
    }
}
