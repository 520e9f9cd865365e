//! Per-source tile cache that follows the visible set.
//!
//! Tiles are keyed by the scene pixel of their north-west corner. Within one
//! visible set no two tiles share a pixel position; across zoom levels they
//! can, which is why a zoom change clears the cache instead of diffing.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use fxhash::{FxHashMap, FxHashSet};

use crate::{
    core::geo::PixelKey,
    layers::{layer::DrawableItem, node::LayerEvent},
    runtime::AsyncHandle,
    tiles::{
        loader::{FetchCompletion, TileServices},
        source::TileSource,
        tile::{FetchState, Tile},
        visible::TileInfo,
    },
};

/// What one `render_tiles` pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffReport {
    /// Entries removed because they left the visible set
    pub evicted: usize,
    /// Visible tiles already present or in flight
    pub skipped: usize,
    /// Visible tiles the source cannot serve
    pub invalid: usize,
    /// New fetches issued
    pub fetched: usize,
}

impl DiffReport {
    /// True when the pass changed nothing
    pub fn is_noop(&self) -> bool {
        self.evicted == 0 && self.fetched == 0
    }
}

/// Keyed store of pending, loaded and failed tiles for one tile source
pub struct TileCache {
    tiles: FxHashMap<PixelKey, Tile>,
    next_generation: u64,
    services: TileServices,
    completion_tx: Sender<FetchCompletion>,
    completion_rx: Receiver<FetchCompletion>,
}

impl TileCache {
    pub fn new(services: TileServices) -> Self {
        let (completion_tx, completion_rx) = unbounded();
        Self {
            tiles: FxHashMap::default(),
            next_generation: 0,
            services,
            completion_tx,
            completion_rx,
        }
    }

    /// Reconciles the cache with `required`.
    ///
    /// Entries whose key is not required are evicted (pending fetches are
    /// cancelled, items released). Required tiles already cached are left
    /// alone. The rest are validated against `source` and fetched; invalid
    /// ones are dropped without error.
    pub fn render_tiles(
        &mut self,
        required: &[TileInfo],
        source: &TileSource,
        z: i32,
        events: &mut Vec<LayerEvent>,
    ) -> DiffReport {
        let mut report = DiffReport::default();
        let new_keys: FxHashSet<PixelKey> = required.iter().map(TileInfo::key).collect();

        let stale: Vec<PixelKey> = self
            .tiles
            .keys()
            .filter(|key| !new_keys.contains(key))
            .copied()
            .collect();
        for key in stale {
            if let Some(tile) = self.tiles.remove(&key) {
                Self::evict(tile, events);
                report.evicted += 1;
            }
        }

        for info in required {
            let key = info.key();
            if self.tiles.contains_key(&key) {
                report.skipped += 1;
                continue;
            }

            let coord = match source.check_tile(info.x, info.y, info.zoom) {
                Ok(coord) => coord,
                Err(e) => {
                    log::trace!("skipping tile: {}", e);
                    report.invalid += 1;
                    continue;
                }
            };

            let url = source.url(coord);
            let generation = self.next_generation;
            self.next_generation += 1;

            let mut tile = Tile::pending(coord, url.clone(), key, z, generation);
            tile.set_handle(self.spawn_fetch(url, key, generation));
            self.tiles.insert(key, tile);
            report.fetched += 1;
        }

        if !report.is_noop() {
            log::debug!(
                "tile diff: {} evicted, {} kept, {} invalid, {} fetched",
                report.evicted,
                report.skipped,
                report.invalid,
                report.fetched
            );
        }
        report
    }

    /// Evicts every entry regardless of visibility. Returns how many were removed.
    pub fn clear_tiles(&mut self, events: &mut Vec<LayerEvent>) -> usize {
        let count = self.tiles.len();
        for (_, tile) in self.tiles.drain() {
            Self::evict(tile, events);
        }
        count
    }

    /// Applies every completion that has arrived so far.
    ///
    /// Completions for tiles that were evicted (or evicted and re-created)
    /// since the fetch was issued are discarded. Returns the number of items
    /// produced.
    pub fn process_completions(&mut self, events: &mut Vec<LayerEvent>) -> usize {
        let decoder = Arc::clone(&self.services.decoder);
        let mut produced = 0;
        while let Ok(completion) = self.completion_rx.try_recv() {
            let FetchCompletion {
                key,
                generation,
                result,
            } = completion;

            let Some(tile) = self.tiles.get_mut(&key) else {
                log::debug!("discarding completion for evicted tile at {:?}", key);
                continue;
            };
            if tile.generation() != generation || tile.state() != FetchState::Pending {
                log::debug!("discarding stale completion for tile {}", tile.coord());
                continue;
            }

            let image = result.and_then(|bytes| decoder.decode(&bytes));
            match image {
                Ok(image) => {
                    log::debug!("Tile [url {}] [pos {}px,{}py]", tile.url(), key.px, key.py);
                    if let Some(item) = tile.mark_loaded(image) {
                        events.push(LayerEvent::ItemProduced(item.clone()));
                        produced += 1;
                    }
                }
                Err(e) => {
                    log::warn!("tile {} failed: {}", tile.coord(), e);
                    tile.mark_failed();
                }
            }
        }
        produced
    }

    /// Restacks every tile at `z`, keeping positions
    pub fn set_z_value(&mut self, z: i32, events: &mut Vec<LayerEvent>) {
        for tile in self.tiles.values_mut() {
            tile.set_z_value(z);
            if let Some(item) = tile.item() {
                events.push(LayerEvent::ItemUpdated(item.clone()));
            }
        }
    }

    /// Items of all loaded tiles
    pub fn items(&self) -> Vec<DrawableItem> {
        self.tiles.values().filter_map(|t| t.item().cloned()).collect()
    }

    pub fn get(&self, key: &PixelKey) -> Option<&Tile> {
        self.tiles.get(key)
    }

    pub fn state_of(&self, key: &PixelKey) -> Option<FetchState> {
        self.tiles.get(key).map(Tile::state)
    }

    pub fn keys(&self) -> impl Iterator<Item = &PixelKey> {
        self.tiles.keys()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn pending_count(&self) -> usize {
        self.count_in(FetchState::Pending)
    }

    pub fn count_in(&self, state: FetchState) -> usize {
        self.tiles.values().filter(|t| t.state() == state).count()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    fn spawn_fetch(
        &self,
        url: String,
        key: PixelKey,
        generation: u64,
    ) -> Box<dyn AsyncHandle> {
        let fetcher = Arc::clone(&self.services.fetcher);
        let tx = self.completion_tx.clone();
        log::debug!("fetching {}", url);
        self.services.spawner.spawn_boxed(Box::pin(async move {
            let result = fetcher.fetch(&url).await;
            // The cache may be gone by now; nothing to report to then.
            let _ = tx.send(FetchCompletion {
                key,
                generation,
                result,
            });
        }))
    }

    fn evict(mut tile: Tile, events: &mut Vec<LayerEvent>) {
        tile.cancel();
        if let Some(item) = tile.item() {
            events.push(LayerEvent::ItemReleased(item.id));
        }
    }

    #[cfg(test)]
    pub(crate) fn completion_sender(&self) -> Sender<FetchCompletion> {
        self.completion_tx.clone()
    }
}

impl std::fmt::Debug for TileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileCache")
            .field("tiles", &self.tiles.len())
            .field("next_generation", &self.next_generation)
            .finish()
    }
}
