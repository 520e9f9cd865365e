pub mod cache;
pub mod decode;
pub mod loader;
pub mod source;
pub mod tile;
pub mod visible;

// Re-exports for convenience
pub use cache::{DiffReport, TileCache};
pub use loader::{FetchCompletion, HttpFetcher, TileServices};
pub use source::TileSource;
pub use tile::{FetchState, Tile};
pub use visible::{TileInfo, VisibleSetCalculator};
