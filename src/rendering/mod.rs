//! Where drawable items end up.

pub mod surface;

pub use surface::{apply_events, SceneSurface};
