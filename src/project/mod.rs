//! Project Discovery
//!
//! Root detection from marker files and the per-document root cache.

pub mod cache;
pub mod root;

pub use cache::RootCache;
pub use root::{default_markers, file_path_from_uri, find_root, RootMarker};
