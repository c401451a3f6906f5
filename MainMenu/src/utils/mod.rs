//! Utility functions

pub mod find;
pub mod path;

pub use find::{find_file, resolve_dir};
pub use path::{normalize_path, relative_path};
