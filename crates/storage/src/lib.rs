pub mod error;
mod models;
mod path;
pub mod probe;
pub mod relocate;
pub mod scan;

pub use crate::models::FolderEntry;
pub use crate::path::{extended as extended_path, normalize as normalize_path};
pub use crate::relocate::{Transfer, move_dir};
pub use crate::scan::walk;
