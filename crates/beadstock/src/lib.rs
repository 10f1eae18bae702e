pub mod catalog;
pub mod design;
pub mod geom;
mod macros;

use directories::ProjectDirs;
use std::path::PathBuf;

/// Shared data directory for the designer (saved design, user product files).
pub fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("org", "loomworks", "loopstone").map(|d| d.data_dir().to_path_buf())
}
