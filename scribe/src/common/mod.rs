//! Shared building blocks: per-collection locks and the logger interface.

mod lock;
mod logger;

pub use lock::*;
pub use logger::*;

/// File extension every stored resource carries.
pub const JSON_EXTENSION: &str = "json";

/// Suffix appended to a resource's final path while it is being written.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Default mode for created directories: owner rwx, group/other r-x.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Default mode for created files: owner rw, group/other r.
pub const DEFAULT_FILE_MODE: u32 = 0o644;
