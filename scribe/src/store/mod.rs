//! Filesystem plumbing behind [`Scribe`](crate::scribe::Scribe): path
//! resolution and atomic file writes.

pub mod file_ops;
pub mod path;

pub use path::{
    normalize_path, resolve, resolve_record, validate_name, Resolved, ResolvedKind,
};
