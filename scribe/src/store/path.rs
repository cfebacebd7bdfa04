use crate::common::JSON_EXTENSION;
use crate::errors::{ErrorKind, ScribeError, ScribeResult};
use std::path::{Component, Path, PathBuf};

/// What a resource name resolved to on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedKind {
    File,
    Directory,
    Missing,
}

/// Outcome of [`resolve`]: the kind of entry found and the path to act on.
///
/// Lookups and mutations both use [`Resolved::path`], so whatever a read
/// would have opened is exactly what a delete removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    kind: ResolvedKind,
    path: PathBuf,
}

impl Resolved {
    pub fn kind(&self) -> ResolvedKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Lexically cleans a path: drops `.` components and duplicate separators
/// and folds `name/..` pairs. The filesystem is not consulted.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = normalized.components().next_back();
                if matches!(last, Some(Component::Normal(_))) {
                    normalized.pop();
                } else if !matches!(last, Some(Component::RootDir) | Some(Component::Prefix(_))) {
                    // `..` at the root stays at the root
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// Checks a collection or resource name before it is joined onto the base
/// directory.
///
/// A name must be non-empty, relative, and free of `..` so it can never
/// point outside the store. Forward slashes are allowed and address nested
/// sub-collections.
pub fn validate_name(label: &str, name: &str) -> ScribeResult<()> {
    if name.is_empty() {
        return Err(ScribeError::new(
            &format!("Missing {} - a non-empty name is required", label),
            ErrorKind::ValidationError,
        ));
    }

    let mut has_entry = false;
    for component in Path::new(name).components() {
        match component {
            Component::Normal(_) => has_entry = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ScribeError::new(
                    &format!("Invalid {} '{}' - must stay inside the store", label, name),
                    ErrorKind::ValidationError,
                ));
            }
        }
    }

    if !has_entry {
        return Err(ScribeError::new(
            &format!("Invalid {} '{}' - does not name an entry", label, name),
            ErrorKind::ValidationError,
        ));
    }
    Ok(())
}

/// Final on-disk path of `resource` inside `collection_dir`.
///
/// A resource already ending in `.json` keeps its name as is.
pub fn resource_path(collection_dir: &Path, resource: &str) -> PathBuf {
    if has_json_suffix(resource) {
        collection_dir.join(resource)
    } else {
        collection_dir.join(format!("{}.{}", resource, JSON_EXTENSION))
    }
}

/// Resolves `resource` inside `collection_dir`.
///
/// The bare name is tried first; if nothing exists there, the `.json`
/// sibling is tried. If neither exists the result is
/// [`ResolvedKind::Missing`] carrying the suffixed path.
pub fn resolve(collection_dir: &Path, resource: &str) -> Resolved {
    let bare = collection_dir.join(resource);
    if let Some(kind) = kind_of(&bare) {
        return Resolved { kind, path: bare };
    }

    let suffixed = resource_path(collection_dir, resource);
    match kind_of(&suffixed) {
        Some(kind) => Resolved {
            kind,
            path: suffixed,
        },
        None => Resolved {
            kind: ResolvedKind::Missing,
            path: suffixed,
        },
    }
}

/// Resolves `resource` for a read, preferring a record over a
/// sub-collection.
///
/// `users/admins/` and `users/admins.json` can exist side by side once a
/// nested collection and a record share a name. [`resolve`] reports the
/// directory; this returns the `.json` file when there is one.
pub fn resolve_record(collection_dir: &Path, resource: &str) -> Resolved {
    let resolved = resolve(collection_dir, resource);
    if resolved.kind != ResolvedKind::Directory {
        return resolved;
    }

    let suffixed = resource_path(collection_dir, resource);
    match kind_of(&suffixed) {
        Some(ResolvedKind::File) => Resolved {
            kind: ResolvedKind::File,
            path: suffixed,
        },
        _ => resolved,
    }
}

fn kind_of(path: &Path) -> Option<ResolvedKind> {
    let metadata = std::fs::metadata(path).ok()?;
    if metadata.is_dir() {
        Some(ResolvedKind::Directory)
    } else {
        Some(ResolvedKind::File)
    }
}

fn has_json_suffix(name: &str) -> bool {
    Path::new(name).extension().and_then(|ext| ext.to_str()) == Some(JSON_EXTENSION)
}
