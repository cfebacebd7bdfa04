use crate::common::{LockRegistry, TEMP_SUFFIX};
use crate::errors::{ErrorKind, ScribeError, ScribeResult};
use crate::scribe_builder::ScribeBuilder;
use crate::scribe_config::ScribeConfig;
use crate::store::file_ops::{create_dir_all, write_atomic};
use crate::store::path::{
    normalize_path, resolve, resolve_record, resource_path, validate_name, ResolvedKind,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A document store that keeps each record as a JSON file.
///
/// Records live at `<base>/<collection>/<resource>.json`. Writes and deletes
/// on a collection are serialized through that collection's lock; different
/// collections never wait on each other. Reads take no lock: every write
/// lands through a rename, so a reader sees either the old or the new file,
/// never a partial one.
///
/// `Scribe` is cheap to clone and all clones share the same lock registry,
/// so it can be handed to as many threads as needed. Two stores opened
/// separately on the same directory do not coordinate with each other.
///
/// # Examples
///
/// ```rust,no_run
/// use scribe::scribe::Scribe;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct User {
///     name: String,
///     age: u32,
/// }
///
/// # fn main() -> scribe::errors::ScribeResult<()> {
/// let db = Scribe::open("./data")?;
/// db.write("users", "John", &User { name: "John".into(), age: 23 })?;
///
/// let john: User = db.read("users", "John")?;
/// let everyone = db.read_all("users")?;
/// db.delete("users", "John")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Scribe {
    inner: Arc<ScribeInner>,
}

impl Scribe {
    /// Returns a builder for opening a store with custom options.
    pub fn builder() -> ScribeBuilder {
        ScribeBuilder::new()
    }

    /// Opens the store at `dir` with default options.
    ///
    /// The path is normalized first. An existing directory is reused as is;
    /// otherwise it is created along with any missing parents.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the directory cannot be created or the path
    /// exists but is not a directory. Permission failures are reported as
    /// [`ErrorKind::PermissionDenied`]; [`ScribeError::is_io`] matches both.
    pub fn open<P: AsRef<Path>>(dir: P) -> ScribeResult<Scribe> {
        Scribe::open_with_config(dir, ScribeConfig::new())
    }

    /// Opens the store at `dir` with the given options.
    pub fn open_with_config<P: AsRef<Path>>(dir: P, config: ScribeConfig) -> ScribeResult<Scribe> {
        let inner = ScribeInner::open(normalize_path(dir.as_ref()), config)?;
        Ok(Scribe {
            inner: Arc::new(inner),
        })
    }

    /// Stores `value` as `<collection>/<resource>.json`, replacing any
    /// previous content.
    ///
    /// # Errors
    ///
    /// - validation error if either name is empty or leaves the store
    /// - encoding error if `value` cannot be serialized
    /// - IO error if the directory, temp file or rename fails
    pub fn write<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        resource: &str,
        value: &T,
    ) -> ScribeResult<()> {
        self.inner.write(collection, resource, value)
    }

    /// Reads `<collection>/<resource>` and decodes it as `T`.
    ///
    /// `resource` may be given with or without the `.json` suffix. When a
    /// sub-collection and a record share the name, the record is read.
    ///
    /// # Errors
    ///
    /// - validation error for empty or escaping names
    /// - not found if no such resource exists
    /// - IO or permission denied error if the file cannot be read
    /// - decode error if the content is not JSON or does not fit `T`
    pub fn read<T: DeserializeOwned>(&self, collection: &str, resource: &str) -> ScribeResult<T> {
        self.inner.read(collection, resource)
    }

    /// Returns the raw text of every record in `collection`, in directory
    /// listing order.
    ///
    /// Nested sub-collections and in-flight temp files are skipped. Any
    /// other file in the directory is returned regardless of its extension.
    ///
    /// # Errors
    ///
    /// - not found if the collection does not exist
    /// - IO or permission denied error if any record cannot be read,
    ///   including a file that is not valid UTF-8
    pub fn read_all(&self, collection: &str) -> ScribeResult<Vec<String>> {
        self.inner.read_all(collection)
    }

    /// Like [`Scribe::read_all`] but decodes every record as `T`.
    pub fn read_all_as<T: DeserializeOwned>(&self, collection: &str) -> ScribeResult<Vec<T>> {
        self.read_all(collection)?
            .iter()
            .map(|record| {
                serde_json::from_str(record).map_err(|e| {
                    ScribeError::new_with_cause(
                        &format!("Failed to decode a record of collection '{}'", collection),
                        ErrorKind::DecodeError,
                        e.into(),
                    )
                })
            })
            .collect()
    }

    /// Deletes `<collection>/<resource>`.
    ///
    /// If the name resolves to a directory (a nested sub-collection), the
    /// whole directory tree is removed.
    ///
    /// # Errors
    ///
    /// - validation error for empty or escaping names
    /// - not found if nothing exists under that name
    /// - IO error if removal fails
    pub fn delete(&self, collection: &str, resource: &str) -> ScribeResult<()> {
        self.inner.delete(collection, resource)
    }

    /// The normalized base directory of the store.
    pub fn base_dir(&self) -> &Path {
        &self.inner.base_dir
    }

    /// The options this store was opened with.
    pub fn config(&self) -> &ScribeConfig {
        &self.inner.config
    }

    /// Number of collection directories that have had a lock created so far.
    pub fn collection_count(&self) -> usize {
        self.inner.lock_registry.lock_count()
    }
}

impl Debug for Scribe {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scribe")
            .field("base_dir", &self.inner.base_dir)
            .field("config", &self.inner.config)
            .finish()
    }
}

struct ScribeInner {
    base_dir: PathBuf,
    lock_registry: LockRegistry,
    config: ScribeConfig,
}

impl ScribeInner {
    fn open(base_dir: PathBuf, config: ScribeConfig) -> ScribeResult<Self> {
        let logger = config.logger().clone();
        match fs::metadata(&base_dir) {
            Ok(metadata) if metadata.is_dir() => {
                logger.debug(format_args!(
                    "Using '{}' (database already exists)",
                    base_dir.display()
                ));
            }
            Ok(_) => {
                return Err(ScribeError::new(
                    &format!("'{}' exists but is not a directory", base_dir.display()),
                    ErrorKind::IOError,
                ));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                logger.debug(format_args!(
                    "Creating the database at '{}'...",
                    base_dir.display()
                ));
                create_dir_all(&base_dir, config.dir_mode())?;
            }
            Err(e) => return Err(ScribeError::io("open", &base_dir, e)),
        }

        Ok(ScribeInner {
            base_dir,
            lock_registry: LockRegistry::new(),
            config,
        })
    }

    fn write<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        resource: &str,
        value: &T,
    ) -> ScribeResult<()> {
        validate_name("collection", collection)?;
        validate_name("resource", resource)?;

        let mut content = serde_json::to_vec_pretty(value).map_err(|e| {
            ScribeError::new_with_cause(
                &format!("Failed to serialize '{}/{}'", collection, resource),
                ErrorKind::EncodingError,
                e.into(),
            )
        })?;
        content.push(b'\n');

        let handle = self.lock_registry.get_lock(&lock_key(collection, resource));
        let _guard = handle.lock();

        let final_path = resource_path(&self.collection_dir(collection), resource);
        if let Some(parent) = final_path.parent() {
            create_dir_all(parent, self.config.dir_mode())?;
        }

        write_atomic(
            &final_path,
            &content,
            self.config.file_mode(),
            self.config.sync_writes(),
            &**self.config.logger(),
        )
    }

    fn read<T: DeserializeOwned>(&self, collection: &str, resource: &str) -> ScribeResult<T> {
        validate_name("collection", collection)?;
        validate_name("resource", resource)?;

        let resolved = resolve_record(&self.collection_dir(collection), resource);
        match resolved.kind() {
            ResolvedKind::File => {}
            ResolvedKind::Missing => {
                return Err(ScribeError::new(
                    &format!("Resource '{}/{}' not found", collection, resource),
                    ErrorKind::NotFound,
                ));
            }
            ResolvedKind::Directory => {
                return Err(ScribeError::new(
                    &format!(
                        "'{}/{}' is a collection, not a resource",
                        collection, resource
                    ),
                    ErrorKind::NotFound,
                ));
            }
        }

        let path = resolved.path();
        let content = fs::read(path).map_err(|e| ScribeError::io("read", path, e))?;
        serde_json::from_slice(&content).map_err(|e| {
            ScribeError::new_with_cause(
                &format!("Failed to decode '{}'", path.display()),
                ErrorKind::DecodeError,
                e.into(),
            )
        })
    }

    fn read_all(&self, collection: &str) -> ScribeResult<Vec<String>> {
        validate_name("collection", collection)?;

        let dir = self.collection_dir(collection);
        let not_found = || {
            ScribeError::new(
                &format!("Collection '{}' not found", collection),
                ErrorKind::NotFound,
            )
        };
        match fs::metadata(&dir) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Err(not_found()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(ScribeError::io("open collection", &dir, e)),
        }

        let entries = fs::read_dir(&dir).map_err(|e| ScribeError::io("list", &dir, e))?;
        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ScribeError::io("list", &dir, e))?;
            let path = entry.path();
            if path.is_dir() || is_temp_file(&path) {
                continue;
            }

            match fs::read_to_string(&path) {
                Ok(content) => records.push(content),
                // removed by a concurrent delete after listing
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(ScribeError::io("read", &path, e)),
            }
        }
        Ok(records)
    }

    fn delete(&self, collection: &str, resource: &str) -> ScribeResult<()> {
        validate_name("collection", collection)?;
        validate_name("resource", resource)?;

        let handle = self.lock_registry.get_lock(&lock_key(collection, resource));
        let _guard = handle.lock();

        let resolved = resolve(&self.collection_dir(collection), resource);
        let path = resolved.path();
        match resolved.kind() {
            ResolvedKind::Missing => Err(ScribeError::new(
                &format!(
                    "Unable to find file or directory named '{}/{}'",
                    collection, resource
                ),
                ErrorKind::NotFound,
            )),
            ResolvedKind::Directory => {
                fs::remove_dir_all(path).map_err(|e| ScribeError::io("remove directory", path, e))
            }
            ResolvedKind::File => {
                fs::remove_file(path).map_err(|e| ScribeError::io("remove", path, e))
            }
        }
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.base_dir.join(collection)
    }
}

/// Lock key for a resource: the normalized directory that holds it.
///
/// A `/` may sit in either name, so `("users", "admins/bob")` and
/// `("users/admins", "bob")` both lock `users/admins`. The bare and `.json`
/// candidates of a resource share a parent and therefore a key.
fn lock_key(collection: &str, resource: &str) -> String {
    let target = normalize_path(&Path::new(collection).join(resource));
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            parent.to_string_lossy().into_owned()
        }
        _ => ".".to_string(),
    }
}

fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(TEMP_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{LogLevel, Logger};
    use parking_lot::Mutex;
    use std::fmt::Arguments;

    #[derive(Default)]
    struct RecordingLogger {
        records: Mutex<Vec<(LogLevel, String)>>,
    }

    impl Logger for RecordingLogger {
        fn log(&self, level: LogLevel, args: Arguments<'_>) {
            self.records.lock().push((level, args.to_string()));
        }
    }

    fn random_dir() -> PathBuf {
        std::env::temp_dir().join(uuid::Uuid::new_v4().to_string())
    }

    #[test]
    fn test_open_creates_missing_directory() {
        let dir = random_dir().join("nested").join("db");
        let logger = Arc::new(RecordingLogger::default());

        let db = Scribe::builder().logger(logger.clone()).open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(db.base_dir(), dir.as_path());

        let records = logger.records.lock();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, LogLevel::Debug);
        assert!(records[0].1.starts_with("Creating the database at"));
        drop(records);

        fs::remove_dir_all(dir.parent().unwrap().parent().unwrap()).unwrap();
    }

    #[test]
    fn test_open_reuses_existing_directory() {
        let dir = random_dir();
        fs::create_dir_all(&dir).unwrap();
        let logger = Arc::new(RecordingLogger::default());

        Scribe::builder().logger(logger.clone()).open(&dir).unwrap();

        let records = logger.records.lock();
        assert_eq!(records.len(), 1);
        assert!(records[0].1.contains("database already exists"));
        drop(records);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_open_normalizes_path() {
        let dir = random_dir();
        let messy = dir.join(".").join("sub").join("..");

        let db = Scribe::open(&messy).unwrap();
        assert_eq!(db.base_dir(), dir.as_path());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_open_fails_on_regular_file() {
        let dir = random_dir();
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("not-a-dir");
        fs::write(&file, "x").unwrap();

        let err = Scribe::open(&file).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::IOError);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_clones_share_lock_registry() {
        let dir = random_dir();
        let db = Scribe::open(&dir).unwrap();
        let clone = db.clone();

        db.write("users", "John", &serde_json::json!({"age": 23})).unwrap();
        clone.write("orders", "1", &serde_json::json!({"total": 5})).unwrap();
        assert_eq!(db.collection_count(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_independent_stores_have_independent_registries() {
        let dir = random_dir();
        let first = Scribe::open(&dir).unwrap();
        let second = Scribe::open(&dir).unwrap();

        first.write("users", "John", &1).unwrap();
        assert_eq!(first.collection_count(), 1);
        assert_eq!(second.collection_count(), 0);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_lock_key_normalizes() {
        assert_eq!(lock_key("users", "John"), "users");
        assert_eq!(lock_key("users/", "John"), "users");
        assert_eq!(lock_key("./users", "John.json"), "users");
        assert_eq!(lock_key("users/admins", "bob"), "users/admins");
    }

    #[test]
    fn test_lock_key_follows_slash_in_resource() {
        assert_eq!(lock_key("users", "admins/bob"), "users/admins");
        assert_eq!(lock_key("users", "admins/bob"), lock_key("users/admins", "bob"));
        assert_eq!(lock_key("users", "./admins//bob.json"), "users/admins");
        // deleting a sub-collection locks its parent
        assert_eq!(lock_key("users", "admins"), "users");
    }

    #[test]
    fn test_both_spellings_share_one_lock() {
        let dir = random_dir();
        let db = Scribe::open(&dir).unwrap();

        db.write("users", "admins/bob", &1).unwrap();
        db.write("users/admins", "bob", &2).unwrap();
        assert_eq!(db.collection_count(), 1);
        assert_eq!(db.read::<i32>("users", "admins/bob").unwrap(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_write_serialization_failure_touches_nothing() {
        use std::collections::HashMap;

        let dir = random_dir();
        let db = Scribe::open(&dir).unwrap();

        // JSON object keys must be strings
        let mut value = HashMap::new();
        value.insert(vec![1u8], 1);
        let err = db.write("users", "bad", &value).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);
        assert!(!dir.join("users").exists());
        assert_eq!(db.collection_count(), 0);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_held_collection_lock_does_not_block_other_collections() {
        use std::sync::mpsc;
        use std::time::Duration;

        let dir = random_dir();
        let db = Scribe::open(&dir).unwrap();

        let handle = db.inner.lock_registry.get_lock("a");
        let guard = handle.lock();

        let (tx, rx) = mpsc::channel();
        let writer = db.clone();
        let join = std::thread::spawn(move || {
            tx.send(writer.write("b", "x", &1)).unwrap();
        });
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(result.is_ok());

        drop(guard);
        join.join().unwrap();
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_held_collection_lock_blocks_same_collection() {
        use std::sync::mpsc;
        use std::time::Duration;

        let dir = random_dir();
        let db = Scribe::open(&dir).unwrap();

        let handle = db.inner.lock_registry.get_lock("a");
        let guard = handle.lock();

        let (tx, rx) = mpsc::channel();
        let writer = db.clone();
        let join = std::thread::spawn(move || {
            tx.send(writer.write("a", "x", &1)).unwrap();
        });
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert!(!dir.join("a").join("x.json").exists());

        drop(guard);
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(result.is_ok());
        assert!(dir.join("a").join("x.json").is_file());

        join.join().unwrap();
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_held_lock_blocks_slash_in_resource_spelling() {
        use std::sync::mpsc;
        use std::time::Duration;

        let dir = random_dir();
        let db = Scribe::open(&dir).unwrap();

        let handle = db.inner.lock_registry.get_lock("users/admins");
        let guard = handle.lock();

        let (tx, rx) = mpsc::channel();
        let writer = db.clone();
        let join = std::thread::spawn(move || {
            tx.send(writer.write("users", "admins/bob", &1)).unwrap();
        });
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert!(!dir.join("users").join("admins").join("bob.json").exists());

        drop(guard);
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(result.is_ok());

        join.join().unwrap();
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_is_temp_file() {
        assert!(is_temp_file(Path::new("/data/users/John.json.tmp")));
        assert!(!is_temp_file(Path::new("/data/users/John.json")));
    }
}
