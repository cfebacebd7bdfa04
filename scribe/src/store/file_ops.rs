use crate::common::{Logger, TEMP_SUFFIX};
use crate::errors::{ScribeError, ScribeResult};
use std::fs::{DirBuilder, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};

/// Creates `path` and any missing parents. Existing directories are fine.
pub fn create_dir_all(path: &Path, mode: u32) -> ScribeResult<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(mode);
    #[cfg(not(unix))]
    let _ = mode;

    builder
        .create(path)
        .map_err(|e| ScribeError::io("create directory", path, e))
}

/// Path of the temporary sibling used while `final_path` is being written.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut name = final_path.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Writes `content` to `final_path` so readers only ever see the old or the
/// new file.
///
/// The bytes go to [`temp_path`] first, are flushed to disk when `sync` is
/// set, and are then renamed over `final_path`. If any step fails the
/// temporary file is removed and the error returned; the previous content of
/// `final_path` is left as it was.
pub fn write_atomic(
    final_path: &Path,
    content: &[u8],
    file_mode: u32,
    sync: bool,
    logger: &dyn Logger,
) -> ScribeResult<()> {
    let tmp_path = temp_path(final_path);

    let result = write_file(&tmp_path, content, file_mode, sync).and_then(|_| {
        std::fs::rename(&tmp_path, final_path)
            .map_err(|e| ScribeError::io("rename temp file onto", final_path, e))
    });

    if result.is_err() {
        remove_temp(&tmp_path, logger);
    }
    result
}

fn write_file(path: &Path, content: &[u8], mode: u32, sync: bool) -> ScribeResult<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(mode);
    #[cfg(not(unix))]
    let _ = mode;

    let mut file: File = options
        .open(path)
        .map_err(|e| ScribeError::io("create", path, e))?;
    file.write_all(content)
        .map_err(|e| ScribeError::io("write", path, e))?;
    if sync {
        file.sync_all()
            .map_err(|e| ScribeError::io("sync", path, e))?;
    }
    Ok(())
}

fn remove_temp(tmp_path: &Path, logger: &dyn Logger) {
    match std::fs::remove_file(tmp_path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => logger.warn(format_args!(
            "Could not remove temp file '{}': {}",
            tmp_path.display(),
            e
        )),
    }
}
