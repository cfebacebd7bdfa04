//! Configuration for a Scribe store.

use crate::common::{ConsoleLogger, Logger, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
use crate::errors::{ErrorKind, ScribeError, ScribeResult};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

const MAX_MODE: u32 = 0o777;

/// Options a [`Scribe`](crate::scribe::Scribe) store is opened with.
///
/// Defaults: a [`ConsoleLogger`] at `Info`, directories created `0755`,
/// files created `0644`, and every write flushed to disk before the rename.
/// Modes only apply on unix and are still subject to the process umask.
///
/// # Examples
///
/// ```rust
/// use scribe::scribe_config::ScribeConfig;
///
/// let mut config = ScribeConfig::new();
/// config.set_file_mode(0o600)?;
/// config.set_sync_writes(false);
/// assert_eq!(config.file_mode(), 0o600);
/// # Ok::<(), scribe::errors::ScribeError>(())
/// ```
#[derive(Clone)]
pub struct ScribeConfig {
    logger: Arc<dyn Logger>,
    dir_mode: u32,
    file_mode: u32,
    sync_writes: bool,
}

impl Default for ScribeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ScribeConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        ScribeConfig {
            logger: Arc::new(ConsoleLogger::default()),
            dir_mode: DEFAULT_DIR_MODE,
            file_mode: DEFAULT_FILE_MODE,
            sync_writes: true,
        }
    }

    /// Returns the logger the store reports to.
    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    /// Replaces the logger.
    pub fn set_logger(&mut self, logger: Arc<dyn Logger>) {
        self.logger = logger;
    }

    /// Mode used for directories the store creates.
    pub fn dir_mode(&self) -> u32 {
        self.dir_mode
    }

    /// Sets the mode for created directories.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `mode` has bits outside `0o777`.
    pub fn set_dir_mode(&mut self, mode: u32) -> ScribeResult<()> {
        self.dir_mode = check_mode("directory", mode)?;
        Ok(())
    }

    /// Mode used for resource files the store creates.
    pub fn file_mode(&self) -> u32 {
        self.file_mode
    }

    /// Sets the mode for created files.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `mode` has bits outside `0o777`.
    pub fn set_file_mode(&mut self, mode: u32) -> ScribeResult<()> {
        self.file_mode = check_mode("file", mode)?;
        Ok(())
    }

    /// Whether temp files are flushed to disk before being renamed.
    pub fn sync_writes(&self) -> bool {
        self.sync_writes
    }

    pub fn set_sync_writes(&mut self, sync_writes: bool) {
        self.sync_writes = sync_writes;
    }
}

impl Debug for ScribeConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScribeConfig")
            .field("dir_mode", &format_args!("{:o}", self.dir_mode))
            .field("file_mode", &format_args!("{:o}", self.file_mode))
            .field("sync_writes", &self.sync_writes)
            .finish_non_exhaustive()
    }
}

fn check_mode(label: &str, mode: u32) -> ScribeResult<u32> {
    if mode > MAX_MODE {
        log::error!("Invalid {} mode {:o}", label, mode);
        return Err(ScribeError::new(
            &format!("Invalid {} mode {:o} - only permission bits are allowed", label, mode),
            ErrorKind::ValidationError,
        ));
    }
    Ok(mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScribeConfig::default();
        assert_eq!(config.dir_mode(), 0o755);
        assert_eq!(config.file_mode(), 0o644);
        assert!(config.sync_writes());
    }

    #[test]
    fn test_set_modes() {
        let mut config = ScribeConfig::new();
        config.set_dir_mode(0o700).unwrap();
        config.set_file_mode(0o600).unwrap();
        assert_eq!(config.dir_mode(), 0o700);
        assert_eq!(config.file_mode(), 0o600);
    }

    #[test]
    fn test_invalid_mode_is_rejected() {
        let mut config = ScribeConfig::new();
        let err = config.set_file_mode(0o4755).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ValidationError);
        assert_eq!(config.file_mode(), 0o644);
    }

    #[test]
    fn test_debug_prints_octal_modes() {
        let config = ScribeConfig::new();
        let debug = format!("{:?}", config);
        assert!(debug.contains("dir_mode: 755"));
        assert!(debug.contains("file_mode: 644"));
    }
}
