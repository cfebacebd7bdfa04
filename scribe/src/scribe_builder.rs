use crate::common::Logger;
use crate::errors::{ScribeError, ScribeResult};
use crate::scribe::Scribe;
use crate::scribe_config::ScribeConfig;
use std::path::Path;
use std::sync::Arc;

/// Builder for opening a [`Scribe`] store with custom options.
///
/// Invalid options don't fail immediately; the first error is kept and
/// returned from [`ScribeBuilder::open`].
///
/// # Examples
///
/// ```rust,no_run
/// use scribe::common::{ConsoleLogger, LogLevel};
/// use scribe::scribe::Scribe;
/// use std::sync::Arc;
///
/// # fn main() -> scribe::errors::ScribeResult<()> {
/// let db = Scribe::builder()
///     .logger(Arc::new(ConsoleLogger::new(LogLevel::Debug)))
///     .file_mode(0o600)
///     .open("./data")?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ScribeBuilder {
    error: Option<ScribeError>,
    config: ScribeConfig,
}

impl ScribeBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        ScribeBuilder {
            error: None,
            config: ScribeConfig::new(),
        }
    }

    /// Sets the logger the store reports to.
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.config.set_logger(logger);
        self
    }

    /// Sets the mode for directories the store creates.
    pub fn dir_mode(mut self, mode: u32) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_dir_mode(mode) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets the mode for resource files the store creates.
    pub fn file_mode(mut self, mode: u32) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_file_mode(mode) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Whether each write is flushed to disk before the rename.
    pub fn sync_writes(mut self, sync_writes: bool) -> Self {
        self.config.set_sync_writes(sync_writes);
        self
    }

    /// Opens the store at `dir`, creating the directory if needed.
    ///
    /// Returns the first option error captured by the builder, if any.
    pub fn open<P: AsRef<Path>>(self, dir: P) -> ScribeResult<Scribe> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Scribe::open_with_config(dir, self.config)
    }
}
