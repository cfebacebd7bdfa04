use std::fmt::{Arguments, Display, Formatter};

/// Severity of a log message, from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_log_level(self) -> log::Level {
        match self {
            LogLevel::Fatal | LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Fatal => write!(f, "FATAL"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Trace => write!(f, "TRACE"),
        }
    }
}

/// Pluggable logging sink for a [`Scribe`](crate::scribe::Scribe) store.
///
/// Implementors only need [`Logger::log`]; the per-level methods forward to
/// it. Messages are passed as [`format_args!`] so nothing is formatted
/// unless the sink decides to keep the message.
///
/// Logging is a side channel: the store never depends on it for correctness.
///
/// # Examples
///
/// ```rust
/// use scribe::common::{LogLevel, Logger};
/// use std::fmt::Arguments;
///
/// struct StderrLogger;
///
/// impl Logger for StderrLogger {
///     fn log(&self, level: LogLevel, args: Arguments<'_>) {
///         eprintln!("[{}] {}", level, args);
///     }
/// }
///
/// StderrLogger.info(format_args!("opened {}", "./data"));
/// ```
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, args: Arguments<'_>);

    fn fatal(&self, args: Arguments<'_>) {
        self.log(LogLevel::Fatal, args)
    }

    fn error(&self, args: Arguments<'_>) {
        self.log(LogLevel::Error, args)
    }

    fn warn(&self, args: Arguments<'_>) {
        self.log(LogLevel::Warn, args)
    }

    fn info(&self, args: Arguments<'_>) {
        self.log(LogLevel::Info, args)
    }

    fn debug(&self, args: Arguments<'_>) {
        self.log(LogLevel::Debug, args)
    }

    fn trace(&self, args: Arguments<'_>) {
        self.log(LogLevel::Trace, args)
    }
}

/// Default [`Logger`] that forwards to the `log` facade under the `scribe`
/// target.
///
/// Messages less severe than the configured level are dropped before they
/// reach the facade. Install a backend such as `colog` or `env_logger` to
/// see the output on the console.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleLogger {
    level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(level: LogLevel) -> Self {
        ConsoleLogger { level }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Returns `true` if a message at `level` passes this logger's threshold.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        ConsoleLogger::new(LogLevel::Info)
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        match level {
            LogLevel::Fatal => log::log!(target: "scribe", log::Level::Error, "FATAL: {}", args),
            _ => log::log!(target: "scribe", level.as_log_level(), "{}", args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingLogger {
        records: Mutex<Vec<(LogLevel, String)>>,
    }

    impl Logger for RecordingLogger {
        fn log(&self, level: LogLevel, args: Arguments<'_>) {
            self.records.lock().push((level, args.to_string()));
        }
    }

    #[test]
    fn test_level_methods_forward_to_log() {
        let logger = RecordingLogger::default();
        logger.fatal(format_args!("f"));
        logger.error(format_args!("e"));
        logger.warn(format_args!("w"));
        logger.info(format_args!("i"));
        logger.debug(format_args!("d {}", 1));
        logger.trace(format_args!("t"));

        let records = logger.records.lock();
        assert_eq!(
            *records,
            vec![
                (LogLevel::Fatal, "f".to_string()),
                (LogLevel::Error, "e".to_string()),
                (LogLevel::Warn, "w".to_string()),
                (LogLevel::Info, "i".to_string()),
                (LogLevel::Debug, "d 1".to_string()),
                (LogLevel::Trace, "t".to_string()),
            ]
        );
    }

    #[test]
    fn test_console_logger_defaults_to_info() {
        let logger = ConsoleLogger::default();
        assert_eq!(logger.level(), LogLevel::Info);
        assert!(logger.enabled(LogLevel::Fatal));
        assert!(logger.enabled(LogLevel::Info));
        assert!(!logger.enabled(LogLevel::Debug));
        assert!(!logger.enabled(LogLevel::Trace));
    }

    #[test]
    fn test_console_logger_trace_enables_everything() {
        let logger = ConsoleLogger::new(LogLevel::Trace);
        assert!(logger.enabled(LogLevel::Trace));
        // no backend installed, must not panic
        logger.trace(format_args!("hidden"));
        logger.fatal(format_args!("shown"));
    }

    #[test]
    fn test_level_ordering_and_display() {
        assert!(LogLevel::Fatal < LogLevel::Error);
        assert!(LogLevel::Debug < LogLevel::Trace);
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
        assert_eq!(LogLevel::Fatal.as_log_level(), log::Level::Error);
    }
}
