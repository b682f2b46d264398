//! # ringlog
//! Leveled logger with console, syslog and rotating file sinks.
//!
//! Every call runs synchronously on the caller's thread. The message is tagged
//! with its severity and the calling function, stamped, and handed to each
//! enabled sink in turn. A failing sink never stops the others and never
//! reaches the caller.
//!
//! ## Usage
//! ```toml
//! // Cargo.toml
//! ...
//! [dependencies]
//! ringlog = "0.1.0"
//! ```
//!
//! ```rust
//! // explicit initialization is optional: the first call loads
//! // `./etc/log.json` (or $RINGLOG_CONFIG_PATH) on its own
//! ringlog::initialize("./etc/log.json", "worker-1");
//! ringlog::warn!("queue depth is {}", 42);
//! ringlog::debug!("not shown under the default INFO ceiling");
//! ```
//!
//! ## Injected loggers
//! A [`Logger`] is a self-contained context. Macros take it with `logger:`.
//!
//! ```rust
//! use ringlog::logger_config;
//!
//! let logger = logger_config()
//!     .with_config_path("./etc/log.json")
//!     .with_run_id("job-7")
//!     .build();
//! ringlog::error!(logger: &logger, "payment {} rejected", "p-1");
//! ```
//!
//! ## Logging to files
//! Config files keep the file sink off unless the logger honors the
//! `CONSOLE`/`LOG2FILE` flags of the document.
//!
//! ```rust
//! use ringlog::logger_config;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let config = dir.path().join("log.json");
//! let json = serde_json::json!({
//!     "LOGDIR": dir.path().join("logs"),
//!     "MODULE": "api",
//!     "LEVEL": 4,
//!     "MAXFILESIZE": 4096,
//!     "MAXFILECOUNT": 3,
//!     "CONSOLE": false,
//!     "LOG2FILE": true,
//! });
//! std::fs::write(&config, json.to_string()).unwrap();
//!
//! let logger = logger_config()
//!     .with_config_path(&config)
//!     .honor_sink_flags()
//!     .build();
//! ringlog::info!(logger: &logger, "Hello, world!");
//! let files = std::fs::read_dir(dir.path().join("logs")).unwrap().count();
//! assert_eq!(files, 1);
//! ```

#[macro_use]
mod macros;

use log::{LevelFilter, Log};
use ringlog_core::{
    LogFileRing, LogLine, LogStdout, LogSyslog, LogWriter, RINGLOG_ENV, RotationState,
    SharedOutput, diagnostic, shared_output,
};
use std::{
    fmt,
    io::Write,
    path::{Path, PathBuf},
    sync::{
        Arc, LazyLock, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
        atomic::{AtomicBool, Ordering},
    },
};
use uuid::Uuid;

pub use ringlog_core::{Error, LogConfig, Severity, SinkPolicy, SyslogConfig};

/// Configuration in effect together with the sinks built from it.
struct Active {
    config: LogConfig,
    sinks: Vec<Box<dyn LogWriter>>,
}

/// A logging context: configuration, sinks and rotation state.
pub struct Logger {
    active: RwLock<Option<Arc<Active>>>,
    initialized: AtomicBool,
    /// Path loaded by lazy initialization and [`Logger::reload`].
    config_path: RwLock<PathBuf>,
    process_tag: RwLock<Option<String>>,
    rotation: Arc<Mutex<RotationState>>,
    policy: SinkPolicy,
    console_output: Option<SharedOutput>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// An uninitialized logger reading `$RINGLOG_CONFIG_PATH` on first use.
    pub fn new() -> Self {
        logger_config().build()
    }

    /// Replaces the process tag with `run_id` and (re)loads the configuration
    /// from `config_path`.
    pub fn initialize<P: AsRef<Path>>(&self, config_path: P, run_id: &str) {
        *write(&self.process_tag) = Some(run_id.to_string());
        *write(&self.config_path) = config_path.as_ref().to_path_buf();
        self.reload();
    }

    /// Loads the last used path again. A failed load keeps the configuration
    /// in effect.
    pub fn reload(&self) {
        self.load();
        self.initialized.store(true, Ordering::Release);
        if let Some(config) = self.config() {
            diagnostic(&format!("log parameters {config}"));
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Snapshot of the configuration in effect.
    pub fn config(&self) -> Option<LogConfig> {
        read(&self.active)
            .as_ref()
            .map(|active| active.config.clone())
    }

    pub fn process_tag(&self) -> Option<String> {
        read(&self.process_tag).clone()
    }

    /// Index of the active slot in the rotation ring.
    pub fn current_file_index(&self) -> u32 {
        self.rotation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current_index()
    }

    pub fn fatal(&self, caller: &str, args: fmt::Arguments<'_>) {
        self.log(Severity::Fatal, caller, args)
    }

    pub fn error(&self, caller: &str, args: fmt::Arguments<'_>) {
        self.log(Severity::Error, caller, args)
    }

    pub fn warn(&self, caller: &str, args: fmt::Arguments<'_>) {
        self.log(Severity::Warn, caller, args)
    }

    pub fn info(&self, caller: &str, args: fmt::Arguments<'_>) {
        self.log(Severity::Info, caller, args)
    }

    pub fn debug(&self, caller: &str, args: fmt::Arguments<'_>) {
        self.log(Severity::Debug, caller, args)
    }

    /// Filters by the configured ceiling and hands the line to every sink.
    pub fn log(&self, severity: Severity, caller: &str, args: fmt::Arguments<'_>) {
        if !self.is_initialized() {
            // unsynchronized on purpose: racing first calls may each load
            self.load();
            self.initialized.store(true, Ordering::Release);
        }
        let Some(active) = read(&self.active).clone() else {
            return;
        };
        if !active.config.level.permits(severity) {
            return;
        }
        let line = LogLine::new(severity, caller, args.to_string());
        for sink in &active.sinks {
            if let Err(err) = sink.write(&line)
                && sink.reports_failures()
            {
                diagnostic(&err.to_string());
            }
        }
    }

    fn load(&self) {
        let path = read(&self.config_path).clone();
        let config = match LogConfig::load(&path, self.policy) {
            Ok(config) => config,
            Err(err) => match self.config() {
                Some(previous) => {
                    diagnostic(&format!("{err}, keeping previous parameters"));
                    previous
                }
                None => {
                    diagnostic(&format!("{err}, using built-in defaults"));
                    LogConfig::fallback()
                }
            },
        };
        let process_tag = write(&self.process_tag)
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();
        let sinks = self.build_sinks(&config, &process_tag);
        *write(&self.active) = Some(Arc::new(Active { config, sinks }));
    }

    fn build_sinks(&self, config: &LogConfig, process_tag: &str) -> Vec<Box<dyn LogWriter>> {
        let mut sinks: Vec<Box<dyn LogWriter>> = Vec::new();
        if config.console {
            sinks.push(Box::new(match &self.console_output {
                Some(output) => LogStdout::with_output(Arc::clone(output), config.color),
                None => LogStdout::new(config.color),
            }));
        }
        if config.syslog.enabled {
            sinks.push(Box::new(LogSyslog::new(&config.syslog, process_tag)));
        }
        if config.file {
            sinks.push(Box::new(LogFileRing::new(config, Arc::clone(&self.rotation))));
        }
        sinks
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Process-wide logger used by the macros without `logger:`.
static GLOBAL_LOGGER: LazyLock<RwLock<Arc<Logger>>> = LazyLock::new(|| {
    if log::set_logger(&FACADE).is_ok() {
        log::set_max_level(LevelFilter::Trace);
    }
    RwLock::new(Arc::new(Logger::new()))
});

/// Routes `log` crate records into the process-wide logger.
struct LogFacade;

static FACADE: LogFacade = LogFacade;

impl Log for LogFacade {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let caller = record.module_path().unwrap_or_else(|| record.target());
        global().log(record.level().into(), caller, *record.args());
    }

    fn flush(&self) {}
}

/// The process-wide logger.
pub fn global() -> Arc<Logger> {
    Arc::clone(&read(&GLOBAL_LOGGER))
}

/// Initializes the process-wide logger. See [`Logger::initialize`].
pub fn initialize<P: AsRef<Path>>(config_path: P, run_id: &str) {
    global().initialize(config_path, run_id)
}

/// Reloads the process-wide logger. See [`Logger::reload`].
pub fn reload() {
    global().reload()
}

/// Builder for configuring and creating a logger.
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    default_path: Option<PathBuf>,
    run_id: Option<String>,
    sink_policy: SinkPolicy,
    console_output: Option<SharedOutput>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            config_path: None,
            default_path: None,
            run_id: None,
            sink_policy: SinkPolicy::Forced,
            console_output: None,
        }
    }
}

impl ConfigBuilder {
    /// Loads this config file when the logger is built.
    pub fn with_config_path<P: AsRef<Path>>(self, path: P) -> Self {
        Self {
            config_path: Some(path.as_ref().to_path_buf()),
            ..self
        }
    }
    /// Maybe loads a config file when the logger is built.
    pub fn maybe_with_config_path<P: AsRef<Path>>(self, path: Option<P>) -> Self {
        Self {
            config_path: path.map(|p| p.as_ref().to_path_buf()),
            ..self
        }
    }
    /// Path used by lazy initialization instead of `$RINGLOG_CONFIG_PATH`.
    pub fn with_default_path<P: AsRef<Path>>(self, path: P) -> Self {
        Self {
            default_path: Some(path.as_ref().to_path_buf()),
            ..self
        }
    }
    /// Sets the process tag sent to syslog.
    pub fn with_run_id(self, run_id: &str) -> Self {
        Self {
            run_id: Some(run_id.into()),
            ..self
        }
    }
    pub fn with_sink_policy(self, sink_policy: SinkPolicy) -> Self {
        Self {
            sink_policy,
            ..self
        }
    }
    /// Takes `CONSOLE` and `LOG2FILE` from the config document instead of
    /// forcing console on and file off.
    pub fn honor_sink_flags(self) -> Self {
        self.with_sink_policy(SinkPolicy::AsConfigured)
    }
    /// Sends console output to `writer` instead of stdout.
    pub fn with_console_output<W: Write + Send + 'static>(self, writer: W) -> Self {
        Self {
            console_output: Some(shared_output(writer)),
            ..self
        }
    }

    pub fn build(self) -> Logger {
        let Self {
            config_path,
            default_path,
            run_id,
            sink_policy,
            console_output,
        } = self;
        let logger = Logger {
            active: RwLock::new(None),
            initialized: AtomicBool::new(false),
            config_path: RwLock::new(
                default_path.unwrap_or_else(|| RINGLOG_ENV.config_path()),
            ),
            process_tag: RwLock::new(run_id.filter(|id| !id.is_empty())),
            rotation: Arc::new(Mutex::new(RotationState::default())),
            policy: sink_policy,
            console_output,
        };
        if let Some(path) = config_path {
            *write(&logger.config_path) = path;
            logger.reload();
        }
        logger
    }

    /// Builds the logger and makes it the process-wide one.
    pub fn init_global(self) -> Arc<Logger> {
        let logger = Arc::new(self.build());
        *write(&GLOBAL_LOGGER) = Arc::clone(&logger);
        logger
    }
}

/// Returns a default ConfigBuilder for configuring the logger.
pub fn logger_config() -> ConfigBuilder {
    ConfigBuilder::default()
}
