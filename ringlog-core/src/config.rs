use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use derive_from_env::FromEnv;
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    severity::Severity,
};

pub const DEFAULT_CONFIG_PATH: &str = "./etc/log.json";
pub const DEFAULT_MODULE: &str = "DEFAULT";
pub const DEFAULT_MAX_FILE_SIZE: u64 = 40_960;
pub const MAX_FILE_SIZE_LIMIT: u64 = 4_096_000_000;
pub const DEFAULT_MAX_FILE_COUNT: u32 = 15;
pub const MAX_FILE_COUNT_LIMIT: u32 = 50;
pub const DEFAULT_LEVEL: Severity = Severity::Info;

pub const FALLBACK_SYSLOG_TRANSPORT: &str = "udp";
pub const FALLBACK_SYSLOG_ADDRESS: &str = "172.17.0.1";
pub const FALLBACK_SYSLOG_PORT: i64 = 514;

/// Process environment read once at first use.
#[derive(FromEnv)]
#[from_env(prefix = "RINGLOG")]
#[allow(non_snake_case)]
pub struct RinglogEnv {
    /// Config file used by lazy initialization.
    pub CONFIG_PATH: Option<String>,
}

impl RinglogEnv {
    pub fn config_path(&self) -> PathBuf {
        PathBuf::from(self.CONFIG_PATH.as_deref().unwrap_or(DEFAULT_CONFIG_PATH))
    }
}

pub static RINGLOG_ENV: LazyLock<RinglogEnv> =
    LazyLock::new(|| RinglogEnv::from_env().unwrap_or(RinglogEnv { CONFIG_PATH: None }));

pub fn default_directory() -> PathBuf {
    Path::new(".").join("log")
}

/// Remote syslog settings, the `SYSLOG` object of the config document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyslogConfig {
    #[serde(rename = "Use")]
    pub enabled: bool,
    /// `udp` or `tcp`.
    #[serde(rename = "Type")]
    pub transport: String,
    #[serde(rename = "Address")]
    pub address: String,
    /// Kept as written; an out-of-range port only fails the dial.
    #[serde(rename = "Port")]
    pub port: i64,
}

impl SyslogConfig {
    /// `address:port`, bracketing bare IPv6 literals.
    pub fn endpoint(&self) -> String {
        if self.address.contains(':') && !self.address.starts_with('[') {
            format!("[{}]:{}", self.address, self.port)
        } else {
            format!("{}:{}", self.address, self.port)
        }
    }
}

/// The config file as written on disk. Absent fields take their zero value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigDocument {
    #[serde(rename = "LOGDIR")]
    pub directory: String,
    #[serde(rename = "MAXFILESIZE")]
    pub max_file_size: i64,
    #[serde(rename = "MAXFILECOUNT")]
    pub max_file_count: i64,
    #[serde(rename = "LEVEL")]
    pub level: i64,
    #[serde(rename = "MODULE")]
    pub module: String,
    #[serde(rename = "CONSOLE")]
    pub console: bool,
    #[serde(rename = "LOG2FILE")]
    pub file: bool,
    #[serde(rename = "COLOR")]
    pub color: bool,
    #[serde(rename = "SYSLOG")]
    pub syslog: SyslogConfig,
}

/// How the console and file flags of a document are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SinkPolicy {
    /// Console always on and file always off, whatever the document says.
    #[default]
    Forced,
    /// `CONSOLE` and `LOG2FILE` are taken from the document.
    AsConfigured,
}

impl SinkPolicy {
    fn apply(self, console: bool, file: bool) -> (bool, bool) {
        match self {
            SinkPolicy::Forced => (true, false),
            SinkPolicy::AsConfigured => (console, file),
        }
    }
}

/// Validated logging parameters. Every field is within its documented bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub directory: PathBuf,
    pub max_file_size: u64,
    pub max_file_count: u32,
    pub level: Severity,
    pub module: String,
    pub console: bool,
    pub file: bool,
    pub color: bool,
    pub syslog: SyslogConfig,
}

impl LogConfig {
    /// Reads and validates a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P, policy: SinkPolicy) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let document: ConfigDocument =
            serde_json::from_str(&text).map_err(|source| Error::ParseConfig {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_document(document, policy))
    }

    pub fn from_document(document: ConfigDocument, policy: SinkPolicy) -> Self {
        let ConfigDocument {
            directory,
            max_file_size,
            max_file_count,
            level,
            module,
            console,
            file,
            color,
            syslog,
        } = document;
        let directory = if directory.is_empty() {
            default_directory()
        } else {
            PathBuf::from(directory)
        };
        let max_file_size = u64::try_from(max_file_size)
            .ok()
            .filter(|size| *size <= MAX_FILE_SIZE_LIMIT)
            .unwrap_or(DEFAULT_MAX_FILE_SIZE);
        let max_file_count = u32::try_from(max_file_count)
            .ok()
            .filter(|count| (1..=MAX_FILE_COUNT_LIMIT).contains(count))
            .unwrap_or(DEFAULT_MAX_FILE_COUNT);
        let level = Severity::from_rank(level).unwrap_or(DEFAULT_LEVEL);
        let module = if module.is_empty() {
            DEFAULT_MODULE.to_string()
        } else {
            module
        };
        let (console, file) = policy.apply(console, file);
        Self {
            directory,
            max_file_size,
            max_file_count,
            level,
            module,
            console,
            file,
            color,
            syslog,
        }
    }

    /// Built-in parameters used when no config could be loaded.
    pub fn fallback() -> Self {
        Self {
            directory: default_directory(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_file_count: DEFAULT_MAX_FILE_COUNT,
            level: DEFAULT_LEVEL,
            module: DEFAULT_MODULE.into(),
            console: true,
            file: false,
            color: false,
            syslog: SyslogConfig {
                enabled: true,
                transport: FALLBACK_SYSLOG_TRANSPORT.into(),
                address: FALLBACK_SYSLOG_ADDRESS.into(),
                port: FALLBACK_SYSLOG_PORT,
            },
        }
    }
}

impl fmt::Display for LogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DIR[{}] MAXFILECOUNT[{}] MAXFILESIZE[{}] LEVEL[{}] MODULE[{}] CONSOLE[{}] LOG2FILE[{}] SYSLOG[{}]",
            self.directory.display(),
            self.max_file_count,
            self.max_file_size,
            self.level,
            self.module,
            self.console,
            self.file,
            if self.syslog.enabled {
                format!("{} {}", self.syslog.transport, self.syslog.endpoint())
            } else {
                "off".into()
            },
        )
    }
}
