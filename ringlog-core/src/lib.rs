//! # ringlog-core
//! Core utilities for ringlog - sinks, rotation ring and configuration.

pub mod config;
mod error;
pub mod log_rotation;
mod log_writer;
mod severity;
pub mod syslog;
mod utils;

pub use config::{LogConfig, RINGLOG_ENV, SinkPolicy, SyslogConfig};
pub use error::{Error, Result};
pub use log_rotation::{LogFileRing, RotationState};
pub use log_writer::{LogLine, LogStdout, LogWriter, SharedOutput, TIMESTAMP_FORMAT, shared_output};
pub use severity::Severity;
pub use syslog::LogSyslog;
pub use utils::diagnostic;
