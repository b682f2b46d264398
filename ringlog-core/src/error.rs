//! Error types for ringlog

use std::{io, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read log config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse log config {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write log file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unsupported syslog transport: {0}")]
    UnsupportedTransport(String),

    #[error("cannot reach syslog at {address}: {source}")]
    SyslogDial {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("syslog write failed: {0}")]
    SyslogWrite(#[source] io::Error),

    #[error("console write failed: {0}")]
    Console(#[source] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
