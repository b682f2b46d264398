use std::{
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use chrono::NaiveDate;

use crate::{
    config::LogConfig,
    error::{Error, Result},
    log_writer::{LogLine, LogWriter},
};

/// Rotation bookkeeping shared by every file sink of one logger.
///
/// Outlives configuration reloads so the ring position is kept.
#[derive(Debug)]
pub struct RotationState {
    current_index: u32,
    first_write: bool,
}

impl Default for RotationState {
    fn default() -> Self {
        Self {
            current_index: 1,
            first_write: true,
        }
    }
}

impl RotationState {
    pub fn current_index(&self) -> u32 {
        self.current_index
    }

    pub fn is_first_write(&self) -> bool {
        self.first_write
    }

    fn advance(&mut self, max_file_count: u32) {
        self.current_index = if self.current_index >= max_file_count {
            1
        } else {
            self.current_index + 1
        };
    }
}

/// `{directory}/{module}_{YYYYMMDD}_{index}.log`
pub fn ring_file_name(directory: &Path, module: &str, date: NaiveDate, index: u32) -> PathBuf {
    directory.join(format!("{module}_{}_{index}.log", date.format("%Y%m%d")))
}

/// Where the next line lands and how the file is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// The slot does not exist yet.
    Create(PathBuf),
    /// The slot is reused; previous content is discarded.
    Truncate(PathBuf),
    Append(PathBuf),
}

impl Placement {
    pub fn path(&self) -> &Path {
        match self {
            Placement::Create(path) | Placement::Truncate(path) | Placement::Append(path) => path,
        }
    }

    fn open(&self) -> Result<File> {
        let mut options = OpenOptions::new();
        match self {
            Placement::Create(_) | Placement::Append(_) => options.create(true).append(true),
            Placement::Truncate(_) => options.create(true).write(true).truncate(true),
        };
        options.open(self.path()).map_err(|source| Error::OpenFile {
            path: self.path().to_path_buf(),
            source,
        })
    }
}

/// File sink writing into a bounded ring of slots per module and day.
///
/// Each slot is capped at `max_file_size` bytes. Once `max_file_count` slots
/// are full the first one is truncated and reused. Files are opened, synced
/// and closed on every line, under the shared rotation lock.
pub struct LogFileRing {
    directory: PathBuf,
    module: String,
    max_file_size: u64,
    max_file_count: u32,
    state: Arc<Mutex<RotationState>>,
}

impl LogFileRing {
    pub fn new(config: &LogConfig, state: Arc<Mutex<RotationState>>) -> Self {
        Self {
            directory: config.directory.clone(),
            module: config.module.clone(),
            max_file_size: config.max_file_size,
            max_file_count: config.max_file_count,
            state,
        }
    }

    pub fn slot(&self, date: NaiveDate, index: u32) -> PathBuf {
        ring_file_name(&self.directory, &self.module, date, index)
    }

    /// Decides which slot receives the next line, advancing the ring when the
    /// active slot is full.
    pub fn place(&self, state: &mut RotationState, date: NaiveDate) -> Result<Placement> {
        // a reload may have shrunk the ring under the current index
        if state.current_index > self.max_file_count {
            state.current_index = 1;
        }
        let path = self.slot(date, state.current_index);
        let size = match fs::metadata(&path) {
            Ok(metadata) => metadata.len(),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                state.first_write = false;
                return Ok(Placement::Create(path));
            }
            Err(source) => return Err(Error::OpenFile { path, source }),
        };
        if state.first_write {
            // left over from a previous run
            state.first_write = false;
            return Ok(Placement::Truncate(path));
        }
        if size < self.max_file_size {
            return Ok(Placement::Append(path));
        }
        state.advance(self.max_file_count);
        Ok(Placement::Truncate(self.slot(date, state.current_index)))
    }
}

impl LogWriter for LogFileRing {
    fn write(&self, line: &LogLine) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        fs::create_dir_all(&self.directory).map_err(|source| Error::CreateDir {
            path: self.directory.clone(),
            source,
        })?;
        let placement = self.place(&mut state, line.date())?;
        let mut file = placement.open()?;
        file.write_all(line.stamped().as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|source| Error::WriteFile {
                path: placement.path().to_path_buf(),
                source,
            })
    }

    fn reports_failures(&self) -> bool {
        true
    }
}
