use std::{
    io::{self, Write},
    sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, Local, NaiveDate};

use crate::{
    error::{Error, Result},
    severity::Severity,
};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// One log call, stamped at emission.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub severity: Severity,
    pub caller: String,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

impl LogLine {
    pub fn new(severity: Severity, caller: impl Into<String>, message: impl Into<String>) -> Self {
        Self::at(severity, caller, message, Local::now())
    }

    pub fn at(
        severity: Severity,
        caller: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            severity,
            caller: caller.into(),
            message: message.into(),
            timestamp,
        }
    }

    /// `[SEVERITY] [caller]message`, without timestamp.
    pub fn body(&self) -> String {
        format!("[{}] [{}]{}", self.severity, self.caller, self.message)
    }

    /// The body prefixed with the millisecond timestamp, newline-terminated.
    pub fn stamped(&self) -> String {
        format!("{} {}\n", self.timestamp.format(TIMESTAMP_FORMAT), self.body())
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// A sink receiving composed log lines.
pub trait LogWriter: Send + Sync {
    fn write(&self, line: &LogLine) -> Result<()>;

    /// Whether a failed write deserves a diagnostic. Silent by default.
    fn reports_failures(&self) -> bool {
        false
    }
}

/// Writer shared between the logger and its console sinks across reloads.
pub type SharedOutput = Arc<Mutex<Box<dyn Write + Send>>>;

pub fn shared_output<W: Write + Send + 'static>(writer: W) -> SharedOutput {
    Arc::new(Mutex::new(Box::new(writer)))
}

/// Console sink. Writes to stdout unless another output was injected.
#[derive(Default)]
pub struct LogStdout {
    output: Option<SharedOutput>,
    color: bool,
}

impl LogStdout {
    pub fn new(color: bool) -> Self {
        Self {
            output: None,
            color,
        }
    }

    pub fn with_output(output: SharedOutput, color: bool) -> Self {
        Self {
            output: Some(output),
            color,
        }
    }

    fn render(&self, line: &LogLine) -> String {
        if !self.color {
            return line.stamped();
        }
        format!(
            "{} [{}] [{}]{}\n",
            line.timestamp.format(TIMESTAMP_FORMAT),
            line.severity.colored_name(),
            line.caller,
            line.message
        )
    }
}

impl LogWriter for LogStdout {
    fn write(&self, line: &LogLine) -> Result<()> {
        let rendered = self.render(line);
        let written = match &self.output {
            Some(output) => {
                let mut output = output.lock().unwrap_or_else(PoisonError::into_inner);
                output
                    .write_all(rendered.as_bytes())
                    .and_then(|_| output.flush())
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(rendered.as_bytes())
                    .and_then(|_| stdout.flush())
            }
        };
        written.map_err(Error::Console)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn noon() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 10, 19, 12, 0, 0)
            .single()
            .unwrap()
    }

    #[test]
    fn test_line_layout() {
        let line = LogLine::at(Severity::Warn, "app::run", "disk at 91%", noon());
        assert_eq!(line.body(), "[WARN] [app::run]disk at 91%");
        assert_eq!(
            line.stamped(),
            "2026-10-19 12:00:00.000 [WARN] [app::run]disk at 91%\n"
        );
        assert_eq!(line.date(), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
    }

    #[test]
    fn test_timestamp_has_millisecond_precision() {
        let line = LogLine::new(Severity::Info, "main", "hello");
        let pattern =
            regex::Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{3} \[INFO\] \[main\]hello\n$")
                .unwrap();
        assert!(pattern.is_match(&line.stamped()), "{}", line.stamped());
    }

    #[test]
    fn test_log_stdout() {
        let capture = Capture::default();
        let stdout = LogStdout::with_output(shared_output(capture.clone()), false);
        stdout
            .write(&LogLine::at(Severity::Error, "a::b", "first", noon()))
            .unwrap();
        stdout
            .write(&LogLine::at(Severity::Debug, "a::c", "second", noon()))
            .unwrap();
        assert_eq!(
            capture.text(),
            "2026-10-19 12:00:00.000 [ERROR] [a::b]first\n2026-10-19 12:00:00.000 [DEBUG] [a::c]second\n"
        );
        // real stdout must not fail either
        LogStdout::new(false)
            .write(&LogLine::at(Severity::Info, "a::d", "to stdout", noon()))
            .unwrap();
    }

    #[test]
    fn test_colored_console_keeps_text() {
        colored::control::set_override(true);
        let capture = Capture::default();
        let stdout = LogStdout::with_output(shared_output(capture.clone()), true);
        stdout
            .write(&LogLine::at(Severity::Warn, "a::b", "careful", noon()))
            .unwrap();
        let text = capture.text();
        assert!(text.starts_with("2026-10-19 12:00:00.000 ["));
        assert!(text.contains("\x1b["));
        assert!(text.ends_with("] [a::b]careful\n"));
    }
}
