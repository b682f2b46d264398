use colored::Colorize;
use nix::unistd::gethostname;

/// Prints a one-line diagnostic about the logger itself on stderr.
///
/// The logger cannot report its own failures through its sinks, so this is the
/// only channel for config and file-sink problems.
pub fn diagnostic(message: &str) {
    eprintln!("{} {message}", "ringlog:".yellow().bold());
}

/// Host name used in syslog frames, `localhost` if the system has none.
pub fn hostname() -> String {
    gethostname()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".into())
}
