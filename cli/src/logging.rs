//! Tracing setup for the terminal
//!
//! Logs go to stderr by default, or to the platform log file
//! (e.g. ~/.local/share/consulta/logs/consulta.log) with `--log-file`.

use config::PathManager;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when RUST_LOG is not set
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "warn,consulta_core=debug,llm=debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Keep the returned guard alive for the
/// whole run or buffered file output is lost.
pub fn init_logging(verbose: bool, to_file: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    if to_file {
        match open_log_file() {
            Ok(file) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file);
                let subscriber = tracing_subscriber::registry().with(filter).with(
                    fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true),
                );
                if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
                    eprintln!("[consulta] Failed to set tracing subscriber: {}", e);
                }
                return Some(guard);
            }
            Err(e) => eprintln!("[consulta] {}; logging to stderr", e),
        }
    }

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true),
    );
    let _ = tracing::subscriber::set_global_default(subscriber);
    None
}

fn open_log_file() -> Result<std::fs::File, String> {
    let path = PathManager::log_file_path().ok_or("No log directory on this platform")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create log directory {}: {}", parent.display(), e))?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("Failed to open log file {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives(false), "warn");
        assert!(default_directives(true).contains("consulta_core=debug"));
        assert!(default_directives(true).contains("llm=debug"));
    }
}
