//! Shared logging initialization for the mmu binary.

use std::sync::OnceLock;

static INIT: OnceLock<()> = OnceLock::new();

fn parse_level(debug: bool) -> tracing::Level {
    if debug {
        return tracing::Level::DEBUG;
    }
    match std::env::var("MMU_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

/// Initialize process-level tracing output from `MMU_LOG`.
///
/// `debug` forces DEBUG regardless of the environment. Only the first call
/// installs the subscriber; later calls are no-ops. Log lines go to stderr so
/// that `--json` reports on stdout stay machine-readable.
pub fn init(debug: bool) {
    if INIT.get().is_some() {
        return;
    }
    let level = parse_level(debug);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    let _ = INIT.set(());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_debug_flag_wins_over_env() {
        unsafe {
            std::env::set_var("MMU_LOG", "error");
        }
        assert_eq!(parse_level(true), tracing::Level::DEBUG);
        assert_eq!(parse_level(false), tracing::Level::ERROR);
        unsafe {
            std::env::remove_var("MMU_LOG");
        }
    }

    #[test]
    #[serial]
    fn test_unknown_level_defaults_to_info() {
        unsafe {
            std::env::set_var("MMU_LOG", "chatty");
        }
        assert_eq!(parse_level(false), tracing::Level::INFO);
        unsafe {
            std::env::remove_var("MMU_LOG");
        }
    }
}
