use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::{self, Write};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Environment variable that raises logging for subprocess and external crates
pub const VERBOSE_ENV: &str = "SVN_BUILDINFO_VERBOSE";

struct BuildInfoLogger;

static LOGGER: BuildInfoLogger = BuildInfoLogger;
static LOGGING_ENABLED: std::sync::LazyLock<Mutex<bool>> =
    std::sync::LazyLock::new(|| Mutex::new(false));
static LOG_FILE: std::sync::LazyLock<Mutex<Option<std::fs::File>>> =
    std::sync::LazyLock::new(|| Mutex::new(None));
static LOG_TO_STDERR: std::sync::LazyLock<Mutex<bool>> =
    std::sync::LazyLock::new(|| Mutex::new(false));
static VERBOSE_LOGGING: std::sync::LazyLock<Mutex<bool>> =
    std::sync::LazyLock::new(|| Mutex::new(false));

/// Writer for tracing events; only the log file receives them
#[derive(Clone)]
struct FileWriter;

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(file) = LOG_FILE.lock().as_mut() {
            let _ = file.write_all(buf);
            let _ = file.flush();
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = LOG_FILE.lock().as_mut() {
            let _ = file.flush();
        }
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FileWriter {
    type Writer = FileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        FileWriter
    }
}

impl log::Log for BuildInfoLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if !*LOGGING_ENABLED.lock() {
            return false;
        }

        if metadata.target().starts_with("svn_buildinfo") {
            if *VERBOSE_LOGGING.lock() {
                return metadata.level() <= Level::Trace;
            }
            return metadata.level() <= Level::Debug;
        }

        // Other crates only get through at warn unless verbose
        if *VERBOSE_LOGGING.lock() {
            metadata.level() <= Level::Debug
        } else {
            metadata.level() <= Level::Warn
        }
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let message = format!(
                "{} {} [{}] - {}\n",
                timestamp,
                record.level(),
                record.target(),
                record.args()
            );

            if let Some(file) = LOG_FILE.lock().as_mut() {
                let _ = file.write_all(message.as_bytes());
                let _ = file.flush();
            }

            // stdout carries generated module text, so echo goes to stderr
            if *LOG_TO_STDERR.lock() {
                eprint!("{message}");
            }
        }
    }

    fn flush(&self) {}
}

/// Initialize logging for both the `log` facade and `tracing`.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    use std::sync::{Once, OnceLock};
    static INIT: Once = Once::new();
    static INIT_RESULT: OnceLock<Result<(), String>> = OnceLock::new();

    INIT.call_once(|| {
        let verbose_from_env = std::env::var(VERBOSE_ENV).is_ok()
            || std::env::var("RUST_LOG").is_ok_and(|v| v.contains("debug") || v.contains("trace"));

        if verbose_from_env {
            set_verbose_logging(true);
        }

        enable_logging();

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "svn_buildinfo=debug,warn".into());

        let fmt_layer = fmt::Layer::new()
            .with_target(true)
            .with_level(true)
            .with_timer(fmt::time::ChronoUtc::rfc_3339())
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(FileWriter);

        let tracing_result = Registry::default()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();

        let log_result = log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Trace));

        let result = match (tracing_result, log_result) {
            // A `log` error means the host already installed a backend; keep theirs
            (Ok(()), _) => Ok(()),
            (Err(tracing_err), Ok(())) => {
                eprintln!("Note: Using log-only logging (tracing setup failed: {tracing_err})");
                Ok(())
            }
            (Err(tracing_err), Err(log_err)) => Err(format!(
                "Failed to initialize logging: tracing={tracing_err}, log={log_err}"
            )),
        };

        let _ = INIT_RESULT.set(result);
    });

    match INIT_RESULT.get() {
        Some(Ok(())) => Ok(()),
        Some(Err(e)) => Err(e.clone().into()),
        None => Err("Initialization failed unexpectedly".into()),
    }
}

pub fn enable_logging() {
    *LOGGING_ENABLED.lock() = true;
}

pub fn disable_logging() {
    *LOGGING_ENABLED.lock() = false;
}

pub fn set_verbose_logging(enabled: bool) {
    *VERBOSE_LOGGING.lock() = enabled;
}

pub fn set_log_file(file_path: &str) -> std::io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_path)?;

    *LOG_FILE.lock() = Some(file);
    Ok(())
}

pub fn set_log_to_stderr(enabled: bool) {
    *LOG_TO_STDERR.lock() = enabled;
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! trace_debug {
    (target: $target:expr, $($arg:tt)*) => {
        tracing::debug!(target: $target, $($arg)*)
    };
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_error_lands_in_log_file() {
        let temp_dir = TempDir::new().expect("Failed to create temporary directory");
        let path = temp_dir.path().join("buildinfo.log");

        init().expect("Failed to initialize logging");
        enable_logging();
        set_log_file(path.to_str().expect("utf-8 path")).expect("Failed to open log file");

        crate::log_error!("svn-buildinfo failed: {}", "config unreadable");
        *LOG_FILE.lock() = None;

        let written = std::fs::read_to_string(&path).expect("Failed to read log file");
        assert!(
            written.contains("ERROR [svn_buildinfo::logger::tests] - svn-buildinfo failed: config unreadable"),
            "unexpected log contents: {written}"
        );
    }
}
