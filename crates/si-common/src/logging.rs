//! Process-wide tracing setup for the service binaries.

use std::any::Any;
use std::panic;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Logging options, usually filled from the `SI_LOG_*` flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub app_name: &'static str,
    /// Daily-rotated `<dir>/<app_name>.log` when set; stdout otherwise.
    pub directory: Option<PathBuf>,
    /// Used when `RUST_LOG` is unset or unparsable.
    pub default_filter: String,
    /// Also run the default panic hook, which prints the backtrace.
    pub include_backtrace: bool,
}

impl LogSettings {
    pub fn stdout(app_name: &'static str) -> Self {
        Self {
            app_name,
            directory: None,
            default_filter: "info".to_string(),
            include_backtrace: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    DailyFile(PathBuf),
}

/// Where logs will go, plus a warning to emit once the subscriber is up when
/// the configured directory could not be used.
pub fn resolve_target(settings: &LogSettings) -> (LogTarget, Option<String>) {
    let Some(dir) = settings.directory.as_ref() else {
        return (LogTarget::Stdout, None);
    };

    match std::fs::create_dir_all(dir) {
        Ok(()) => (LogTarget::DailyFile(dir.clone()), None),
        Err(err) => (
            LogTarget::Stdout,
            Some(format!(
                "cannot use log directory {}: {err}; logging to stdout",
                dir.display()
            )),
        ),
    }
}

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Later calls keep the first subscriber.
pub fn init_tracing(settings: &LogSettings) -> LogTarget {
    let (target, fallback_warning) = resolve_target(settings);
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(&settings.default_filter));

    match &target {
        LogTarget::DailyFile(dir) => {
            let appender =
                tracing_appender::rolling::daily(dir, format!("{}.log", settings.app_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            let _ = builder.with_writer(BoxMakeWriter::new(writer)).try_init();
        }
        LogTarget::Stdout => {
            let _ = builder.try_init();
        }
    }

    if let Some(warning) = fallback_warning {
        tracing::warn!(application = settings.app_name, "{warning}");
    }

    target
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".into())
}

/// Route panics through `tracing`. Installed at most once per process.
pub fn install_panic_hook(settings: &LogSettings) {
    static INSTALLED: OnceLock<()> = OnceLock::new();

    let app_name = settings.app_name;
    let include_backtrace = settings.include_backtrace;

    INSTALLED.get_or_init(|| {
        let default_hook = panic::take_hook();

        panic::set_hook(Box::new(move |info| {
            let thread = std::thread::current();
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()));

            tracing::error!(
                application = app_name,
                thread = thread.name().unwrap_or("unnamed"),
                location = location.as_deref().unwrap_or("unknown"),
                message = %panic_message(info.payload()),
                "panicked"
            );

            if include_backtrace {
                default_hook(info);
            }
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("si-logging-{}-{name}", std::process::id()))
    }

    #[test]
    fn no_directory_means_stdout() {
        let (target, warning) = resolve_target(&LogSettings::stdout("si-test"));
        assert_eq!(target, LogTarget::Stdout);
        assert!(warning.is_none());
    }

    #[test]
    fn creates_missing_log_directory() {
        let dir = scratch_dir("nested").join("logs");
        let settings = LogSettings {
            directory: Some(dir.clone()),
            ..LogSettings::stdout("si-test")
        };

        let (target, warning) = resolve_target(&settings);

        assert_eq!(target, LogTarget::DailyFile(dir.clone()));
        assert!(warning.is_none());
        assert!(dir.is_dir());
        let _ = std::fs::remove_dir_all(scratch_dir("nested"));
    }

    #[test]
    fn unusable_directory_falls_back_to_stdout_with_warning() {
        let file = scratch_dir("plain-file");
        std::fs::write(&file, b"not a directory").unwrap();
        let settings = LogSettings {
            directory: Some(file.join("logs")),
            ..LogSettings::stdout("si-test")
        };

        let (target, warning) = resolve_target(&settings);

        assert_eq!(target, LogTarget::Stdout);
        assert!(warning.unwrap().contains("logging to stdout"));
        let _ = std::fs::remove_file(&file);
    }

    #[test]
    fn panic_payloads_render_as_text() {
        let borrowed: Box<dyn Any + Send> = Box::new("boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("bang"));
        let other: Box<dyn Any + Send> = Box::new(42_u8);

        assert_eq!(panic_message(borrowed.as_ref()), "boom");
        assert_eq!(panic_message(owned.as_ref()), "bang");
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }
}
