use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Initialise logging. The level is `info` unless `debug` is set, in which
/// case it is `debug` and `RUST_LOG` may override it.
///
/// When `log_file` is given, output goes to that file as well as stderr.
/// The returned guard must stay alive for file output to be flushed.
pub fn init(
    debug: bool,
    log_file: Option<PathBuf>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    // Without debug logging `RUST_LOG` is ignored so a stray variable in the
    // user's environment can't make the viewer chatty.
    let level = if debug { "debug" } else { "info" };
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let Some(path) = log_file.as_deref() else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        return None;
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let Some(file_name) = path.file_name() else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        tracing::warn!(path = %path.display(), "log file path has no file name; logging to stderr only");
        return None;
    };

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer.and(std::io::stderr))
        .try_init();
    Some(guard)
}
