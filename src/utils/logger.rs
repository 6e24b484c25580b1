// Logger initialization
//
// Console output always; a daily-rolling file under LOG_DIR when configured.
// The returned guard must live as long as the process so buffered file
// writes are flushed.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LogConfig;

pub const LOG_FILE_PREFIX: &str = "file-chat.log";

/// `RUST_LOG` wins over the configured filter.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

pub fn init_logger(config: &LogConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .try_init()?;

    if let Some(dir) = &config.log_dir {
        tracing::info!(dir = %dir.display(), "Writing logs to file");
    }
    Ok(guard)
}
