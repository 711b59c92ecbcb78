use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::core::config::LogConfig;

/// Daily rolling file named `<prefix>.<yyyy-mm-dd>` under the log directory
pub fn file_appender(config: &LogConfig) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(config.file_prefix.as_str())
        .build(&config.dir)
}

/// Install the global subscriber: console filtered by `RUST_LOG`, plus the
/// rolling file when enabled. The returned guard flushes the file writer on
/// drop and must live until shutdown.
pub fn init(config: &LogConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = if config.file_enabled {
        let file_filter = EnvFilter::try_new(&config.file_filter)
            .map_err(|e| anyhow::anyhow!("Invalid LOG_FILE_FILTER: {}", e))?;
        let (writer, guard) = tracing_appender::non_blocking(file_appender(config)?);
        let layer = fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(file_filter);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(console_filter))
        .with(file_layer)
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_appender_writes_into_log_dir() {
        let dir = std::env::temp_dir().join(format!("villa-log-{}", uuid::Uuid::new_v4()));
        let config = LogConfig {
            file_enabled: true,
            dir: dir.to_string_lossy().into_owned(),
            file_prefix: "villa.log".to_string(),
            file_filter: "debug".to_string(),
        };

        let mut appender = file_appender(&config).unwrap();
        appender.write_all(b"Get villa error with id: 0\n").unwrap();
        appender.flush().unwrap();

        let files: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files.len(), 1);
        assert!(files[0].starts_with("villa.log."));

        let contents = std::fs::read_to_string(dir.join(&files[0])).unwrap();
        assert!(contents.contains("Get villa error with id: 0"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
