use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::shared::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "briefing.log";

/// Installs a stdout layer and a daily-rolling file layer under `log_dir`,
/// each with its own level. Keep the returned guard alive for the lifetime
/// of the process so buffered file output is flushed.
pub fn init(cfg: &LoggingConfig) -> anyhow::Result<WorkerGuard> {
    let stdout_filter: LevelFilter = cfg.stdout_level.parse()?;
    let file_filter: LevelFilter = cfg.file_level.parse()?;

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&cfg.log_dir, LOG_FILE_PREFIX));

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(true).with_filter(stdout_filter))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_filter(file_filter),
        )
        .try_init()?;

    info!(
        target: "briefing::logging",
        log_dir = %cfg.log_dir,
        stdout = %stdout_filter,
        file = %file_filter,
        "Logging initialized"
    );
    Ok(guard)
}

#[cfg(test)]
pub fn init_for_tests() {
    use std::sync::Once;
    use tracing_subscriber::EnvFilter;

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env().add_directive(
            "briefing=debug"
                .parse()
                .expect("static directive parses"),
        );

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
