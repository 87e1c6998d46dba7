use anyhow::{Context, Result};
use std::path::Path;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::AppConfig;

// 初始化日志，返回的 guard 需要在程序退出前保持存活
pub fn init_logging(config: &AppConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::from_str(&format!("{}={}", config.service_name, config.logging.level)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // 命令行的结果输出到 stdout，日志走 stderr
    let stderr_layer = if config.logging.json_format {
        fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer);

    // 如果配置了日志文件路径，添加文件输出
    let guard = if let Some(file_path) = &config.logging.file_path {
        let path = Path::new(file_path);
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .context("Logging file_path must name a file")?;
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, file_name);

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let file_layer = if config.logging.json_format {
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed()
        } else {
            fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed()
        };

        subscriber
            .with(file_layer)
            .try_init()
            .context("Failed to install tracing subscriber")?;
        Some(guard)
    } else {
        subscriber
            .try_init()
            .context("Failed to install tracing subscriber")?;
        None
    };

    tracing::info!("Logging initialized with level: {}", config.logging.level);

    Ok(guard)
}
