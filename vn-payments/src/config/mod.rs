mod app_config;

pub use app_config::{AppConfig, GatewayConfig, GatewaysConfig, HttpConfig, LoggingConfig};
