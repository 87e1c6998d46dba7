use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info_span, Instrument};
use url::Url;
use uuid::Uuid;

use crate::config::HttpConfig;
use crate::utils::error::{PaymentError, Result};

// HTTP客户端配置
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub log_bodies: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("vn-payments/{}", env!("CARGO_PKG_VERSION")),
            log_bodies: true,
        }
    }
}

impl From<&HttpConfig> for HttpClientConfig {
    fn from(config: &HttpConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            user_agent: config
                .user_agent
                .clone()
                .unwrap_or_else(|| HttpClientConfig::default().user_agent),
            log_bodies: config.log_bodies,
        }
    }
}

static SENSITIVE_FIELD: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)(merchant_password|password|token|secret)=([^&]*)").ok());

// 遮蔽表单中的敏感字段
pub fn mask_sensitive_data(data: &str) -> String {
    match SENSITIVE_FIELD.as_ref() {
        Some(regex) => regex.replace_all(data, "$1=*****").into_owned(),
        None => data.to_string(),
    }
}

// 网关传输层，便于测试替换
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    // 以表单方式 POST，返回响应文本
    async fn post_form(&self, url: &Url, params: &[(String, String)]) -> Result<String>;
}

// HTTP客户端
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| PaymentError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl GatewayTransport for HttpClient {
    async fn post_form(&self, url: &Url, params: &[(String, String)]) -> Result<String> {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!("gateway_request", method = "POST", url = %url, %request_id);

        async move {
            if self.config.log_bodies {
                let body = serde_urlencoded::to_string(params).unwrap_or_default();
                debug!(body = %mask_sensitive_data(&body), "HTTP request");
            }

            let response = self
                .client
                .post(url.clone())
                .form(params)
                .send()
                .await
                .map_err(|e| {
                    error!(error = %e, "HTTP request failed");
                    PaymentError::GatewayTransport(e.to_string())
                })?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| PaymentError::GatewayTransport(format!("Failed to read response body: {e}")))?;

            if self.config.log_bodies {
                debug!(status = status.as_u16(), response = %mask_sensitive_data(&body), "HTTP response");
            }

            if !status.is_success() {
                return Err(PaymentError::GatewayTransport(format!(
                    "Gateway responded with HTTP {}",
                    status.as_u16()
                )));
            }

            Ok(body)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mockall::mock! {
    pub Transport {}

    #[async_trait]
    impl GatewayTransport for Transport {
        async fn post_form(&self, url: &Url, params: &[(String, String)]) -> Result<String>;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn masks_password_and_token() {
        let masked = mask_sensitive_data("merchant_id=45571&merchant_password=abc&token=xyz&version=3.1");
        assert_eq!(masked, "merchant_id=45571&merchant_password=*****&token=*****&version=3.1");
    }

    #[tokio::test]
    async fn posts_form_body() {
        let server = MockServer::start_async().await;
        let mock = server.mock_async(|when, then| {
            when.method(POST)
                .path("/api")
                .body_contains("function=Ping");
            then.status(200).body("<result><error_code>00</error_code></result>");
        }).await;

        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        let url = Url::parse(&server.url("/api")).unwrap();
        let body = client
            .post_form(&url, &[("function".to_string(), "Ping".to_string())])
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(body.contains("<error_code>00</error_code>"));
    }

    #[tokio::test]
    async fn server_error_is_transport_error() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(POST).path("/api");
            then.status(502);
        }).await;

        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        let url = Url::parse(&server.url("/api")).unwrap();
        let result = client.post_form(&url, &[]).await;

        assert!(matches!(result, Err(PaymentError::GatewayTransport(_))));
    }
}
