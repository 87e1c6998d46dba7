use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::info;
use url::Url;

use crate::utils::error::{PaymentError, Result};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
    pub file_path: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,         // 秒
    pub connect_timeout_secs: u64, // 秒
    pub user_agent: Option<String>,
    pub log_bodies: bool,
}

// 单个网关的商户凭据
#[derive(Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    pub payment_gateway: Url,
    #[serde(default)]
    pub merchant: String,
    pub secure_secret: String,
    #[serde(default)]
    pub access_code: Option<String>,
    #[serde(default)]
    pub receiver_email: Option<String>,
    #[serde(default)]
    pub merchant_code: Option<String>,
}

impl GatewayConfig {
    pub fn new(payment_gateway: &str, merchant: &str, secure_secret: &str) -> Result<Self> {
        Ok(Self {
            payment_gateway: Url::parse(payment_gateway)?,
            merchant: merchant.to_string(),
            secure_secret: secure_secret.to_string(),
            access_code: None,
            receiver_email: None,
            merchant_code: None,
        })
    }

    pub fn with_access_code(mut self, access_code: &str) -> Self {
        self.access_code = Some(access_code.to_string());
        self
    }

    pub fn with_receiver_email(mut self, receiver_email: &str) -> Self {
        self.receiver_email = Some(receiver_email.to_string());
        self
    }

    pub fn with_merchant_code(mut self, merchant_code: &str) -> Self {
        self.merchant_code = Some(merchant_code.to_string());
        self
    }

    pub fn require_access_code(&self, gateway: &str) -> Result<&str> {
        required(&self.access_code, gateway, "access_code")
    }

    pub fn require_receiver_email(&self, gateway: &str) -> Result<&str> {
        required(&self.receiver_email, gateway, "receiver_email")
    }

    pub fn require_merchant_code(&self, gateway: &str) -> Result<&str> {
        required(&self.merchant_code, gateway, "merchant_code")
    }
}

fn required<'a>(value: &'a Option<String>, gateway: &str, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PaymentError::Configuration(format!("{gateway}: {name} is required")))
}

// 日志中不输出密钥
impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("payment_gateway", &self.payment_gateway.as_str())
            .field("merchant", &self.merchant)
            .field("secure_secret", &"*****")
            .field("access_code", &self.access_code.as_ref().map(|_| "*****"))
            .field("receiver_email", &self.receiver_email)
            .field("merchant_code", &self.merchant_code)
            .finish()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct GatewaysConfig {
    #[serde(default)]
    pub onepay_domestic: Option<GatewayConfig>,
    #[serde(default)]
    pub onepay_international: Option<GatewayConfig>,
    #[serde(default)]
    pub vnpay: Option<GatewayConfig>,
    #[serde(default)]
    pub nganluong: Option<GatewayConfig>,
    #[serde(default)]
    pub sohapay: Option<GatewayConfig>,
}

impl GatewaysConfig {
    // 各网关公开的沙箱凭据
    pub fn sandbox() -> Self {
        Self {
            onepay_domestic: GatewayConfig::new(
                "https://mtf.onepay.vn/onecomm-pay/vpc.op",
                "ONEPAY",
                "A3EFDFABA8653DF2342E8DAC29B51AF0",
            )
            .ok()
            .map(|c| c.with_access_code("D67342C2")),
            onepay_international: GatewayConfig::new(
                "https://mtf.onepay.vn/vpcpay/vpcpay.op",
                "TESTONEPAY",
                "6D0870CDE5F24F34F3915FB0045120DB",
            )
            .ok()
            .map(|c| c.with_access_code("6BEB2546")),
            vnpay: GatewayConfig::new(
                "http://sandbox.vnpayment.vn/paymentv2/vpcpay.html",
                "COCOSIN",
                "RAOEXHYVSDDIIENYWSLDIIZTANXUXZFJ",
            )
            .ok(),
            nganluong: GatewayConfig::new(
                "https://sandbox.nganluong.vn:8088/nl30/checkout.api.nganluong.post.php",
                "45571",
                "c57700e78cb0df1766279d91e3233c79",
            )
            .ok()
            .map(|c| c.with_receiver_email("tung.tran@naustud.io")),
            sohapay: GatewayConfig::new("https://sohapay.vn/payment.php", "", "1234567890")
                .ok()
                .map(|c| c.with_merchant_code("test")),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub gateways: GatewaysConfig,
    pub environment: String,
    pub service_name: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let config_path = dotenvy::var("CONFIG_PATH").unwrap_or_else(|_| {
            format!("{}/config/application.toml", env!("CARGO_MANIFEST_DIR"))
        });

        Self::load_from(Path::new(&config_path))
    }

    // 默认值 < 配置文件 < APP__ 环境变量
    pub fn load_from(path: &Path) -> Result<Self> {
        info!("Loading configuration from {}", path.display());

        // 配置文件存在时，网关列表只取文件里声明的
        let mut defaults = AppConfig::default();
        if path.exists() {
            defaults.gateways = GatewaysConfig::default();
        }

        let builder = Config::builder()
            .add_source(Config::try_from(&defaults)?)
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__"),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment.to_lowercase() == "development"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                json_format: false,
                file_path: None,
            },
            http: HttpConfig {
                timeout_secs: 30,
                connect_timeout_secs: 10,
                user_agent: None,
                log_bodies: true,
            },
            gateways: GatewaysConfig::sandbox(),
            environment: "development".to_string(),
            service_name: "vn_payments".to_string(),
        }
    }
}
