use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use strum_macros::{Display, EnumString};
use tracing::info;
use url::Url;

use crate::config::GatewaysConfig;
use crate::domain::canonical::ParamMap;
use crate::domain::models::{CallbackQuery, CheckoutRequest, VerificationResult};
use crate::utils::error::{PaymentError, Result};
use crate::utils::http_client::GatewayTransport;

pub mod nganluong;
pub mod onepay;
pub mod sohapay;
pub mod vnpay;

use nganluong::NganLuongAdapter;
use onepay::OnePayAdapter;
use sohapay::SohaPayAdapter;
use vnpay::VnPayAdapter;

/// 支付网关适配器公共接口
#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    /// 网关类型
    fn kind(&self) -> GatewayKind;

    /// 生成跳转到网关收银台的地址
    async fn build_checkout_url(&self, request: &CheckoutRequest) -> Result<Url>;

    /// 验证网关回调，只有二次查询的网络错误才返回 Err
    async fn verify_return_url(&self, query: &CallbackQuery) -> Result<VerificationResult>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum GatewayKind {
    #[strum(serialize = "onepay-domestic")]
    OnePayDomestic,
    #[strum(serialize = "onepay-international")]
    OnePayInternational,
    #[strum(serialize = "vnpay")]
    VnPay,
    #[strum(serialize = "nganluong")]
    NganLuong,
    #[strum(serialize = "sohapay")]
    SohaPay,
}

/// 网关适配器注册表
pub struct AdapterRegistry {
    adapters: HashMap<GatewayKind, Arc<dyn PaymentAdapter>>,
}

impl AdapterRegistry {
    // 根据配置注册所有已配置的网关
    pub fn from_config(config: &GatewaysConfig, transport: Arc<dyn GatewayTransport>) -> Result<Self> {
        let mut registry = Self {
            adapters: HashMap::new(),
        };

        if let Some(gateway) = &config.onepay_domestic {
            registry.register(Arc::new(OnePayAdapter::domestic(gateway.clone())?));
        }
        if let Some(gateway) = &config.onepay_international {
            registry.register(Arc::new(OnePayAdapter::international(gateway.clone())?));
        }
        if let Some(gateway) = &config.vnpay {
            registry.register(Arc::new(VnPayAdapter::new(gateway.clone())?));
        }
        if let Some(gateway) = &config.nganluong {
            registry.register(Arc::new(NganLuongAdapter::new(gateway.clone(), transport.clone())?));
        }
        if let Some(gateway) = &config.sohapay {
            registry.register(Arc::new(SohaPayAdapter::new(gateway.clone())?));
        }

        info!(gateways = ?registry.kinds(), "Payment adapters registered");

        Ok(registry)
    }

    pub fn register(&mut self, adapter: Arc<dyn PaymentAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    pub fn get(&self, kind: GatewayKind) -> Result<Arc<dyn PaymentAdapter>> {
        self.adapters
            .get(&kind)
            .cloned()
            .ok_or_else(|| PaymentError::UnsupportedGateway(kind.to_string()))
    }

    pub fn kinds(&self) -> Vec<GatewayKind> {
        let mut kinds: Vec<GatewayKind> = self.adapters.keys().copied().collect();
        kinds.sort_by_key(|kind| kind.to_string());
        kinds
    }
}

// 组装网关参数表，None 的字段不出现
pub(crate) fn param_map<I>(entries: I) -> ParamMap
where
    I: IntoIterator<Item = (&'static str, Option<String>)>,
{
    entries
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect()
}

// 回调中的字段
pub(crate) fn field(query: &CallbackQuery, key: &str) -> Option<String> {
    query.get(key).filter(|v| !v.is_empty()).cloned()
}

// 以最小单位 (x100) 回传的金额
pub(crate) fn minor_units(value: Option<&String>) -> Option<Decimal> {
    amount(value).map(|amount| (amount / Decimal::ONE_HUNDRED).normalize())
}

// 原样回传的金额，无法解析时不输出
pub(crate) fn amount(value: Option<&String>) -> Option<Decimal> {
    value.and_then(|v| v.trim().parse::<Decimal>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::utils::http_client::MockTransport;
    use std::str::FromStr;

    #[test]
    fn gateway_kind_parses_cli_names() {
        assert_eq!(GatewayKind::from_str("vnpay").unwrap(), GatewayKind::VnPay);
        assert_eq!(GatewayKind::from_str("OnePay-Domestic").unwrap(), GatewayKind::OnePayDomestic);
        assert_eq!(GatewayKind::SohaPay.to_string(), "sohapay");
        assert!(GatewayKind::from_str("paypal").is_err());
    }

    #[test]
    fn registry_only_holds_configured_gateways() {
        let config = GatewaysConfig {
            vnpay: Some(
                GatewayConfig::new(
                    "http://sandbox.vnpayment.vn/paymentv2/vpcpay.html",
                    "COCOSIN",
                    "RAOEXHYVSDDIIENYWSLDIIZTANXUXZFJ",
                )
                .unwrap(),
            ),
            ..Default::default()
        };

        let registry = AdapterRegistry::from_config(&config, Arc::new(MockTransport::new())).unwrap();

        assert_eq!(registry.kinds(), vec![GatewayKind::VnPay]);
        assert_eq!(registry.get(GatewayKind::VnPay).unwrap().kind(), GatewayKind::VnPay);
        assert!(matches!(
            registry.get(GatewayKind::SohaPay),
            Err(PaymentError::UnsupportedGateway(_))
        ));
    }

    #[test]
    fn registry_rejects_incomplete_config() {
        let config = GatewaysConfig {
            onepay_domestic: Some(
                GatewayConfig::new("https://mtf.onepay.vn/onecomm-pay/vpc.op", "ONEPAY", "A3EF").unwrap(),
            ),
            ..Default::default()
        };

        let result = AdapterRegistry::from_config(&config, Arc::new(MockTransport::new()));
        assert!(matches!(result, Err(PaymentError::Configuration(_))));
    }

    #[test]
    fn param_map_skips_missing_values() {
        let map = param_map([("a", Some("1".to_string())), ("b", None), ("c", Some(String::new()))]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("c").map(String::as_str), Some(""));
    }

    #[test]
    fn amounts_parse_as_decimal() {
        let raw = "90000000".to_string();
        assert_eq!(minor_units(Some(&raw)), Some(Decimal::from(900_000)));
        assert_eq!(amount(Some(&raw)), Some(Decimal::from(90_000_000)));
        assert_eq!(amount(Some(&"abc".to_string())), None);
        assert_eq!(minor_units(None), None);
    }
}
