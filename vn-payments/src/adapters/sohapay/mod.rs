use async_trait::async_trait;
use tracing::info;
use url::Url;

use crate::adapters::{amount, field, param_map, GatewayKind, PaymentAdapter};
use crate::config::GatewayConfig;
use crate::domain::canonical::{CanonicalPolicy, ParamMap, PrefixFilter};
use crate::domain::models::{CallbackQuery, CheckoutRequest, ReturnFields, VerificationResult};
use crate::domain::profile::GatewayProfile;
use crate::domain::url_builder::build_signed_url;
use crate::domain::validation::{validate, Check, FieldRule};
use crate::domain::verifier;
use crate::utils::crypto::DigestAlgorithm;
use crate::utils::error::{PaymentError, Result};

pub const VERSION: &str = "2";
pub const LANGUAGE_VN: &str = "vi";
pub const LANGUAGE_EN: &str = "en";

const ALL_KEYS: CanonicalPolicy = CanonicalPolicy::sorted(PrefixFilter::All);

// 下单签名放在 secure_hash，回调签名放在 secure_code
pub const PROFILE: GatewayProfile = GatewayProfile {
    name: "SohaPay",
    sign_policy: ALL_KEYS,
    verify_policy: ALL_KEYS,
    algorithm: DigestAlgorithm::HmacSha256Hex,
    signature_param: "secure_hash",
    callback_signature_param: "secure_code",
    hash_type: None,
    response_code_param: "response_code",
    approved_code: "0",
    sentinel_codes: &[],
    error_text_param: Some("error_text"),
};

const RULES: &[FieldRule] = &[
    FieldRule::new("language", "Language", &[Check::Required, Check::OneOf(&[LANGUAGE_VN, LANGUAGE_EN])]),
    FieldRule::new("orderId", "Order ID", &[Check::Required, Check::MaxLen(34)]),
    FieldRule::new("customerEmail", "Customer email", &[Check::Required, Check::MaxLen(24), Check::Email]),
    FieldRule::new("customerPhone", "Customer phone", &[Check::Required, Check::MaxLen(15)]),
    FieldRule::new("returnUrl", "Return url", &[Check::Required, Check::MaxLen(255)]),
    FieldRule::new("amount", "Amount", &[Check::Required, Check::MaxValue(9_999_999_999)]),
    FieldRule::new("transactionInfo", "Transaction info", &[Check::Required, Check::MaxLen(255)]),
    FieldRule::new("locale", "Locale", &[Check::MaxLen(2)]),
    FieldRule::new("currency", "Currency", &[Check::MaxLen(4)]),
    FieldRule::new("clientIp", "Client ip", &[Check::MaxLen(15)]),
    FieldRule::new("transactionId", "Transaction ID", &[Check::MaxLen(40)]),
    FieldRule::new("customerId", "Customer ID", &[Check::MaxLen(255)]),
];

/// SohaPay 网关
#[derive(Debug, Clone)]
pub struct SohaPayAdapter {
    config: GatewayConfig,
    site_code: String,
}

impl SohaPayAdapter {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let site_code = config.require_merchant_code(PROFILE.name)?.to_string();
        if site_code.chars().count() > 8 {
            return Err(PaymentError::Configuration(format!(
                "{}: merchant_code cannot exceed 8 characters",
                PROFILE.name
            )));
        }

        Ok(Self { config, site_code })
    }

    pub fn checkout_url(&self, request: &CheckoutRequest) -> Result<Url> {
        let mut data = request.clone();
        data.language.get_or_insert_with(|| LANGUAGE_VN.to_string());
        validate(&data, RULES)?;

        let url = build_signed_url(
            &self.config.payment_gateway,
            &PROFILE,
            &self.config.secure_secret,
            &self.wire_params(&data),
        );

        info!(
            gateway = PROFILE.name,
            order_id = data.order_id.as_deref().unwrap_or_default(),
            "Checkout URL built"
        );

        Ok(url)
    }

    pub fn verify(&self, query: &CallbackQuery) -> VerificationResult {
        let verdict = verifier::verify(&PROFILE, &self.config.secure_secret, query);
        VerificationResult::merge(return_fields(query), query.clone(), verdict)
    }

    // payment_type 固定为空，不参与签名
    fn wire_params(&self, data: &CheckoutRequest) -> ParamMap {
        param_map([
            ("language", data.language.clone()),
            ("order_code", data.order_id.clone()),
            ("order_email", data.customer_email.clone()),
            ("order_mobile", data.customer_phone.clone()),
            ("payment_type", Some(String::new())),
            ("price", data.amount.map(|v| v.to_string())),
            ("return_url", data.return_url.clone()),
            ("site_code", Some(self.site_code.clone())),
            ("transaction_info", data.transaction_info.clone()),
            ("version", Some(VERSION.to_string())),
        ])
    }
}

fn return_fields(query: &CallbackQuery) -> ReturnFields {
    ReturnFields {
        message: field(query, "error_text").or_else(|| field(query, "response_message")),
        transaction_id: field(query, "order_code"),
        customer_email: field(query, "order_email"),
        amount: amount(query.get("price")),
        merchant: field(query, "site_code"),
        response_code: field(query, "response_code"),
        order_info: field(query, "transaction_info"),
        secure_hash: field(query, "secure_code"),
        ..Default::default()
    }
}

#[async_trait]
impl PaymentAdapter for SohaPayAdapter {
    fn kind(&self) -> GatewayKind {
        GatewayKind::SohaPay
    }

    async fn build_checkout_url(&self, request: &CheckoutRequest) -> Result<Url> {
        self.checkout_url(request)
    }

    async fn verify_return_url(&self, query: &CallbackQuery) -> Result<VerificationResult> {
        Ok(self.verify(query))
    }
}
