use async_trait::async_trait;
use chrono::Local;
use tracing::info;
use url::Url;

use crate::adapters::{field, minor_units, param_map, GatewayKind, PaymentAdapter};
use crate::config::GatewayConfig;
use crate::domain::canonical::{CanonicalPolicy, ParamMap, PrefixFilter};
use crate::domain::models::{CallbackQuery, CheckoutRequest, Locale, ReturnFields, VerificationResult};
use crate::domain::profile::GatewayProfile;
use crate::domain::url_builder::build_signed_url;
use crate::domain::validation::{validate, Check, FieldRule};
use crate::domain::verifier;
use crate::utils::crypto::DigestAlgorithm;
use crate::utils::error::{PaymentError, Result};

pub mod status;

pub const VERSION: &str = "2";
pub const COMMAND: &str = "pay";
pub const CURRENCY_VND: &str = "VND";
pub const LOCALE_VN: &str = "vn";
pub const LOCALE_EN: &str = "en";

// vnp_CreateDate 格式
const CREATE_DATE_FORMAT: &str = "%Y%m%d%H%M%S";

const VNP_POLICY: CanonicalPolicy = CanonicalPolicy::sorted(PrefixFilter::Prefixes(&["vnp_", "user_"]));

pub const PROFILE: GatewayProfile = GatewayProfile {
    name: "VNPay",
    sign_policy: VNP_POLICY,
    verify_policy: VNP_POLICY,
    algorithm: DigestAlgorithm::Md5Concat,
    signature_param: "vnp_SecureHash",
    callback_signature_param: "vnp_SecureHash",
    hash_type: Some(("vnp_SecureHashType", "MD5")),
    response_code_param: "vnp_ResponseCode",
    approved_code: "00",
    sentinel_codes: &[],
    error_text_param: None,
};

const RULES: &[FieldRule] = &[
    FieldRule::new("amount", "Amount", &[Check::Required, Check::MaxValue(9_999_999_999)]),
    FieldRule::new("clientIp", "Client ip", &[Check::Required, Check::MaxLen(16)]),
    FieldRule::new("orderId", "Order ID", &[Check::Required, Check::MaxLen(34)]),
    FieldRule::new("orderInfo", "Order info", &[Check::Required, Check::MaxLen(255)]),
    FieldRule::new("orderType", "Order type", &[Check::Required, Check::MaxLen(40)]),
    FieldRule::new("returnUrl", "Return url", &[Check::Required, Check::MaxLen(255)]),
    FieldRule::new("transactionId", "Transaction ID", &[Check::Required, Check::MaxLen(40)]),
    FieldRule::new("currency", "Currency", &[Check::Required, Check::OneOf(&[CURRENCY_VND])]),
    FieldRule::new("locale", "Locale", &[Check::Required, Check::OneOf(&[LOCALE_VN, LOCALE_EN])]),
    FieldRule::new("createdDate", "Created date", &[Check::MaxLen(14)]),
    FieldRule::new("bankCode", "Bank code", &[Check::MaxLen(50)]),
    FieldRule::new("customerEmail", "Customer email", &[Check::MaxLen(255), Check::Email]),
    FieldRule::new("customerId", "Customer ID", &[Check::MaxLen(255)]),
    FieldRule::new("customerPhone", "Customer phone", &[Check::MaxLen(255)]),
];

/// VNPay 网关
///
/// 参数按键名排序后以 `md5(secret + canonical)` 签名，并附带 `vnp_SecureHashType=MD5`。
#[derive(Debug, Clone)]
pub struct VnPayAdapter {
    config: GatewayConfig,
}

impl VnPayAdapter {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        if config.merchant.is_empty() || config.merchant.chars().count() > 16 {
            return Err(PaymentError::Configuration(format!(
                "{}: merchant is required and cannot exceed 16 characters",
                PROFILE.name
            )));
        }

        Ok(Self { config })
    }

    pub fn checkout_url(&self, request: &CheckoutRequest) -> Result<Url> {
        let data = with_defaults(request);
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

    fn wire_params(&self, data: &CheckoutRequest) -> ParamMap {
        let created_date = data
            .created_date
            .clone()
            .filter(|date| !date.is_empty())
            .unwrap_or_else(|| Local::now().format(CREATE_DATE_FORMAT).to_string());

        param_map([
            ("vnp_Version", Some(VERSION.to_string())),
            ("vnp_Command", Some(COMMAND.to_string())),
            ("vnp_TmnCode", Some(self.config.merchant.clone())),
            ("vnp_Locale", data.locale.clone()),
            ("vnp_CurrCode", data.currency.clone()),
            ("vnp_TxnRef", data.order_id.clone()),
            ("vnp_OrderInfo", data.order_info.clone()),
            ("vnp_OrderType", data.order_type.clone()),
            ("vnp_Amount", data.amount.map(|amount| (amount * 100).to_string())),
            ("vnp_ReturnUrl", data.return_url.clone()),
            ("vnp_IpAddr", data.client_ip.clone()),
            ("vnp_CreateDate", Some(created_date)),
            ("vnp_BankCode", data.bank_code.clone()),
        ])
    }
}

fn with_defaults(request: &CheckoutRequest) -> CheckoutRequest {
    let mut data = request.clone();
    data.currency.get_or_insert_with(|| CURRENCY_VND.to_string());
    data.locale.get_or_insert_with(|| LOCALE_VN.to_string());
    data
}

fn return_fields(query: &CallbackQuery) -> ReturnFields {
    let code = field(query, "vnp_ResponseCode").unwrap_or_default();
    let locale = Locale::from_code(query.get("vnp_Locale").map(String::as_str));

    ReturnFields {
        merchant: field(query, "vnp_TmnCode"),
        transaction_id: field(query, "vnp_TxnRef"),
        amount: minor_units(query.get("vnp_Amount")),
        order_info: field(query, "vnp_OrderInfo"),
        bank_code: field(query, "vnp_BankCode"),
        bank_tran_no: field(query, "vnp_BankTranNo"),
        card_type: field(query, "vnp_CardType"),
        pay_date: field(query, "vnp_PayDate"),
        gateway_transaction_no: field(query, "vnp_TransactionNo"),
        secure_hash: field(query, "vnp_SecureHash"),
        message: Some(status::message(&code, locale).to_string()),
        response_code: Some(code).filter(|c| !c.is_empty()),
        ..Default::default()
    }
}

#[async_trait]
impl PaymentAdapter for VnPayAdapter {
    fn kind(&self) -> GatewayKind {
        GatewayKind::VnPay
    }

    async fn build_checkout_url(&self, request: &CheckoutRequest) -> Result<Url> {
        self.checkout_url(request)
    }

    async fn verify_return_url(&self, query: &CallbackQuery) -> Result<VerificationResult> {
        Ok(self.verify(query))
    }
}
