use async_trait::async_trait;
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
pub const DEFAULT_TITLE: &str = "VPC 3-Party";

const VPC_PREFIXES: PrefixFilter = PrefixFilter::Prefixes(&["vpc_", "user_"]);

// 字段顺序必须与网关文档一致
const DOMESTIC_KEYS: &[&str] = &[
    "AVS_City",
    "AVS_Country",
    "AVS_PostCode",
    "AVS_StateProv",
    "AVS_Street01",
    "AgainLink",
    "Title",
    "vpc_AccessCode",
    "vpc_Amount",
    "vpc_Command",
    "vpc_Currency",
    "vpc_Customer_Email",
    "vpc_Customer_Id",
    "vpc_Customer_Phone",
    "vpc_Locale",
    "vpc_MerchTxnRef",
    "vpc_Merchant",
    "vpc_OrderInfo",
    "vpc_ReturnURL",
    "vpc_SHIP_City",
    "vpc_SHIP_Country",
    "vpc_SHIP_Provice",
    "vpc_SHIP_Street01",
    "vpc_TicketNo",
    "vpc_Version",
];

// 国际卡网关不接收 vpc_Currency
const INTERNATIONAL_KEYS: &[&str] = &[
    "AVS_City",
    "AVS_Country",
    "AVS_PostCode",
    "AVS_StateProv",
    "AVS_Street01",
    "AgainLink",
    "Title",
    "vpc_AccessCode",
    "vpc_Amount",
    "vpc_Command",
    "vpc_Customer_Email",
    "vpc_Customer_Id",
    "vpc_Customer_Phone",
    "vpc_Locale",
    "vpc_MerchTxnRef",
    "vpc_Merchant",
    "vpc_OrderInfo",
    "vpc_ReturnURL",
    "vpc_SHIP_City",
    "vpc_SHIP_Country",
    "vpc_SHIP_Provice",
    "vpc_SHIP_Street01",
    "vpc_TicketNo",
    "vpc_Version",
];

const fn profile(name: &'static str, keys: &'static [&'static str]) -> GatewayProfile {
    GatewayProfile {
        name,
        sign_policy: CanonicalPolicy::fixed(keys, VPC_PREFIXES),
        verify_policy: CanonicalPolicy::sorted(VPC_PREFIXES),
        algorithm: DigestAlgorithm::HmacSha256Hex,
        signature_param: "vpc_SecureHash",
        callback_signature_param: "vpc_SecureHash",
        hash_type: None,
        response_code_param: "vpc_TxnResponseCode",
        approved_code: "0",
        sentinel_codes: &["7", "No Value Returned"],
        error_text_param: None,
    }
}

pub const DOMESTIC_PROFILE: GatewayProfile = profile("OnePayDomestic", DOMESTIC_KEYS);
pub const INTERNATIONAL_PROFILE: GatewayProfile = profile("OnePayInternational", INTERNATIONAL_KEYS);

const DOMESTIC_RULES: &[FieldRule] = &[
    FieldRule::new("againLink", "Again link", &[Check::MaxLen(64), Check::Url]),
    FieldRule::new("amount", "Amount", &[Check::Required, Check::MaxValue(9_999_999_999)]),
    FieldRule::new("billingCity", "Billing city", &[Check::MaxLen(64)]),
    FieldRule::new("billingCountry", "Billing country", &[Check::MaxLen(2)]),
    FieldRule::new("billingPostCode", "Billing post code", &[Check::MaxLen(64)]),
    FieldRule::new("billingStateProvince", "Billing state province", &[Check::MaxLen(64)]),
    FieldRule::new("billingStreet", "Billing street", &[Check::MaxLen(64)]),
    FieldRule::new("clientIp", "Client ip", &[Check::Required, Check::MaxLen(15)]),
    FieldRule::new("currency", "Currency", &[Check::Required, Check::OneOf(&[CURRENCY_VND])]),
    FieldRule::new("customerEmail", "Customer email", &[Check::MaxLen(24), Check::Email]),
    FieldRule::new("customerId", "Customer ID", &[Check::MaxLen(64)]),
    FieldRule::new("customerPhone", "Customer phone", &[Check::MaxLen(16)]),
    FieldRule::new("deliveryAddress", "Delivery address", &[Check::MaxLen(64)]),
    FieldRule::new("deliveryCity", "Delivery city", &[Check::MaxLen(64)]),
    FieldRule::new("deliveryCountry", "Delivery country", &[Check::MaxLen(8)]),
    FieldRule::new("deliveryProvince", "Delivery province", &[Check::MaxLen(64)]),
    FieldRule::new("locale", "Locale", &[Check::Required, Check::OneOf(&[LOCALE_VN, LOCALE_EN])]),
    FieldRule::new("orderId", "Order ID", &[Check::Required, Check::MaxLen(32)]),
    // 文档写的是 64，实际网关接受更长的地址
    FieldRule::new("returnUrl", "Return url", &[Check::Required, Check::MaxLen(255), Check::Url]),
    FieldRule::new("title", "Title", &[Check::MaxLen(255)]),
    FieldRule::new("transactionId", "Transaction ID", &[Check::Required, Check::MaxLen(34)]),
];

const INTERNATIONAL_RULES: &[FieldRule] = &[
    FieldRule::new("againLink", "Again link", &[Check::Required, Check::MaxLen(255)]),
    FieldRule::new("amount", "Amount", &[Check::Required, Check::MaxValue(9_999_999_999)]),
    FieldRule::new("billingCity", "Billing city", &[Check::MaxLen(255)]),
    FieldRule::new("billingCountry", "Billing country", &[Check::MaxLen(255)]),
    FieldRule::new("billingPostCode", "Billing post code", &[Check::MaxLen(255)]),
    FieldRule::new("billingStateProvince", "Billing state province", &[Check::MaxLen(255)]),
    FieldRule::new("billingStreet", "Billing street", &[Check::MaxLen(255)]),
    FieldRule::new("clientIp", "Client ip", &[Check::Required, Check::MaxLen(45)]),
    FieldRule::new("currency", "Currency", &[Check::Required, Check::OneOf(&[CURRENCY_VND])]),
    FieldRule::new("customerEmail", "Customer email", &[Check::MaxLen(255), Check::Email]),
    FieldRule::new("customerId", "Customer ID", &[Check::MaxLen(255)]),
    FieldRule::new("customerPhone", "Customer phone", &[Check::MaxLen(255)]),
    FieldRule::new("deliveryAddress", "Delivery address", &[Check::MaxLen(255)]),
    FieldRule::new("deliveryCity", "Delivery city", &[Check::MaxLen(255)]),
    FieldRule::new("deliveryCountry", "Delivery country", &[Check::MaxLen(255)]),
    FieldRule::new("deliveryProvince", "Delivery province", &[Check::MaxLen(255)]),
    FieldRule::new("locale", "Locale", &[Check::Required, Check::OneOf(&[LOCALE_VN, LOCALE_EN])]),
    FieldRule::new("orderId", "Order ID", &[Check::Required, Check::MaxLen(34)]),
    FieldRule::new("returnUrl", "Return url", &[Check::Required, Check::MaxLen(255)]),
    FieldRule::new("title", "Title", &[Check::MaxLen(255)]),
    FieldRule::new("transactionId", "Transaction ID", &[Check::Required, Check::MaxLen(40)]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnePayVariant {
    Domestic,
    International,
}

impl OnePayVariant {
    fn profile(&self) -> &'static GatewayProfile {
        match self {
            Self::Domestic => &DOMESTIC_PROFILE,
            Self::International => &INTERNATIONAL_PROFILE,
        }
    }

    fn rules(&self) -> &'static [FieldRule] {
        match self {
            Self::Domestic => DOMESTIC_RULES,
            Self::International => INTERNATIONAL_RULES,
        }
    }

    fn message(&self, code: &str, locale: Locale) -> &'static str {
        match self {
            Self::Domestic => status::domestic_message(code, locale),
            Self::International => status::international_message(code),
        }
    }
}

/// OnePay 国内卡 (ATM) 与国际卡网关
///
/// 两者签名方式相同，只是字段表、校验规则和返回码文案不同。
#[derive(Debug, Clone)]
pub struct OnePayAdapter {
    variant: OnePayVariant,
    config: GatewayConfig,
    access_code: String,
}

impl OnePayAdapter {
    pub fn domestic(config: GatewayConfig) -> Result<Self> {
        Self::new(OnePayVariant::Domestic, config)
    }

    pub fn international(config: GatewayConfig) -> Result<Self> {
        Self::new(OnePayVariant::International, config)
    }

    fn new(variant: OnePayVariant, config: GatewayConfig) -> Result<Self> {
        let name = variant.profile().name;
        let access_code = config.require_access_code(name)?.to_string();

        if config.merchant.is_empty() || config.merchant.chars().count() > 16 {
            return Err(PaymentError::Configuration(format!(
                "{name}: merchant is required and cannot exceed 16 characters"
            )));
        }
        if access_code.chars().count() > 8 {
            return Err(PaymentError::Configuration(format!(
                "{name}: access_code cannot exceed 8 characters"
            )));
        }

        Ok(Self {
            variant,
            config,
            access_code,
        })
    }

    pub fn variant(&self) -> OnePayVariant {
        self.variant
    }

    // 生成带 vpc_SecureHash 的跳转地址
    pub fn checkout_url(&self, request: &CheckoutRequest) -> Result<Url> {
        let data = with_defaults(request);
        validate(&data, self.variant.rules())?;

        let profile = self.variant.profile();
        let url = build_signed_url(
            &self.config.payment_gateway,
            profile,
            &self.config.secure_secret,
            &self.wire_params(&data),
        );

        info!(
            gateway = profile.name,
            order_id = data.order_id.as_deref().unwrap_or_default(),
            "Checkout URL built"
        );

        Ok(url)
    }

    pub fn verify(&self, query: &CallbackQuery) -> VerificationResult {
        let verdict = verifier::verify(self.variant.profile(), &self.config.secure_secret, query);
        VerificationResult::merge(self.return_fields(query), query.clone(), verdict)
    }

    fn wire_params(&self, data: &CheckoutRequest) -> ParamMap {
        param_map([
            ("AVS_City", data.billing_city.clone()),
            ("AVS_Country", data.billing_country.clone()),
            ("AVS_PostCode", data.billing_post_code.clone()),
            ("AVS_StateProv", data.billing_state_province.clone()),
            ("AVS_Street01", data.billing_street.clone()),
            ("AgainLink", data.again_link.clone()),
            ("Title", data.title.clone()),
            ("vpc_AccessCode", Some(self.access_code.clone())),
            ("vpc_Amount", data.amount.map(|amount| (amount * 100).to_string())),
            ("vpc_Command", Some(COMMAND.to_string())),
            ("vpc_Currency", data.currency.clone()),
            ("vpc_Customer_Email", data.customer_email.clone()),
            ("vpc_Customer_Id", data.customer_id.clone()),
            ("vpc_Customer_Phone", data.customer_phone.clone()),
            ("vpc_Locale", data.locale.clone()),
            ("vpc_MerchTxnRef", data.transaction_id.clone()),
            ("vpc_Merchant", Some(self.config.merchant.clone())),
            ("vpc_OrderInfo", data.order_id.clone()),
            ("vpc_ReturnURL", data.return_url.clone()),
            ("vpc_SHIP_City", data.delivery_city.clone()),
            ("vpc_SHIP_Country", data.delivery_country.clone()),
            ("vpc_SHIP_Provice", data.delivery_province.clone()),
            ("vpc_SHIP_Street01", data.delivery_address.clone()),
            ("vpc_TicketNo", data.client_ip.clone()),
            ("vpc_Version", Some(VERSION.to_string())),
        ])
    }

    fn return_fields(&self, query: &CallbackQuery) -> ReturnFields {
        let code = field(query, "vpc_TxnResponseCode").unwrap_or_default();
        let locale = Locale::from_code(query.get("vpc_Locale").map(String::as_str));

        ReturnFields {
            amount: minor_units(query.get("vpc_Amount")),
            command: field(query, "vpc_Command"),
            currency_code: field(query, "vpc_CurrencyCode"),
            gateway_transaction_no: field(query, "vpc_TransactionNo"),
            locale: field(query, "vpc_Locale"),
            merchant: field(query, "vpc_Merchant"),
            message: Some(self.variant.message(&code, locale).to_string()),
            order_id: field(query, "vpc_OrderInfo"),
            secure_hash: field(query, "vpc_SecureHash"),
            transaction_id: field(query, "vpc_MerchTxnRef"),
            version: field(query, "vpc_Version"),
            bank_code: field(query, "vpc_AdditionData"),
            card_type: field(query, "vpc_Card"),
            card_number: field(query, "vpc_CardNum"),
            authorize_id: field(query, "vpc_AuthorizeId"),
            receipt_no: field(query, "vpc_ReceiptNo"),
            response_code: Some(code).filter(|c| !c.is_empty()),
            ..Default::default()
        }
    }
}

fn with_defaults(request: &CheckoutRequest) -> CheckoutRequest {
    let mut data = request.clone();
    data.title.get_or_insert_with(|| DEFAULT_TITLE.to_string());
    data.currency.get_or_insert_with(|| CURRENCY_VND.to_string());
    data.locale.get_or_insert_with(|| LOCALE_VN.to_string());
    data
}

#[async_trait]
impl PaymentAdapter for OnePayAdapter {
    fn kind(&self) -> GatewayKind {
        match self.variant {
            OnePayVariant::Domestic => GatewayKind::OnePayDomestic,
            OnePayVariant::International => GatewayKind::OnePayInternational,
        }
    }

    async fn build_checkout_url(&self, request: &CheckoutRequest) -> Result<Url> {
        self.checkout_url(request)
    }

    async fn verify_return_url(&self, query: &CallbackQuery) -> Result<VerificationResult> {
        Ok(self.verify(query))
    }
}
