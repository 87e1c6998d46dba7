use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use crate::adapters::vnpay::status;
use crate::adapters::{amount, field, GatewayKind, PaymentAdapter};
use crate::config::GatewayConfig;
use crate::domain::models::{CallbackQuery, CheckoutRequest, Locale, ReturnFields, VerificationResult, Verdict};
use crate::domain::url_builder::remote_checkout;
use crate::domain::validation::{validate, Check, FieldRule};
use crate::utils::crypto::md5_hex;
use crate::utils::error::{PaymentError, Result};
use crate::utils::http_client::GatewayTransport;
use crate::utils::xml;

mod reply;

pub use reply::{CheckoutReply, TransactionDetail};

pub const VERSION: &str = "3.1";
pub const CHECKOUT_FUNCTION: &str = "SetExpressCheckout";
pub const DETAIL_FUNCTION: &str = "GetTransactionDetail";
pub const CURRENCY_VND: &str = "VND";
pub const LOCALE_VN: &str = "vi";
pub const LOCALE_EN: &str = "en";
pub const MISSING_TOKEN: &str = "Transaction token is missing";

const NAME: &str = "NganLuong";

const PAYMENT_METHODS: &[&str] = &[
    "NL",
    "VISA",
    "ATM_ONLINE",
    "ATM_OFFLINE",
    "NH_OFFLINE",
    "TTVP",
    "CREDIT_CARD_PREPAID",
    "IB_ONLINE",
];

const RULES: &[FieldRule] = &[
    FieldRule::new("amount", "Amount", &[Check::Required]),
    FieldRule::new("orderId", "Order ID", &[Check::Required, Check::MaxLen(34)]),
    FieldRule::new("paymentMethod", "Payment method", &[Check::Required, Check::OneOf(PAYMENT_METHODS)]),
    FieldRule::new("bankCode", "Bank code", &[Check::Required, Check::MaxLen(50)]),
    FieldRule::new("customerEmail", "Customer email", &[Check::Required, Check::MaxLen(255), Check::Email]),
    FieldRule::new("customerPhone", "Customer phone", &[Check::Required, Check::MaxLen(255)]),
    FieldRule::new("customerName", "Customer name", &[Check::Required, Check::MaxLen(255)]),
    FieldRule::new("returnUrl", "Return url", &[Check::Required, Check::MaxLen(255)]),
    FieldRule::new("transactionId", "Transaction ID", &[Check::Required, Check::MaxLen(40)]),
    FieldRule::new("currency", "Currency", &[Check::Required, Check::OneOf(&[CURRENCY_VND])]),
    FieldRule::new("locale", "Locale", &[Check::Required, Check::OneOf(&[LOCALE_VN, LOCALE_EN])]),
    FieldRule::new("clientIp", "Client ip", &[Check::MaxLen(16)]),
    FieldRule::new("paymentType", "Payment type", &[Check::OneOf(&["1", "2"])]),
    FieldRule::new("orderInfo", "Order info", &[Check::MaxLen(500)]),
    FieldRule::new("cancelUrl", "Cancel url", &[Check::MaxLen(255)]),
    FieldRule::new("affiliateCode", "Affiliate code", &[Check::MaxLen(255)]),
    FieldRule::new("billingStreet", "Billing street", &[Check::MaxLen(255)]),
];

/// NganLuong 网关 (API 3.1)
///
/// 下单时先向网关 POST `SetExpressCheckout` 换取收银台地址；回调只带 token，
/// 需要用 `GetTransactionDetail` 向网关查询交易结果。
#[derive(Clone)]
pub struct NganLuongAdapter {
    config: GatewayConfig,
    merchant_password: String,
    receiver_email: String,
    transport: Arc<dyn GatewayTransport>,
}

impl fmt::Debug for NganLuongAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NganLuongAdapter")
            .field("config", &self.config)
            .field("receiver_email", &self.receiver_email)
            .finish_non_exhaustive()
    }
}

impl NganLuongAdapter {
    pub fn new(config: GatewayConfig, transport: Arc<dyn GatewayTransport>) -> Result<Self> {
        let receiver_email = config.require_receiver_email(NAME)?.to_string();
        if config.merchant.is_empty() {
            return Err(PaymentError::Configuration(format!("{NAME}: merchant is required")));
        }

        Ok(Self {
            merchant_password: md5_hex(config.secure_secret.as_bytes()),
            receiver_email,
            config,
            transport,
        })
    }

    pub async fn checkout_url(&self, request: &CheckoutRequest) -> Result<Url> {
        let data = with_defaults(request);
        validate(&data, RULES)?;

        let params = self.checkout_params(&data);
        let url = remote_checkout::<CheckoutReply>(
            self.transport.as_ref(),
            NAME,
            &self.config.payment_gateway,
            &params,
        )
        .await?;

        info!(
            gateway = NAME,
            order_id = data.order_id.as_deref().unwrap_or_default(),
            "Checkout URL built"
        );

        Ok(url)
    }

    pub async fn verify(&self, query: &CallbackQuery) -> Result<VerificationResult> {
        let Some(token) = field(query, "token") else {
            warn!(gateway = NAME, "Callback has no token");
            return Ok(VerificationResult::merge(
                ReturnFields::default(),
                query.clone(),
                Verdict::failed(MISSING_TOKEN),
            ));
        };

        let detail = self.transaction_detail(&token).await?;

        let verdict = if detail.error_code == reply::SUCCESS_CODE {
            Verdict::approved(detail.is_paid())
        } else {
            warn!(gateway = NAME, code = %detail.error_code, "Transaction lookup rejected");
            let message = if detail.description.is_empty() {
                status::message(&detail.error_code, Locale::Vn).to_string()
            } else {
                detail.description.clone()
            };
            Verdict::failed(message)
        };

        let mut raw = query.clone();
        raw.extend(detail.to_params());

        Ok(VerificationResult::merge(self.return_fields(&detail), raw, verdict))
    }

    // GetTransactionDetail 查询，网络错误直接返回
    async fn transaction_detail(&self, token: &str) -> Result<TransactionDetail> {
        let params = pairs([
            ("merchant_id", Some(self.config.merchant.clone())),
            ("merchant_password", Some(self.merchant_password.clone())),
            ("version", Some(VERSION.to_string())),
            ("function", Some(DETAIL_FUNCTION.to_string())),
            ("token", Some(token.to_string())),
        ]);

        let body = self
            .transport
            .post_form(&self.config.payment_gateway, &params)
            .await?;

        xml::parse_reply(NAME, &body)
    }

    // 字段顺序与网关文档一致
    fn checkout_params(&self, data: &CheckoutRequest) -> Vec<(String, String)> {
        pairs([
            ("merchant_id", Some(self.config.merchant.clone())),
            ("merchant_password", Some(self.merchant_password.clone())),
            ("version", Some(VERSION.to_string())),
            ("function", Some(CHECKOUT_FUNCTION.to_string())),
            ("receiver_email", Some(self.receiver_email.clone())),
            ("order_code", data.order_id.clone()),
            ("total_amount", data.amount.map(|v| v.to_string())),
            ("payment_method", data.payment_method.clone()),
            ("bank_code", data.bank_code.clone()),
            ("payment_type", data.payment_type.clone()),
            ("order_description", data.order_info.clone()),
            ("tax_amount", data.tax_amount.map(|v| v.to_string())),
            ("discount_amount", data.discount_amount.map(|v| v.to_string())),
            ("fee_shipping", data.fee_shipping.map(|v| v.to_string())),
            ("return_url", data.return_url.clone()),
            ("cancel_url", data.cancel_url.clone()),
            ("time_limit", data.time_limit.map(|v| v.to_string())),
            ("buyer_fullname", data.customer_name.clone()),
            ("buyer_email", data.customer_email.clone()),
            ("buyer_mobile", data.customer_phone.clone()),
            ("buyer_address", data.billing_street.clone()),
            ("cur_code", data.currency.as_deref().map(str::to_lowercase)),
            ("lang_code", data.locale.clone()),
            ("affiliate_code", data.affiliate_code.clone()),
            ("total_item", data.total_item.map(|v| v.to_string())),
        ])
    }

    fn return_fields(&self, detail: &TransactionDetail) -> ReturnFields {
        let text = |value: &str| Some(value.to_string()).filter(|v| !v.is_empty());

        ReturnFields {
            merchant: text(&self.config.merchant),
            transaction_id: text(&detail.order_code),
            amount: amount(Some(&detail.total_amount)),
            order_info: text(&detail.order_description),
            response_code: text(&detail.transaction_status),
            bank_code: text(&detail.bank_code),
            gateway_transaction_no: text(&detail.transaction_id),
            message: Some(status::message(&detail.transaction_status, Locale::Vn).to_string()),
            customer_email: text(&detail.buyer_email),
            customer_phone: text(&detail.buyer_mobile),
            customer_name: text(&detail.buyer_fullname),
            ..Default::default()
        }
    }
}

// 有序表单参数，空值不发送
fn pairs<I>(entries: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (&'static str, Option<String>)>,
{
    entries
        .into_iter()
        .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key.to_string(), v)))
        .collect()
}

fn with_defaults(request: &CheckoutRequest) -> CheckoutRequest {
    let mut data = request.clone();
    data.currency.get_or_insert_with(|| CURRENCY_VND.to_string());
    data.locale.get_or_insert_with(|| LOCALE_VN.to_string());
    data
}

#[async_trait]
impl PaymentAdapter for NganLuongAdapter {
    fn kind(&self) -> GatewayKind {
        GatewayKind::NganLuong
    }

    async fn build_checkout_url(&self, request: &CheckoutRequest) -> Result<Url> {
        self.checkout_url(request).await
    }

    async fn verify_return_url(&self, query: &CallbackQuery) -> Result<VerificationResult> {
        self.verify(query).await
    }
}
