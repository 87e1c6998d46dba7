use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::domain::canonical::ParamMap;

// 网关回调携带的查询参数
pub type CallbackQuery = ParamMap;

// 商户下单数据，字段名与 JSON 请求体一致 (camelCase)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    // 金额，单位为 VND
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub again_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    // yyyyMMddHHmmss
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_post_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_state_province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_street: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_province: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_shipping: Option<u64>,
    // 分钟
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliate_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_item: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

// 状态信息的语言
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    Vn,
    En,
}

impl Locale {
    // 网关回传的语言代码，无法识别时用越南语
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some(code) if code.eq_ignore_ascii_case("en") => Self::En,
            _ => Self::Vn,
        }
    }
}

// 从回调中整理出的统一字段
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnFields {
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "amount_number")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_transaction_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_tran_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorize_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
}

// 金额输出为 JSON 数字，整数不带小数点
fn amount_number<S: Serializer>(amount: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error> {
    let number = amount.and_then(|value| {
        if value.fract().is_zero() {
            value.to_i64().map(Number::from)
        } else {
            value.to_f64().and_then(Number::from_f64)
        }
    });

    match number {
        Some(number) => number.serialize(serializer),
        None => serializer.serialize_none(),
    }
}

// 验签结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub is_success: bool,
    pub message: Option<String>,
}

impl Verdict {
    pub const WRONG_CHECKSUM: &'static str = "Wrong checksum";

    pub fn approved(is_success: bool) -> Self {
        Self {
            is_success,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            message: Some(message.into()),
        }
    }

    pub fn wrong_checksum() -> Self {
        Self::failed(Self::WRONG_CHECKSUM)
    }
}

/// 回调验证结果。
///
/// 序列化时依次合并统一字段、原始回调参数和结论，后者覆盖前者。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub is_success: bool,
    pub message: Option<String>,
    pub fields: ReturnFields,
    pub raw: CallbackQuery,
}

impl VerificationResult {
    pub fn merge(fields: ReturnFields, raw: CallbackQuery, verdict: Verdict) -> Self {
        let message = verdict.message.or_else(|| fields.message.clone());

        Self {
            is_success: verdict.is_success,
            message,
            fields,
            raw,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut merged = match serde_json::to_value(&self.fields) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        for (key, value) in &self.raw {
            merged.insert(key.clone(), Value::String(value.clone()));
        }

        merged.insert("isSuccess".to_string(), Value::Bool(self.is_success));
        if let Some(message) = &self.message {
            merged.insert("message".to_string(), Value::String(message.clone()));
        }

        Value::Object(merged)
    }
}

impl Serialize for VerificationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
