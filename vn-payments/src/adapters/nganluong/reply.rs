use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::canonical::ParamMap;
use crate::domain::url_builder::RedirectReply;
use crate::utils::error::{PaymentError, Result};

pub const SUCCESS_CODE: &str = "00";

// SetExpressCheckout 的 <result> 响应
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutReply {
    pub error_code: String,
    pub token: String,
    pub description: String,
    pub time_limit: String,
    pub checkout_url: String,
}

impl RedirectReply for CheckoutReply {
    fn into_redirect(self) -> Result<String> {
        if self.error_code != SUCCESS_CODE {
            return Err(PaymentError::business(self.error_code, self.description));
        }
        if self.checkout_url.is_empty() {
            return Err(PaymentError::GatewayTransport(
                "NganLuong accepted the order but returned no checkout_url".to_string(),
            ));
        }

        Ok(self.checkout_url)
    }
}

/// GetTransactionDetail 的 <result> 响应
///
/// 缺失的节点按空字符串处理。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionDetail {
    pub error_code: String,
    pub token: String,
    pub description: String,
    pub transaction_status: String,
    pub receiver_email: String,
    pub order_code: String,
    pub total_amount: String,
    pub payment_method: String,
    pub bank_code: String,
    pub payment_type: String,
    pub order_description: String,
    pub tax_amount: String,
    pub discount_amount: String,
    pub fee_shipping: String,
    pub return_url: String,
    pub cancel_url: String,
    pub buyer_fullname: String,
    pub buyer_email: String,
    pub buyer_mobile: String,
    pub buyer_address: String,
    pub affiliate_code: String,
    pub transaction_id: String,
}

impl TransactionDetail {
    pub fn is_paid(&self) -> bool {
        self.error_code == SUCCESS_CODE && self.transaction_status == SUCCESS_CODE
    }

    // 按响应节点名展开，用于合并到原始回调参数
    pub fn to_params(&self) -> ParamMap {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map
                .into_iter()
                .filter_map(|(key, value)| match value {
                    Value::String(s) => Some((key, s)),
                    _ => None,
                })
                .collect(),
            _ => ParamMap::new(),
        }
    }
}
