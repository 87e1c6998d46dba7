use serde::de::DeserializeOwned;

use crate::utils::error::{PaymentError, Result};

// 解析网关返回的 XML，空响应和格式错误都视为传输错误
pub fn parse_reply<T: DeserializeOwned>(gateway: &str, body: &str) -> Result<T> {
    let body = body.trim();
    if body.is_empty() {
        return Err(PaymentError::GatewayTransport(format!(
            "No response from {gateway} server"
        )));
    }

    quick_xml::de::from_str(body).map_err(|e| {
        PaymentError::GatewayTransport(format!("Malformed response from {gateway} server: {e}"))
    })
}
