use crate::domain::canonical::{CanonicalParams, CanonicalPolicy};
use crate::utils::crypto::DigestAlgorithm;

/// 网关签名协议的描述。
///
/// 各网关的差异只体现在这里的数据上，签名、拼接 URL 和验签共用一套实现。
#[derive(Debug, Clone, Copy)]
pub struct GatewayProfile {
    pub name: &'static str,
    // 下单时参与签名的字段
    pub sign_policy: CanonicalPolicy,
    // 回调验签时参与签名的字段
    pub verify_policy: CanonicalPolicy,
    pub algorithm: DigestAlgorithm,
    // 下单 URL 上的签名参数名
    pub signature_param: &'static str,
    // 回调中的签名参数名
    pub callback_signature_param: &'static str,
    // 签名类型标记，如 vnp_SecureHashType=MD5
    pub hash_type: Option<(&'static str, &'static str)>,
    pub response_code_param: &'static str,
    pub approved_code: &'static str,
    // 出现这些返回码时不验签，直接判定失败
    pub sentinel_codes: &'static [&'static str],
    // 网关自带的错误描述字段，非空即失败
    pub error_text_param: Option<&'static str>,
}

impl GatewayProfile {
    // 对已排好序的参数签名，没有可签字段时返回 None
    pub fn sign(&self, params: &CanonicalParams, secret: &str) -> Option<String> {
        if params.is_empty() {
            return None;
        }

        Some(self.algorithm.digest(&params.to_canonical_string(), secret))
    }

    pub fn is_sentinel(&self, code: &str) -> bool {
        self.sentinel_codes.iter().any(|sentinel| *sentinel == code)
    }
}
