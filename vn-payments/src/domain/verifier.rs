use tracing::{error, warn};

use crate::domain::canonical::canonicalize;
use crate::domain::models::{CallbackQuery, Verdict};
use crate::domain::profile::GatewayProfile;
use crate::utils::crypto::signatures_match;

pub const MISSING_SECRET: &str = "Secure secret is not configured";

// 校验回调签名并给出结论，任何输入都不会返回错误
pub fn verify(profile: &GatewayProfile, secret: &str, callback: &CallbackQuery) -> Verdict {
    let mut data = callback.clone();
    let received = data.remove(profile.callback_signature_param);
    if let Some((hash_type_param, _)) = profile.hash_type {
        data.remove(hash_type_param);
    }

    // 未配置密钥时无法验签，按失败处理
    if secret.is_empty() {
        error!(gateway = profile.name, "Secure secret is empty, rejecting callback");
        return Verdict::failed(MISSING_SECRET);
    }

    let code = data
        .get(profile.response_code_param)
        .map(String::as_str)
        .unwrap_or_default();

    if profile.is_sentinel(code) {
        warn!(gateway = profile.name, code, "Callback carries no verifiable result");
        return Verdict::approved(false);
    }

    let Some(received) = received.filter(|hash| !hash.is_empty()) else {
        warn!(gateway = profile.name, "Callback has no signature");
        return Verdict::wrong_checksum();
    };

    let expected = profile
        .algorithm
        .digest(&canonicalize(&data, &profile.verify_policy), secret);

    if !signatures_match(&expected, &received) {
        warn!(gateway = profile.name, "Callback checksum mismatch");
        return Verdict::wrong_checksum();
    }

    if let Some(param) = profile.error_text_param {
        if let Some(text) = data.get(param).filter(|text| !text.is_empty()) {
            return Verdict::failed(text.clone());
        }
    }

    Verdict::approved(code == profile.approved_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::canonical::{CanonicalParams, CanonicalPolicy, PrefixFilter};
    use crate::utils::crypto::DigestAlgorithm;

    const PROFILE: GatewayProfile = GatewayProfile {
        name: "Test",
        sign_policy: CanonicalPolicy::sorted(PrefixFilter::Prefixes(&["t_"])),
        verify_policy: CanonicalPolicy::sorted(PrefixFilter::Prefixes(&["t_"])),
        algorithm: DigestAlgorithm::Md5Concat,
        signature_param: "t_Hash",
        callback_signature_param: "t_Hash",
        hash_type: Some(("t_HashType", "MD5")),
        response_code_param: "t_Code",
        approved_code: "00",
        sentinel_codes: &["7"],
        error_text_param: Some("t_Error"),
    };

    const SECRET: &str = "SECRET";

    fn signed(pairs: &[(&str, &str)]) -> CallbackQuery {
        let mut query: CallbackQuery = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let hash = PROFILE
            .sign(&CanonicalParams::build(&query, &PROFILE.verify_policy), SECRET)
            .unwrap();
        query.insert("t_HashType".to_string(), "MD5".to_string());
        query.insert("t_Hash".to_string(), hash);
        query
    }

    #[test]
    fn round_trip_uses_response_code() {
        let approved = signed(&[("t_Amount", "100"), ("t_Code", "00")]);
        assert_eq!(verify(&PROFILE, SECRET, &approved), Verdict::approved(true));

        let declined = signed(&[("t_Amount", "100"), ("t_Code", "24")]);
        assert_eq!(verify(&PROFILE, SECRET, &declined), Verdict::approved(false));
    }

    #[test]
    fn tampering_is_detected() {
        let mut query = signed(&[("t_Amount", "100"), ("t_Code", "00")]);
        query.insert("t_Amount".to_string(), "200".to_string());
        assert_eq!(verify(&PROFILE, SECRET, &query), Verdict::wrong_checksum());
    }

    #[test]
    fn unsigned_fields_do_not_matter() {
        let mut query = signed(&[("t_Amount", "100"), ("t_Code", "00")]);
        query.insert("utm_source".to_string(), "mail".to_string());
        assert!(verify(&PROFILE, SECRET, &query).is_success);
    }

    #[test]
    fn digest_case_is_ignored() {
        let mut query = signed(&[("t_Amount", "100"), ("t_Code", "00")]);
        let upper = query["t_Hash"].to_uppercase();
        query.insert("t_Hash".to_string(), upper);
        assert!(verify(&PROFILE, SECRET, &query).is_success);
    }

    #[test]
    fn missing_signature_is_a_failed_verdict() {
        let mut query = signed(&[("t_Amount", "100"), ("t_Code", "00")]);
        query.remove("t_Hash");
        assert_eq!(verify(&PROFILE, SECRET, &query), Verdict::wrong_checksum());
    }

    #[test]
    fn empty_secret_fails_closed() {
        let query = signed(&[("t_Amount", "100"), ("t_Code", "00")]);
        assert_eq!(verify(&PROFILE, "", &query), Verdict::failed(MISSING_SECRET));
    }

    #[test]
    fn sentinel_code_skips_checksum() {
        let mut query = CallbackQuery::new();
        query.insert("t_Code".to_string(), "7".to_string());
        query.insert("t_Hash".to_string(), "garbage".to_string());
        assert_eq!(verify(&PROFILE, SECRET, &query), Verdict::approved(false));
    }

    #[test]
    fn error_text_overrides_response_code() {
        let query = signed(&[("t_Code", "00"), ("t_Error", "Huy giao dich")]);
        assert_eq!(verify(&PROFILE, SECRET, &query), Verdict::failed("Huy giao dich"));
    }
}
