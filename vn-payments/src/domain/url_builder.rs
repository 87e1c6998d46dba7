use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::domain::canonical::{CanonicalParams, ParamMap};
use crate::domain::profile::GatewayProfile;
use crate::utils::error::{PaymentError, Result};
use crate::utils::http_client::GatewayTransport;
use crate::utils::xml;

// 附加在 URL 末尾的签名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature<'a> {
    pub param: &'a str,
    pub value: String,
    pub hash_type: Option<(&'a str, &'a str)>,
}

// 依次追加签名字段、不签名的附加字段和签名，编码交给 url 处理
pub fn build_url(
    base: &Url,
    pairs: &CanonicalParams,
    extra: &[(String, String)],
    signature: Option<Signature<'_>>,
) -> Url {
    let mut url = base.clone();
    if pairs.is_empty() && extra.is_empty() && signature.is_none() {
        return url;
    }

    {
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs.iter() {
            query.append_pair(key, value);
        }
        for (key, value) in extra {
            query.append_pair(key, value);
        }
        if let Some(signature) = signature {
            if let Some((name, value)) = signature.hash_type {
                query.append_pair(name, value);
            }
            query.append_pair(signature.param, &signature.value);
        }
    }
    url
}

// 按网关协议签名并生成跳转地址
pub fn build_signed_url(base: &Url, profile: &GatewayProfile, secret: &str, params: &ParamMap) -> Url {
    let signed = CanonicalParams::build(params, &profile.sign_policy);
    let extra = CanonicalParams::unsigned(params, &profile.sign_policy);
    let signature = profile.sign(&signed, secret).map(|value| Signature {
        param: profile.signature_param,
        value,
        hash_type: profile.hash_type,
    });

    build_url(base, &signed, &extra, signature)
}

// 网关下单接口的返回，成功时给出跳转地址
pub trait RedirectReply: DeserializeOwned {
    fn into_redirect(self) -> Result<String>;
}

// 先向网关 POST 下单，再从 XML 响应中取跳转地址，不重试
pub async fn remote_checkout<R: RedirectReply>(
    transport: &dyn GatewayTransport,
    gateway: &str,
    endpoint: &Url,
    params: &[(String, String)],
) -> Result<Url> {
    let body = transport.post_form(endpoint, params).await?;
    let reply: R = xml::parse_reply(gateway, &body)?;
    let redirect = reply.into_redirect()?;
    debug!(gateway, redirect = %redirect, "Gateway accepted checkout");

    Url::parse(&redirect).map_err(|e| {
        PaymentError::GatewayTransport(format!("{gateway} returned an invalid checkout_url: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::canonical::{CanonicalPolicy, PrefixFilter};

    fn params(pairs: &[(&str, &str)]) -> ParamMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn appends_pairs_extra_then_signature() {
        let base = Url::parse("https://pay.example.vn/vpc.op").unwrap();
        let policy = CanonicalPolicy::sorted(PrefixFilter::Prefixes(&["vnp_"]));
        let input = params(&[("vnp_Amount", "100"), ("vnp_OrderInfo", "Thanh toan giay"), ("Title", "")]);
        let pairs = CanonicalParams::build(&input, &policy);

        let url = build_url(
            &base,
            &pairs,
            &[("Title".to_string(), "shop".to_string())],
            Some(Signature {
                param: "vnp_SecureHash",
                value: "abc".to_string(),
                hash_type: Some(("vnp_SecureHashType", "MD5")),
            }),
        );

        let keys: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
        assert_eq!(
            keys,
            vec!["vnp_Amount", "vnp_OrderInfo", "Title", "vnp_SecureHashType", "vnp_SecureHash"]
        );
        assert!(url.as_str().contains("vnp_OrderInfo=Thanh+toan+giay"));
    }

    #[test]
    fn no_signature_without_pairs() {
        let base = Url::parse("https://pay.example.vn/vpc.op").unwrap();
        let url = build_url(&base, &CanonicalParams::default(), &[], None);
        assert_eq!(url, base);
        assert!(url.query().is_none());
    }
}
