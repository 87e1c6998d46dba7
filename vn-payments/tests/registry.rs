use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use vn_payments::config::AppConfig;
use vn_payments::utils::error::{ErrorCode, ErrorResponse};
use vn_payments::utils::http_client::{HttpClient, HttpClientConfig};
use vn_payments::{AdapterRegistry, CheckoutRequest, GatewayKind, PaymentError};

fn transport() -> Arc<HttpClient> {
    Arc::new(HttpClient::new(HttpClientConfig::default()).unwrap())
}

#[test]
fn bundled_config_registers_every_gateway() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/application.toml");
    let config = AppConfig::load_from(&path).unwrap();

    let registry = AdapterRegistry::from_config(&config.gateways, transport()).unwrap();

    assert_eq!(
        registry.kinds(),
        vec![
            GatewayKind::NganLuong,
            GatewayKind::OnePayDomestic,
            GatewayKind::OnePayInternational,
            GatewayKind::SohaPay,
            GatewayKind::VnPay,
        ]
    );
    for kind in registry.kinds() {
        assert_eq!(registry.get(kind).unwrap().kind(), kind);
    }
}

#[test]
fn partial_config_only_exposes_configured_gateways() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[gateways.sohapay]
payment_gateway = "https://sohapay.vn/payment.php"
merchant_code = "test"
secure_secret = "1234567890"
"#
    )
    .unwrap();

    let config = AppConfig::load_from(file.path()).unwrap();
    let registry = AdapterRegistry::from_config(&config.gateways, transport()).unwrap();

    assert_eq!(registry.kinds(), vec![GatewayKind::SohaPay]);
    let err = registry.get(GatewayKind::from_str("vnpay").unwrap()).err().unwrap();
    assert!(matches!(err, PaymentError::UnsupportedGateway(ref name) if name == "vnpay"));
    assert_eq!(ErrorResponse::from(&err).code, ErrorCode::UnsupportedGateway);
}

#[test]
fn missing_gateway_identifier_fails_at_startup() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[gateways.nganluong]
payment_gateway = "https://sandbox.nganluong.vn:8088/nl30/checkout.api.nganluong.post.php"
merchant = "45571"
secure_secret = "c57700e78cb0df1766279d91e3233c79"
"#
    )
    .unwrap();

    let config = AppConfig::load_from(file.path()).unwrap();
    let err = AdapterRegistry::from_config(&config.gateways, transport()).err().unwrap();

    assert_eq!(
        err.to_string(),
        "Configuration error: NganLuong: receiver_email is required"
    );
}

#[test]
fn invalid_gateway_url_is_rejected() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[gateways.vnpay]
payment_gateway = "not a url"
merchant = "COCOSIN"
secure_secret = "RAOEXHYVSDDIIENYWSLDIIZTANXUXZFJ"
"#
    )
    .unwrap();

    assert!(AppConfig::load_from(file.path()).is_err());
}

#[tokio::test]
async fn validation_error_names_the_field() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/application.toml");
    let config = AppConfig::load_from(&path).unwrap();
    let registry = AdapterRegistry::from_config(&config.gateways, transport()).unwrap();

    let err = registry
        .get(GatewayKind::OnePayDomestic)
        .unwrap()
        .build_checkout_url(&CheckoutRequest::default())
        .await
        .unwrap_err();

    let response = ErrorResponse::from(&err);
    assert_eq!(response.code, ErrorCode::InvalidParameter);
    assert_eq!(response.message, "Amount is required");
    assert_eq!(response.field.as_deref(), Some("amount"));
}

#[test]
fn missing_config_file_uses_sandbox_gateways() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::load_from(&dir.path().join("application.toml")).unwrap();

    let registry = AdapterRegistry::from_config(&config.gateways, transport()).unwrap();

    assert_eq!(registry.kinds().len(), 5);
}
