use serde::Serialize;
use thiserror::Error;

// 支付网关错误
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Gateway transport error: {0}")]
    GatewayTransport(String),

    #[error("Gateway business error [{code}]: {message}")]
    GatewayBusiness { code: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported gateway: {0}")]
    UnsupportedGateway(String),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),
}

impl PaymentError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn business(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GatewayBusiness {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::InvalidParameter,
            Self::GatewayTransport(_) => ErrorCode::GatewayUnavailable,
            Self::GatewayBusiness { .. } => ErrorCode::GatewayRejected,
            Self::Configuration(_) | Self::Config(_) => ErrorCode::ConfigurationError,
            Self::UnsupportedGateway(_) => ErrorCode::UnsupportedGateway,
            Self::Serialization(_) | Self::Url(_) => ErrorCode::InternalError,
        }
    }
}

// 错误码，CLI 输出时使用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidParameter,
    GatewayUnavailable,
    GatewayRejected,
    ConfigurationError,
    UnsupportedGateway,
    InternalError,
}

// 错误响应
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<&PaymentError> for ErrorResponse {
    fn from(err: &PaymentError) -> Self {
        let field = match err {
            PaymentError::Validation { field, .. } => Some(field.clone()),
            _ => None,
        };

        Self {
            code: err.code(),
            message: err.to_string(),
            field,
        }
    }
}

pub type Result<T> = std::result::Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_displays_message_only() {
        let err = PaymentError::validation("amount", "Amount is required");
        assert_eq!(err.to_string(), "Amount is required");
        assert_eq!(err.code(), ErrorCode::InvalidParameter);
    }

    #[test]
    fn error_response_carries_field() {
        let err = PaymentError::validation("clientIp", "Client ip is required");
        let response = ErrorResponse::from(&err);
        assert_eq!(response.field.as_deref(), Some("clientIp"));

        let err = PaymentError::business("02", "Merchant rejected");
        let response = ErrorResponse::from(&err);
        assert_eq!(response.code, ErrorCode::GatewayRejected);
        assert!(response.field.is_none());
        assert_eq!(response.message, "Gateway business error [02]: Merchant rejected");
    }
}
