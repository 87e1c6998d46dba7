use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::utils::error::{PaymentError, Result};

static EMAIL: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$").ok()
});

static URL: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Required,
    MaxLen(usize),
    OneOf(&'static [&'static str]),
    Email,
    Url,
    MaxValue(u64),
}

// 单个字段的校验规则
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub label: &'static str,
    pub checks: &'static [Check],
}

impl FieldRule {
    pub const fn new(field: &'static str, label: &'static str, checks: &'static [Check]) -> Self {
        Self {
            field,
            label,
            checks,
        }
    }

    fn check(&self, value: Option<&str>) -> Result<()> {
        let required = self.checks.contains(&Check::Required);
        let value = match value {
            Some(v) if !(required && v.is_empty()) => v,
            _ if required => return Err(self.error("is required")),
            _ => return Ok(()),
        };

        for check in self.checks {
            match *check {
                Check::Required => {}
                Check::MaxLen(max) if value.chars().count() > max => {
                    return Err(self.error(&format!("cannot exceed {max} characters")));
                }
                Check::OneOf(allowed) if !allowed.iter().any(|a| *a == value) => {
                    return Err(self.error("is not an allowed value"));
                }
                Check::Email if !matches(&EMAIL, value) => {
                    return Err(self.error("must be a valid email address"));
                }
                Check::Url if !matches(&URL, value) => {
                    return Err(self.error("must be a valid URL"));
                }
                Check::MaxValue(max) => match value.parse::<u64>() {
                    Ok(n) if n > max => return Err(self.error(&format!("cannot exceed {max}"))),
                    Ok(_) => {}
                    Err(_) => return Err(self.error("must be an integer")),
                },
                _ => {}
            }
        }

        Ok(())
    }

    fn error(&self, reason: &str) -> PaymentError {
        PaymentError::validation(self.field, format!("{} {}", self.label, reason))
    }
}

fn matches(regex: &Lazy<Option<Regex>>, value: &str) -> bool {
    regex.as_ref().is_some_and(|re| re.is_match(value))
}

// 按规则顺序校验，返回第一个错误
pub fn validate<T: Serialize>(payload: &T, rules: &[FieldRule]) -> Result<()> {
    let document = serde_json::to_value(payload)?;

    for rule in rules {
        let value = match document.get(rule.field) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        };
        rule.check(value.as_deref())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::CheckoutRequest;

    const RULES: &[FieldRule] = &[
        FieldRule::new("amount", "Amount", &[Check::Required, Check::MaxValue(9_999_999_999)]),
        FieldRule::new("clientIp", "Client ip", &[Check::Required, Check::MaxLen(15)]),
        FieldRule::new("customerEmail", "Customer email", &[Check::MaxLen(24), Check::Email]),
        FieldRule::new("locale", "Locale", &[Check::OneOf(&["vn", "en"])]),
        FieldRule::new("returnUrl", "Return url", &[Check::Required, Check::Url]),
    ];

    fn valid_request() -> CheckoutRequest {
        CheckoutRequest {
            amount: Some(20000),
            client_ip: Some("127.0.0.1".to_string()),
            return_url: Some("http://localhost:8080/payment/callback".to_string()),
            ..Default::default()
        }
    }

    fn message(request: &CheckoutRequest) -> String {
        validate(request, RULES).unwrap_err().to_string()
    }

    #[test]
    fn accepts_valid_payload() {
        assert!(validate(&valid_request(), RULES).is_ok());
    }

    #[test]
    fn first_failing_rule_wins() {
        let request = CheckoutRequest::default();
        assert_eq!(message(&request), "Amount is required");

        let request = CheckoutRequest {
            client_ip: None,
            ..valid_request()
        };
        assert_eq!(message(&request), "Client ip is required");
    }

    #[test]
    fn reports_bounds_and_formats() {
        let request = CheckoutRequest {
            amount: Some(10_000_000_000),
            ..valid_request()
        };
        assert_eq!(message(&request), "Amount cannot exceed 9999999999");

        let request = CheckoutRequest {
            client_ip: Some("1234:5678:9abc:def0".to_string()),
            ..valid_request()
        };
        assert_eq!(message(&request), "Client ip cannot exceed 15 characters");

        let request = CheckoutRequest {
            customer_email: Some(String::new()),
            ..valid_request()
        };
        assert_eq!(message(&request), "Customer email must be a valid email address");

        let request = CheckoutRequest {
            locale: Some("fr".to_string()),
            ..valid_request()
        };
        assert_eq!(message(&request), "Locale is not an allowed value");

        let request = CheckoutRequest {
            return_url: Some("localhost/callback".to_string()),
            ..valid_request()
        };
        assert_eq!(message(&request), "Return url must be a valid URL");
    }

    #[test]
    fn validation_error_names_field() {
        let err = validate(&CheckoutRequest::default(), RULES).unwrap_err();
        match err {
            PaymentError::Validation { field, .. } => assert_eq!(field, "amount"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
