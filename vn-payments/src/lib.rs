pub mod adapters;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod utils;

// 重新导出关键组件，便于外部调用
pub use adapters::{AdapterRegistry, GatewayKind, PaymentAdapter};
pub use domain::models::{CallbackQuery, CheckoutRequest, VerificationResult};
pub use utils::error::{PaymentError, Result};
