use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::exit;
use std::sync::Arc;
use tracing::{error, info};

use vn_payments::config::AppConfig;
use vn_payments::infrastructure::logging::init_logging;
use vn_payments::utils::error::ErrorResponse;
use vn_payments::utils::http_client::{HttpClient, HttpClientConfig};
use vn_payments::{AdapterRegistry, CallbackQuery, CheckoutRequest, GatewayKind, PaymentError};

#[derive(Parser, Debug)]
#[command(name = "vn-payments")]
#[command(about = "越南支付网关下单与回调验签工具", long_about = None)]
struct Cli {
    /// 配置文件路径，默认读取 CONFIG_PATH 或 config/application.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 生成收银台跳转地址
    Checkout {
        /// 网关: onepay-domestic, onepay-international, vnpay, nganluong, sohapay
        #[arg(short, long)]
        gateway: GatewayKind,

        /// 下单数据 (JSON 文件，camelCase 字段)
        #[arg(short, long)]
        payload: PathBuf,
    },

    /// 验证网关回调
    Verify {
        /// 网关名称
        #[arg(short, long)]
        gateway: GatewayKind,

        /// 回调的查询串或完整回调地址
        #[arg(short, long)]
        query: String,
    },

    /// 列出已配置的网关
    Gateways,
}

/// **支付网关命令行**
///
/// ***usage：***
/// ```shell
/// cargo run -- checkout --gateway vnpay --payload order.json
/// cargo run -- verify --gateway sohapay --query 'order_code=...&secure_code=...'
/// cargo run -- gateways
/// ```
#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<PaymentError>() {
            Some(payment_error) => {
                let response = ErrorResponse::from(payment_error);
                match serde_json::to_string_pretty(&response) {
                    Ok(json) => println!("{json}"),
                    Err(_) => println!("{payment_error}"),
                }
            }
            None => eprintln!("{e:#}"),
        }
        error!("操作失败: {:#}", e);
        exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    let _guard = init_logging(&config)?;

    let transport = Arc::new(HttpClient::new(HttpClientConfig::from(&config.http))?);
    let registry = AdapterRegistry::from_config(&config.gateways, transport)?;

    match cli.command {
        Commands::Checkout { gateway, payload } => handle_checkout(&registry, gateway, &payload).await,
        Commands::Verify { gateway, query } => handle_verify(&registry, gateway, &query).await,
        Commands::Gateways => {
            for kind in registry.kinds() {
                println!("{kind}");
            }
            Ok(())
        }
    }
}

async fn handle_checkout(registry: &AdapterRegistry, gateway: GatewayKind, payload: &Path) -> Result<()> {
    let content = std::fs::read_to_string(payload)
        .with_context(|| format!("读取下单数据失败: {}", payload.display()))?;
    let request: CheckoutRequest = serde_json::from_str(&content).context("下单数据不是合法的 JSON")?;

    let url = registry.get(gateway)?.build_checkout_url(&request).await?;

    info!(gateway = %gateway, "✅ 跳转地址已生成");
    println!("{url}");
    Ok(())
}

async fn handle_verify(registry: &AdapterRegistry, gateway: GatewayKind, query: &str) -> Result<()> {
    let callback = parse_query(query).context("回调查询串格式错误")?;
    let result = registry.get(gateway)?.verify_return_url(&callback).await?;

    info!(gateway = %gateway, success = result.is_success, "回调验证完成");
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

// 接受完整地址或单独的查询串
fn parse_query(input: &str) -> Result<CallbackQuery, serde_urlencoded::de::Error> {
    let query = input.split_once('?').map_or(input, |(_, query)| query);
    serde_urlencoded::from_str(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_callback_url() {
        let query = parse_query(
            "http://localhost:8080/payment/callback?vnp_Amount=90000000&vnp_OrderInfo=Thanh+toan+giay+adidas&vnp_TxnRef=node-2018-01-15T10%3A04%3A36.540Z",
        )
        .unwrap();

        assert_eq!(query["vnp_Amount"], "90000000");
        assert_eq!(query["vnp_OrderInfo"], "Thanh toan giay adidas");
        assert_eq!(query["vnp_TxnRef"], "node-2018-01-15T10:04:36.540Z");
    }

    #[test]
    fn parses_bare_query_string() {
        let query = parse_query("error_code=00&token=43622").unwrap();
        assert_eq!(query.len(), 2);
        assert_eq!(query["token"], "43622");
    }

    #[test]
    fn cli_accepts_gateway_names() {
        let cli = Cli::try_parse_from(["vn-payments", "verify", "--gateway", "sohapay", "--query", "a=1"]).unwrap();
        match cli.command {
            Commands::Verify { gateway, .. } => assert_eq!(gateway, GatewayKind::SohaPay),
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["vn-payments", "verify", "--gateway", "paypal", "--query", "a=1"]).is_err());
    }
}
