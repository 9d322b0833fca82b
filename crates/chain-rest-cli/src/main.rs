//! chain-rest - command line client for the chain REST gateway

mod args;

use anyhow::Context;
use chain_rest_client::{OrderContext, RestClient};
use chain_rest_types::BaseResp;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use args::{Args, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(&args);

    let client = RestClient::from_config_file(&args.config)
        .await
        .with_context(|| format!("failed to connect using {}", args.config.display()))?;

    // Ctrl-C cancels whatever call is in flight
    let cancel = client.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            cancel.cancel();
        }
    });

    let resp = match args.command {
        Command::Shake => {
            let token = client.token().await;
            info!(access_id = client.access_id(), token_len = token.len(), "Handshake ok");
            return Ok(());
        }
        Command::QueryAccount { biz_id, account } => client.query_account(&biz_id, &account).await?,
        Command::Deposit {
            biz_id,
            order_id,
            account,
            tenant_id,
            kms_key_id,
            content,
            gas,
            sync,
        } => {
            let order = OrderContext::new(biz_id, order_id, account)
                .with_tenant(tenant_id)
                .with_kms_key(kms_key_id);
            info!(order_id = %order.order_id, "Depositing");
            if sync {
                client.deposit_sync_with_transaction(&order, &content, gas).await?
            } else {
                client.deposit(&order, &content, gas).await?
            }
        }
        Command::QueryTx { biz_id, hash, wait } => {
            if wait {
                client.multiple_query_transaction(&biz_id, &hash).await?
            } else {
                client.query_transaction(&biz_id, &hash).await?
            }
        }
        Command::QueryReceipt { biz_id, hash, wait } => {
            let resp = if wait {
                client.multiple_query_receipt(&biz_id, &hash).await?
            } else {
                client.query_receipt(&biz_id, &hash).await?
            };
            if resp.is_ok() {
                let receipt = resp.receipt().context("malformed receipt")?;
                info!(result = receipt.result, gas_used = receipt.gas_used, "Receipt");
            }
            resp
        }
    };

    print_response(&resp)?;
    if !resp.success {
        anyhow::bail!("gateway answered code {}: {}", resp.code, resp.data);
    }
    Ok(())
}

fn init_tracing(args: &Args) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "chain_rest={level},chain_rest_client={level},warn",
            level = args.log_level
        )
        .into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    if args.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_response(resp: &BaseResp) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(resp)?);
    Ok(())
}
