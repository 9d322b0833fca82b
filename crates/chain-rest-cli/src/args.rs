//! Command line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug, Clone)]
#[command(name = "chain-rest")]
#[command(about = "Call the chain REST gateway from the command line")]
pub struct Args {
    /// Path to the JSON client config (RestUrl, AccessId, AccessSecret, ...)
    #[arg(long, env = "CHAIN_REST_CONFIG", default_value = "rest-client.json")]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Shake hands and print the session token length
    Shake,

    /// Look up an account
    QueryAccount {
        #[arg(long)]
        biz_id: String,
        #[arg(long)]
        account: String,
    },

    /// Store content on chain
    Deposit {
        #[arg(long)]
        biz_id: String,
        /// Defaults to a random UUID
        #[arg(long, default_value_t = Uuid::new_v4().to_string())]
        order_id: String,
        #[arg(long)]
        account: String,
        #[arg(long, default_value = "")]
        tenant_id: String,
        #[arg(long)]
        kms_key_id: String,
        #[arg(long)]
        content: String,
        /// Gas limit, 0 for unlimited
        #[arg(long, default_value = "0")]
        gas: i64,
        /// Wait for the transaction to be queryable
        #[arg(long)]
        sync: bool,
    },

    /// Query a transaction by hash
    QueryTx {
        #[arg(long)]
        biz_id: String,
        #[arg(long)]
        hash: String,
        /// Poll while the transaction is pending
        #[arg(long)]
        wait: bool,
    },

    /// Query a transaction receipt by hash
    QueryReceipt {
        #[arg(long)]
        biz_id: String,
        #[arg(long)]
        hash: String,
        /// Poll while the receipt is pending
        #[arg(long)]
        wait: bool,
    },
}
