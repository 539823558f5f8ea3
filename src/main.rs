//! tx-pipeline: contract invocation from the command line.
//!
//! Signing happens outside this tool: `prepare` prints the unsigned envelope,
//! an external signer signs it, and `submit` sends the result and waits for
//! confirmation.

use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use tx_pipeline::classify::ClassifiedError;
use tx_pipeline::config::loader::{default_config, load_config};
use tx_pipeline::ledger::{LedgerClient, LedgerRpc};
use tx_pipeline::observability::{logging, metrics};
use tx_pipeline::pipeline::{
    Amount, CallDescriptor, ContractAction, Envelope, Pipeline, ScArg, SignedTransaction,
};

#[derive(Parser)]
#[command(name = "tx-pipeline")]
#[command(about = "Simulate, prepare and submit smart-contract calls", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "TX_PIPELINE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct CallArgs {
    /// Contract address
    #[arg(long)]
    contract: String,

    /// Contract method
    #[arg(long)]
    method: String,

    /// Arguments as type:value (e.g. symbol:XLM, amount:1.5, address:G...)
    #[arg(long = "arg")]
    args: Vec<ScArg>,

    /// Source account
    #[arg(long)]
    source: String,
}

impl CallArgs {
    fn descriptor(&self) -> CallDescriptor {
        CallDescriptor::new(&self.contract, &self.method, self.args.clone())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show an account's current sequence number
    Account { address: String },
    /// Dry-run a call and print the outcome
    Simulate(CallArgs),
    /// Build the unsigned envelope for a call
    Prepare(CallArgs),
    /// Submit a signed envelope and wait for confirmation
    Submit {
        /// Signed envelope
        envelope: String,
        /// Contract method, used to word failures
        #[arg(long, default_value = "")]
        method: String,
    },
    /// Poll a transaction hash until it settles
    Status { hash: String },
    /// Check that the configured node answers
    Health,
    /// Convert between human amounts and scaled integers
    Amount {
        #[command(subcommand)]
        op: AmountOp,
    },
}

#[derive(Subcommand)]
enum AmountOp {
    /// Human amount to scaled integer
    Encode { value: String },
    /// Scaled integer to human amount
    Decode { raw: i128 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => default_config()?,
    };

    logging::init_logging(&config.observability);

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    if let Commands::Amount { op } = &cli.command {
        let output = match op {
            AmountOp::Encode { value } => {
                let amount: Amount = value.parse()?;
                json!({ "raw": amount.raw().to_string(), "human": amount.to_string() })
            }
            AmountOp::Decode { raw } => {
                let amount = Amount::from_raw(*raw);
                json!({ "raw": raw.to_string(), "human": amount.to_string() })
            }
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if let Commands::Health = cli.command {
        let client = LedgerClient::new(config.network.clone())?;
        let healthy = client.is_healthy().await;
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "rpc_url": config.network.rpc_url, "healthy": healthy }))?
        );
        if !healthy {
            std::process::exit(1);
        }
        return Ok(());
    }

    let client = LedgerClient::connect(config.network.clone()).await?;
    tracing::info!(rpc_url = %config.network.rpc_url, "Ledger client ready");

    let rpc: Arc<dyn LedgerRpc> = Arc::new(client);
    let pipeline = Pipeline::new(rpc.clone(), &config);

    let output = match cli.command {
        Commands::Account { address } => match rpc.get_account(&address).await? {
            Some(entry) => json!({ "address": entry.id, "sequence": entry.sequence.to_string() }),
            None => json!({ "address": address, "exists": false }),
        },
        Commands::Simulate(args) => match pipeline.simulate_read(&args.descriptor(), &args.source).await {
            Ok(return_value) => json!({ "outcome": "success", "return_value": return_value }),
            Err(e) => failure(&e),
        },
        Commands::Prepare(args) => match pipeline.prepare_by(&args.descriptor(), &args.source, None).await {
            Ok(prepared) => serde_json::to_value(&prepared)?,
            Err(e) => failure(&e),
        },
        Commands::Submit { envelope, method } => {
            let signed = SignedTransaction::new(Envelope::from_opaque(envelope));
            let action = ContractAction::from_method(&method);
            match pipeline.submit_and_confirm(&signed, action, None).await {
                Ok(record) => serde_json::to_value(&record)?,
                Err(e) => failure(&e),
            }
        }
        Commands::Status { hash } => serde_json::to_value(pipeline.poller().poll_hash(&hash).await)?,
        Commands::Amount { .. } | Commands::Health => return Ok(()),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn failure(e: &ClassifiedError) -> serde_json::Value {
    json!({
        "outcome": "error",
        "category": e.category,
        "message": e.message,
        "stage": e.stage,
        "cause": e.cause.to_string(),
    })
}
