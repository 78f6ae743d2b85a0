//! UPayments CLI: read-only operator commands against the gateway.
//!
//! Configuration comes from `UPAYMENTS_*` environment variables, or from a
//! TOML file passed with `--config`. The decoded gateway response is printed
//! to stdout as pretty JSON; logs go to stderr.

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use upayments::{ClientConfig, PaymentLookup, UpaymentsClient, UpaymentsError};

mod observability;

use observability::{LogFormat, init_observability};

#[derive(Debug, Parser)]
#[command(name = "upayments", version, about = "Query UPayments payment, refund and card state")]
struct Cli {
    /// TOML configuration file (default: UPAYMENTS_* environment variables)
    #[arg(long, global = true, env = "UPAYMENTS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Look up a payment by track id, or by invoice id with --invoice
    PaymentStatus {
        /// Track id or invoice id
        id: String,
        /// Treat the id as an invoice id
        #[arg(long)]
        invoice: bool,
    },
    /// Check the refund state of an order, or of one refund with --single
    RefundStatus {
        /// Order id
        order_id: String,
        /// Check a single refund instead of the whole order
        #[arg(long)]
        single: bool,
    },
    /// List the payment buttons enabled for the merchant
    ButtonStatus,
    /// List the stored cards of a customer
    Cards {
        /// Customer unique token
        customer_token: String,
    },
}

fn load_config(path: Option<&PathBuf>) -> upayments::Result<ClientConfig> {
    match path {
        Some(path) => ClientConfig::from_file(path),
        None => ClientConfig::from_env(),
    }
}

async fn run(cli: Cli) -> upayments::Result<serde_json::Value> {
    let client = UpaymentsClient::new(load_config(cli.config.as_ref())?)?;

    let response = match cli.command {
        Command::PaymentStatus { id, invoice } => {
            let lookup = if invoice { PaymentLookup::InvoiceId } else { PaymentLookup::TrackId };
            client.get_payment_status(&id, lookup).await?
        }
        Command::RefundStatus { order_id, single } => {
            if single {
                client.check_single_refund_status(&order_id).await?
            } else {
                client.get_refund_status(&order_id).await?
            }
        }
        Command::ButtonStatus => client.check_payment_button_status().await?,
        Command::Cards { customer_token } => client.retrieve_customer_cards(&customer_token).await?,
    };

    Ok(response.into_raw())
}

/// Exit code per error class: 2 input/config, 3 gateway rejection,
/// 4 transport failure.
fn exit_code(error: &UpaymentsError) -> u8 {
    match error {
        UpaymentsError::Validation(_) | UpaymentsError::Config(_) => 2,
        UpaymentsError::Api { .. } => 3,
        UpaymentsError::Transport { .. } => 4,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_observability(LogFormat::from_env());

    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "Starting");

    match run(cli).await {
        Ok(body) => match serde_json::to_string_pretty(&body) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: failed to render response: {e}");
                ExitCode::FAILURE
            }
        },
        Err(error) => {
            tracing::error!(error = %error, status = ?error.status(), "Command failed");
            if let Some(body) = error.api_response() {
                eprintln!("{body}");
            }
            eprintln!("error: {error}");
            ExitCode::from(exit_code(&error))
        }
    }
}
