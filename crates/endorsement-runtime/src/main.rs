//! # Endorsement Runtime
//!
//! ```text
//! endorsement-runtime identity
//! endorsement-runtime endorse --outcome <file> [--proposal <file>] [--channel <id>] [--hex]
//! ```
//!
//! Without `--proposal`, the local identity signs its own proposal on
//! `--channel`. Results are printed as JSON; a withheld endorsement exits 1.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use endorsement_gate::{DecisionServiceConfig, GateConfig};
use endorsement_runtime::{
    build_plugin, endorsement_report, identity_report, load_identity, read_bytes, read_proposal,
    RuntimeConfig,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Endorsement gate runtime
#[derive(Parser, Debug)]
#[command(name = "endorsement-runtime")]
#[command(about = "Sign proposal outcomes and gate them on a decision service")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the local signing identity
    Identity,

    /// Endorse one proposal outcome
    Endorse {
        /// Encoded ProposalResponsePayload
        #[arg(long)]
        outcome: PathBuf,

        /// Encoded SignedProposal (default: self-signed by the local identity)
        #[arg(long)]
        proposal: Option<PathBuf>,

        /// Channel for the self-signed proposal
        #[arg(long, default_value = "mychannel")]
        channel: String,

        /// Input files contain hex instead of raw bytes
        #[arg(long)]
        hex: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = RuntimeConfig::from_env();

    // Logs go to stderr; stdout carries the JSON result.
    let filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let seed = std::env::var("ENDORSER_KEY_SEED").ok();
    let identity = load_identity(&config.mspid, seed.as_deref())
        .context("Failed to load signing identity")?;

    match args.command {
        Command::Identity => {
            println!("{}", identity_report(&identity)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Endorse {
            outcome,
            proposal,
            channel,
            hex,
        } => {
            let outcome = read_bytes(&outcome, hex)?;
            let proposal = match proposal {
                Some(path) => read_proposal(&path, hex)?,
                None => identity.signed_proposal(&channel, "endorsement-runtime", vec![]),
            };

            let decision = DecisionServiceConfig::from_env()?;
            let gate = GateConfig::from_env()?;
            let plugin = build_plugin(identity, &decision, gate)?;

            let result = plugin.endorse(outcome, &proposal).await;
            println!("{}", endorsement_report(&result));
            Ok(if result.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
