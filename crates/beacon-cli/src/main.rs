//! Beacon command-line client.
//!
//! # Usage
//!
//! ```bash
//! # Create a stand for 3 parties
//! beacon keygen --parties 3
//!
//! # Anonymously signal party 2
//! beacon send-signal --party 2 --retries 3
//!
//! # Party 2 scans every round published so far
//! beacon search --party 2 --from 0
//! ```

mod commands;
mod config;
mod error;

use std::{
    error::Error as _,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use beacon_core::RoundRange;
use beacon_crypto::{DEFAULT_BOUND, MAX_BOUND};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::{Backend, CommandConfig, KeygenConfig, SearchConfig, SendConfig, StandConfig},
    error::CliError,
};

/// Anonymous signal ledger client
#[derive(Parser, Debug)]
#[command(name = "beacon")]
#[command(about = "Send and discover anonymous signals on a shared encrypted ledger")]
#[command(version)]
struct Cli {
    /// Stand directory holding the ledger and the party keys
    #[arg(long, global = true, default_value = "stand")]
    stand: PathBuf,

    /// Ledger storage backend
    #[arg(long, global = true, value_enum, default_value_t = Backend::Dir)]
    backend: Backend,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Generate keys for N parties and create an empty ledger
    Keygen {
        /// Number of parties (at least 2)
        #[arg(long)]
        parties: usize,

        /// Largest signal count a party can recover
        #[arg(
            long,
            default_value_t = DEFAULT_BOUND,
            value_parser = clap::value_parser!(u64).range(1..=MAX_BOUND),
        )]
        bound: u64,
    },

    /// Publish an encrypted signal to one party
    SendSignal {
        /// Recipient party, 1-based
        #[arg(long)]
        party: usize,

        /// Extra attempts when another sender publishes the same round first
        #[arg(long, default_value_t = 0)]
        retries: u32,
    },

    /// Find the rounds in which a party was signaled
    Search {
        /// Searching party, 1-based
        #[arg(long)]
        party: usize,

        /// Round the party was last online; 0 scans from the beginning
        #[arg(long)]
        from: u64,

        /// Last round of the window; the latest round if omitted
        #[arg(long)]
        to: Option<u64>,
    },

    /// Check that every round is well-formed
    Audit,
}

impl From<Command> for CommandConfig {
    fn from(command: Command) -> Self {
        match command {
            Command::Keygen { parties, bound } => Self::Keygen(KeygenConfig { parties, bound }),
            Command::SendSignal { party, retries } => {
                Self::SendSignal(SendConfig { party, retries })
            },
            Command::Search { party, from, to } => {
                Self::Search(SearchConfig { party, range: RoundRange { from, to } })
            },
            Command::Audit => Self::Audit,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let stand = StandConfig::new(cli.stand, cli.backend);
    tracing::debug!(stand = %stand.root().display(), backend = ?stand.backend(), "starting");

    match commands::run(&stand, &cli.command.into()) {
        Ok(lines) => {
            let mut out = io::stdout().lock();
            for line in lines {
                if writeln!(out, "{line}").is_err() {
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        },
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        },
    }
}

/// Write the error and its source chain to stderr.
fn report(err: &CliError) {
    let mut out = io::stderr().lock();
    let _ = writeln!(out, "error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(out, "caused by: {cause}");
        source = cause.source();
    }
    if commands::is_conflict(err) {
        let _ = writeln!(out, "hint: another sender published that round first; retry with --retries");
    }
}
