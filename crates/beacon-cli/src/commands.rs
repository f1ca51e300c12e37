//! Command handlers.
//!
//! Each handler returns the lines to show the user; `main` writes them.
//! Handlers are generic over the ledger backend and dispatched once from
//! [`run`].

use beacon_core::{
    Error, SearchReport, SearchSession, audit, initialize_ledger, keygen, open_ledger, send_signal,
};
use beacon_crypto::{DdhRecipientKey, DdhScheme};
use beacon_ledger::{DirLedger, LedgerStore, RedbLedger};

use crate::{
    config::{Backend, CommandConfig, KeygenConfig, SearchConfig, SendConfig, StandConfig},
    error::CliError,
};

/// Execute `command` against the stand.
pub fn run(stand: &StandConfig, command: &CommandConfig) -> Result<Vec<String>, CliError> {
    match stand.backend() {
        Backend::Dir => execute::<DirLedger<DdhScheme>>(stand, command),
        Backend::Redb => execute::<RedbLedger<DdhScheme>>(stand, command),
    }
}

fn execute<L: LedgerStore<DdhScheme>>(
    stand: &StandConfig,
    command: &CommandConfig,
) -> Result<Vec<String>, CliError> {
    match command {
        CommandConfig::Keygen(config) => run_keygen::<L>(stand, config),
        CommandConfig::SendSignal(config) => run_send::<L>(stand, config),
        CommandConfig::Search(config) => run_search::<L>(stand, config),
        CommandConfig::Audit => run_audit::<L>(stand),
    }
}

/// Generate keys, create the empty ledger, then publish the keys.
///
/// Keys are staged beside the key directory and renamed into place only
/// after the ledger exists. A failed keygen leaves neither a partial key set
/// nor staged files behind.
fn run_keygen<L: LedgerStore<DdhScheme>>(
    stand: &StandConfig,
    config: &KeygenConfig,
) -> Result<Vec<String>, CliError> {
    let scheme = DdhScheme::with_bound(config.bound);
    let material = keygen(&scheme, config.parties)?;

    let staged = stand.key_store().stage_all(&material.keys).map_err(CliError::SaveKeys)?;
    initialize_ledger::<DdhScheme, L>(&stand.ledger_path(), &material.mpk)?;
    let paths = staged.commit().map_err(CliError::SaveKeys)?;

    tracing::info!(
        parties = config.parties,
        keys = %stand.key_store().dir().display(),
        "stand initialized"
    );

    let mut lines: Vec<String> =
        paths.iter().map(|path| format!("Saved key {}", path.display())).collect();
    lines.push("Keygen completed!".to_string());
    Ok(lines)
}

fn run_send<L: LedgerStore<DdhScheme>>(
    stand: &StandConfig,
    config: &SendConfig,
) -> Result<Vec<String>, CliError> {
    let scheme = DdhScheme::new();
    let ledger = open_ledger::<DdhScheme, L>(&stand.ledger_path())?;

    let mut attempt = 0;
    let receipt = loop {
        match send_signal(&scheme, &ledger, config.party) {
            Ok(receipt) => break receipt,
            Err(e) if e.is_conflict() && attempt < config.retries => {
                attempt += 1;
                tracing::warn!(attempt, error = %e, "lost append race, retrying");
            },
            Err(e) => return Err(e.into()),
        }
    };

    Ok(vec![format!(
        "You successfully sent encrypted signal to party {} in round {}!",
        config.party, receipt.round
    )])
}

fn run_search<L: LedgerStore<DdhScheme>>(
    stand: &StandConfig,
    config: &SearchConfig,
) -> Result<Vec<String>, CliError> {
    let key: DdhRecipientKey = stand
        .key_store()
        .load(config.party)
        .map_err(|source| CliError::LoadKey { party: config.party, source })?;
    let ledger = open_ledger::<DdhScheme, L>(&stand.ledger_path())?;

    let mut session = SearchSession::new(DdhScheme::new(), ledger, key)?;
    let report = session.run(config.range)?;

    Ok(render_search(&report))
}

fn render_search(report: &SearchReport) -> Vec<String> {
    if report.is_empty() {
        return vec![format!(
            "Party received no signal within rounds [{};{}]",
            report.from, report.to
        )];
    }

    let mut lines = vec!["Party received signal(s)!".to_string()];
    for (i, event) in report.events.iter().enumerate() {
        lines.push(format!("Received signal at round {}!", event.round));
        if i + 1 < report.events.len() {
            lines.push("More signals available!".to_string());
        }
    }
    lines.push("No more signals available".to_string());
    lines.push(format!(
        "{} signal(s) in rounds [{};{}] using {} decryption(s)",
        report.events.len(),
        report.from,
        report.to,
        report.decryptions
    ));
    lines
}

fn run_audit<L: LedgerStore<DdhScheme>>(stand: &StandConfig) -> Result<Vec<String>, CliError> {
    let ledger = open_ledger::<DdhScheme, L>(&stand.ledger_path())?;
    let report = audit(&DdhScheme::new(), &ledger)?;

    Ok(vec![format!(
        "Ledger holds {} round(s) for {} parties; every round is well-formed",
        report.rounds, report.parties
    )])
}

/// Whether the failure is a lost append race (exit hint for scripts).
pub fn is_conflict(err: &CliError) -> bool {
    matches!(err, CliError::Core(e) if Error::is_conflict(e))
}
