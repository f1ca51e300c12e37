//! Parameter validation shared by the operations.

use crate::ConfigError;

/// Smallest recipient set key generation accepts.
pub const MIN_PARTIES: usize = 2;

/// Map a 1-based party number to a zero-based recipient index.
///
/// # Errors
///
/// - `RecipientOutOfRange`: `party` not in `[1, parties]`
pub fn recipient_index(party: usize, parties: usize) -> Result<usize, ConfigError> {
    if party == 0 || party > parties {
        return Err(ConfigError::RecipientOutOfRange { got: party, parties });
    }
    Ok(party - 1)
}

/// Inclusive round range for a search.
///
/// `to == None` means the latest round at the time the search starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundRange {
    /// Round at which the party was last online (0 for the beginning)
    pub from: u64,
    /// Upper bound, or `None` for the latest round
    pub to: Option<u64>,
}

impl RoundRange {
    /// Range from `from` to the latest round.
    pub fn since(from: u64) -> Self {
        Self { from, to: None }
    }

    /// Range `[from, to]`.
    pub fn between(from: u64, to: u64) -> Self {
        Self { from, to: Some(to) }
    }
}
