use std::num::ParseIntError;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const FIELD_SEPARATOR: char = ';';

/// One tip read from the trigger file: `<sender>;<amount>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipEvent {
    /// Field 0. Carried for logging only.
    pub sender: String,
    pub amount: i32,
}

/// Why a trigger-file write was dropped.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("failed to read trigger file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("trigger payload {payload:?} has no amount field")]
    MissingAmount { payload: String },
    #[error("invalid tip amount {raw:?}: {source}")]
    InvalidAmount {
        raw: String,
        #[source]
        source: ParseIntError,
    },
}

/// Parses trigger-file contents. Field 1 (whitespace trimmed) is the amount;
/// any fields after it are ignored.
pub fn parse_payload(payload: &str) -> Result<TipEvent, TriggerError> {
    let mut fields = payload.split(FIELD_SEPARATOR);
    let sender = fields.next().unwrap_or_default();
    let raw = fields.next().ok_or_else(|| TriggerError::MissingAmount {
        payload: payload.to_string(),
    })?;

    let raw = raw.trim();
    let amount = raw.parse::<i32>().map_err(|source| TriggerError::InvalidAmount {
        raw: raw.to_string(),
        source,
    })?;

    Ok(TipEvent {
        sender: sender.trim().to_string(),
        amount,
    })
}

/// Reads the whole trigger file at `path` and parses it.
pub fn read_tip(path: &Path) -> Result<TipEvent, TriggerError> {
    let payload = std::fs::read_to_string(path).map_err(|source| TriggerError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_payload(&payload)
}
