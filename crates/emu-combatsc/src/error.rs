//! Error types for the board's outer edges.
//!
//! Register handlers never fail; errors only come from loading ROMs,
//! decoding save states and applying DIP switch settings.

use std::path::PathBuf;

use thiserror::Error;

use crate::romset::RomReport;

/// ROM set loading failure.
#[derive(Debug, Error)]
pub enum RomError {
    #[error("unknown ROM set '{0}'")]
    UnknownSet(String),

    #[error("cannot read ROM directory {}: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ROM set '{set}' failed verification ({} issue(s))", .report.issues.len())]
    Verification { set: &'static str, report: RomReport },
}

/// Save state decoding failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("not a Combat School snapshot (bad magic)")]
    BadMagic,

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u8),

    #[error("snapshot truncated: needed {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("snapshot was taken on a different board type")]
    BoardMismatch,

    #[error("snapshot field {0} holds an invalid value")]
    InvalidField(&'static str),
}

/// DIP switch lookup failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DipError {
    #[error("no DIP switch named '{0}'")]
    UnknownSwitch(String),

    #[error("DIP switch '{switch}' has no setting '{setting}'")]
    UnknownSetting { switch: String, setting: String },
}

/// Any failure while building or restoring a board.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Rom(#[from] RomError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Dip(#[from] DipError),
}
