use std::time::Duration;

use thiserror::Error;

use crate::models::{canvas::CanvasError, range::RowRange, rank::Rank};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("expected a {expected} message, got {found}")]
    UnexpectedMessage {
        expected: &'static str,
        found: String,
    },

    #[error("{peer} is not reachable from {from}")]
    UnreachablePeer { from: Rank, peer: Rank },

    #[error("{peer} disconnected")]
    Disconnected { peer: Rank },

    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    #[error("{rank} joined twice")]
    DuplicateRank { rank: Rank },

    #[error("{rank} is outside of a world of {world_size} participants")]
    RankOutOfRange { rank: Rank, world_size: u32 },

    #[error("{rank} expects {found} participants, this world has {expected}")]
    WorldSizeMismatch { rank: Rank, expected: u32, found: u32 },

    #[error("{from} sent rows {found} on behalf of {claimed}, expected rows {expected}")]
    UnexpectedBlock {
        from: Rank,
        claimed: Rank,
        expected: RowRange,
        found: RowRange,
    },

    #[error("block rejected: {0}")]
    InvalidBlock(#[from] CanvasError),
}

impl TransportError {
    /// Folds a closed or reset connection to `peer` into `Disconnected`.
    pub fn from_peer(self, peer: Rank) -> Self {
        match self {
            TransportError::Io(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::UnexpectedEof
                        | std::io::ErrorKind::ConnectionReset
                        | std::io::ErrorKind::ConnectionAborted
                        | std::io::ErrorKind::BrokenPipe
                ) =>
            {
                TransportError::Disconnected { peer }
            }
            other => other,
        }
    }
}
