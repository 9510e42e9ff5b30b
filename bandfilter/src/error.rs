use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a filtering job. There is no partial output:
/// any of these stops the whole participant set.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed image header: {0}")]
    MalformedHeader(String),

    #[error("Truncated pixel data: expected {expected} bytes, got {actual}")]
    TruncatedPixels { expected: usize, actual: usize },

    #[error("Unknown filter '{0}'")]
    UnknownFilter(String),

    #[error("Invalid participant count: {0}")]
    InvalidWorkerCount(usize),

    #[error("Partition mismatch on rank {rank}: expected {expected} rows, got {actual}")]
    PartitionMismatch {
        rank: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Transfer desync on rank {rank} from peer {peer}: expected {expected}, got {actual}")]
    ChannelTransferDesync {
        rank: usize,
        peer: usize,
        expected: String,
        actual: String,
    },

    #[error("Rank {rank} lost its link to peer {peer}")]
    PeerDisconnected { rank: usize, peer: usize },

    #[error("Rank {rank} has no link to peer {peer}")]
    NoRoute { rank: usize, peer: usize },

    #[error("Failed to start participant {rank}: {source}")]
    Spawn {
        rank: usize,
        source: std::io::Error,
    },

    #[error("Participant {0} panicked")]
    ParticipantPanicked(usize),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Usage(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for the errors a participant sees when another one has already
    /// aborted, as opposed to the root cause.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Error::PeerDisconnected { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
