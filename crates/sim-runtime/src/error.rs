//! Runtime-level error types (spec §7), each implementing [`sim_core::SimError`].

use sim_core::{ErrorContext, ErrorSeverity, SimError};

/// Failures raised by the lockstep scheduler.
#[derive(Debug, thiserror::Error)]
pub enum TurnEngineError {
    #[error("checksum mismatch at turn {turn}: local={local:#010x} remote={remote:#010x}")]
    Desync { turn: u32, local: u32, remote: u32 },
    #[error("player {0} is not a valid slot")]
    InvalidPlayer(u8),
}

impl SimError for TurnEngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Desync { .. } => ErrorSeverity::Fatal,
            Self::InvalidPlayer(_) => ErrorSeverity::Validation,
        }
    }
}

/// Failures reading or writing a `.rep` replay file (spec §6.2).
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unrecognized replay version {0}")]
    UnknownVersion(u8),
    #[error("truncated replay file")]
    Truncated,
    #[error("malformed input batch: {0}")]
    Batch(#[from] sim_core::DecodeError),
}

impl SimError for ReplayError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn context(&self) -> Option<&ErrorContext> {
        None
    }
}
