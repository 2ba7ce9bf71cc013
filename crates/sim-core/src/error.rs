//! Common error infrastructure shared across sim-core subsystems.
//!
//! Domain-specific errors (pathfinding, input decoding, combat, …) are
//! defined alongside the code they validate, but all of them implement
//! [`SimError`] so callers can uniformly classify and log failures.

/// Severity level of an error, used for recovery and logging strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Caller-visible validation failure (stale id, insufficient gold, bad
    /// placement). Dropped silently by the simulation, surfaced as a UI
    /// status message to the issuing player only.
    Validation,
    /// Recoverable in-sim condition (path blocked, queue blocked).
    Recoverable,
    /// Unexpected state inconsistency; indicates a bug.
    Internal,
    /// Unrecoverable; simulation cannot continue (desync, replay corruption).
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Recoverable => "recoverable",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Contextual information attached to an error for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    pub tick: u32,
    pub player: Option<u8>,
    pub message: Option<&'static str>,
}

impl ErrorContext {
    pub const fn new(tick: u32) -> Self {
        Self {
            tick,
            player: None,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_player(mut self, player: u8) -> Self {
        self.player = Some(player);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// Common trait implemented by every sim-core error enum.
pub trait SimError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    fn context(&self) -> Option<&ErrorContext> {
        None
    }
}
