//! Orchestration for the deterministic match simulation.
//!
//! This crate wires [`sim_core::Simulation`] into a lockstep host process: a
//! [`turn_engine::TurnEngine`] that gates ticks on every peer's input, a
//! [`transport::Transport`] boundary the host's networking layer implements,
//! a `.rep` [`replay`] file format, and the ambient config/logging/error
//! plumbing a standalone binary needs. It owns no simulation rules itself.
//!
//! Modules are organized by responsibility:
//! - [`turn_engine`] hosts the lockstep scheduler
//! - [`transport`] defines the network contract consumed by the scheduler
//! - [`replay`] reads and writes `.rep` match recordings
//! - [`config`] layers host-tunable settings on top of `sim_core::SimConfig`
//! - [`error`] collects this crate's fallible operations
//! - [`logging`] installs the process-wide tracing subscriber

pub mod config;
pub mod error;
pub mod logging;
pub mod replay;
pub mod transport;
pub mod turn_engine;

pub use config::RuntimeConfig;
pub use error::{ReplayError, TurnEngineError};
pub use replay::{RecordedBatch, ReplayHeader, ReplayReader, ReplayWriter};
pub use transport::{NetworkEvent, Transport};
pub use turn_engine::TurnEngine;
