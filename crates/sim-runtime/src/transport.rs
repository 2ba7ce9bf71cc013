//! The transport boundary the turn engine consumes (spec §6.1, §9 Open
//! Question: LAN/Steam divergence resolved into one interface and both
//! backends layer underneath it; neither backend is implemented here).

/// Events a [`Transport`] may raise when polled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkEvent {
    LobbyUpdate,
    PlayerConnected { player_id: u8 },
    PeerDisconnected { player_id: u8 },
    Chat { player_id: u8, message: String },
    MatchLoad { seed: i32, noise: Vec<u8> },
    /// One turn's input batch from `player_id`, tagged with the turn it was
    /// submitted for.
    Input { player_id: u8, turn: u32, bytes: Vec<u8> },
}

/// Non-blocking network transport consumed by [`crate::turn_engine::TurnEngine`].
///
/// `sim-runtime` never implements a concrete backend (LAN/Steam/loopback are
/// external collaborators per spec §1); it only defines the contract and, for
/// tests, a trivial in-process double (see `tests/`).
pub trait Transport {
    /// Pumps the underlying connection; non-blocking.
    fn service(&mut self);

    /// Drains one queued event, if any.
    fn poll_event(&mut self) -> Option<NetworkEvent>;

    /// Broadcasts the local peer's batch for the current turn.
    fn send_input(&mut self, turn: u32, bytes: &[u8]);

    /// Host-only: broadcasts match parameters to all peers.
    fn begin_loading_match(&mut self, seed: i32, noise: &[u8]);
}
