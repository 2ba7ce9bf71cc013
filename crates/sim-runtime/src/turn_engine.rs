//! The lockstep scheduler (spec §4.1): gates simulation ticks on every active
//! peer's input for the current turn, applies input-delayed batches in
//! ascending player-id order, then drives `TICKS_PER_TURN` simulation ticks.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use sim_core::{decode_batch, encode_into, MatchInput, SimConfig, Simulation};

use crate::config::RuntimeConfig;
use crate::error::TurnEngineError;
use crate::transport::{NetworkEvent, Transport};

/// Drives turn advancement for one local peer's view of the match.
///
/// Owns no simulation rules; every mutation of [`Simulation`] goes through
/// `sim.apply_input`/`sim.tick`, exactly as spec §5 requires (`TurnEngine`
/// holds the only `&mut Simulation` for the duration of an advance).
pub struct TurnEngine {
    config: RuntimeConfig,
    current_turn: u32,
    next_submission_turn: u32,
    disconnect_timer: u32,
    waiting_for_players: bool,
    active: [bool; SimConfig::MAX_PLAYERS],
    inbox: [BTreeMap<u32, Vec<MatchInput>>; SimConfig::MAX_PLAYERS],
    local_queue: Vec<MatchInput>,
}

impl TurnEngine {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            current_turn: 0,
            next_submission_turn: 0,
            disconnect_timer: 0,
            waiting_for_players: false,
            active: [true; SimConfig::MAX_PLAYERS],
            inbox: core::array::from_fn(|_| BTreeMap::new()),
            local_queue: Vec::new(),
            config,
        }
    }

    pub fn current_turn(&self) -> u32 {
        self.current_turn
    }

    /// Submits the `TURN_OFFSET` empty batches every peer owes before turn 0
    /// can run at all (spec §4.1: a turn only executes once every active
    /// player's batch for it has arrived, and nothing produces turn 0's local
    /// batch until some earlier turn has advanced). Call once after match
    /// load and before the first [`Self::try_advance`].
    pub fn prime(&mut self, transport: &mut impl Transport) {
        for _ in 0..SimConfig::TURN_OFFSET {
            self.flush_local_batch(transport);
        }
    }

    /// True once the engine has stalled past `disconnect_grace` turns waiting
    /// for a connected peer's input (spec §4.1, "waiting for players").
    pub fn is_waiting(&self) -> bool {
        self.waiting_for_players
    }

    /// Queues a local UI intent for submission at `current_turn + TURN_OFFSET`.
    pub fn queue_local_input(&mut self, input: MatchInput) {
        self.local_queue.push(input);
    }

    /// Records a decoded batch received from the transport for `player_id`'s
    /// `turn`.
    fn receive_input(&mut self, player_id: u8, turn: u32, inputs: Vec<MatchInput>) {
        if (player_id as usize) >= SimConfig::MAX_PLAYERS {
            warn!(player_id, "dropping input for out-of-range player slot");
            return;
        }
        self.inbox[player_id as usize].insert(turn, inputs);
    }

    /// Marks a player inactive and backfills its current turn slot so the
    /// lockstep is not blocked by its absence (spec §4.1 "Cancellation &
    /// timeouts").
    pub fn mark_disconnected(&mut self, player_id: u8) {
        if (player_id as usize) >= SimConfig::MAX_PLAYERS {
            return;
        }
        info!(player_id, "peer disconnected, backfilling with empty input");
        self.active[player_id as usize] = false;
        self.inbox[player_id as usize]
            .entry(self.current_turn)
            .or_insert_with(|| vec![MatchInput::None]);
    }

    fn turn_ready(&self) -> bool {
        (0..SimConfig::MAX_PLAYERS).all(|p| !self.active[p] || self.inbox[p].contains_key(&self.current_turn))
    }

    /// Drains transport events, dispatching connection/chat/load events and
    /// queueing `INPUT` events into the per-player inbox.
    pub fn pump_transport(&mut self, transport: &mut impl Transport) {
        transport.service();
        while let Some(event) = transport.poll_event() {
            match event {
                NetworkEvent::Input { player_id, turn, bytes } => match decode_batch(&bytes) {
                    Ok(inputs) => self.receive_input(player_id, turn, inputs),
                    Err(error) => warn!(player_id, %error, "dropping malformed input batch"),
                },
                NetworkEvent::PeerDisconnected { player_id } => self.mark_disconnected(player_id),
                NetworkEvent::PlayerConnected { player_id } => {
                    if (player_id as usize) < SimConfig::MAX_PLAYERS {
                        self.active[player_id as usize] = true;
                    }
                }
                NetworkEvent::Chat { .. } | NetworkEvent::LobbyUpdate | NetworkEvent::MatchLoad { .. } => {}
            }
        }
    }

    /// Attempts to advance one turn. Returns `true` if the turn executed.
    pub fn try_advance(&mut self, sim: &mut Simulation, transport: &mut impl Transport) -> bool {
        if !self.turn_ready() {
            self.disconnect_timer += 1;
            self.waiting_for_players = self.disconnect_timer > self.config.sim.disconnect_grace;
            return false;
        }

        self.disconnect_timer = 0;
        self.waiting_for_players = false;

        for player_id in 0..SimConfig::MAX_PLAYERS as u8 {
            if !self.active[player_id as usize] {
                continue;
            }
            if let Some(inputs) = self.inbox[player_id as usize].remove(&self.current_turn) {
                for input in &inputs {
                    sim.apply_input(player_id, input);
                }
            }
        }

        for _ in 0..SimConfig::TICKS_PER_TURN {
            sim.tick();
        }
        debug!(turn = self.current_turn, tick = sim.tick_counter, "turn advanced");

        self.current_turn += 1;
        self.flush_local_batch(transport);
        true
    }

    fn flush_local_batch(&mut self, transport: &mut impl Transport) {
        let batch = std::mem::take(&mut self.local_queue);
        let to_send = if batch.is_empty() { vec![MatchInput::None] } else { batch };

        let mut bytes = Vec::new();
        for input in &to_send {
            encode_into(&mut bytes, input);
        }
        transport.send_input(self.next_submission_turn, &bytes);
        self.receive_input(self.config.local_player_id, self.next_submission_turn, to_send);
        self.next_submission_turn += 1;
    }

    /// Checks a remote checksum against the local one for `turn`, per the
    /// cadence in [`RuntimeConfig::checksum_cadence`].
    pub fn verify_checksum(&self, turn: u32, local: u32, remote: u32) -> Result<(), TurnEngineError> {
        if self.config.checksum_cadence == 0 || turn % self.config.checksum_cadence != 0 {
            return Ok(());
        }
        if local != remote {
            return Err(TurnEngineError::Desync { turn, local, remote });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::NetworkEvent;

    #[derive(Default)]
    struct LoopbackTransport {
        outbox: Vec<(u32, Vec<u8>)>,
        inbox: std::collections::VecDeque<NetworkEvent>,
    }

    impl Transport for LoopbackTransport {
        fn service(&mut self) {}

        fn poll_event(&mut self) -> Option<NetworkEvent> {
            self.inbox.pop_front()
        }

        fn send_input(&mut self, turn: u32, bytes: &[u8]) {
            self.outbox.push((turn, bytes.to_vec()));
        }

        fn begin_loading_match(&mut self, _seed: i32, _noise: &[u8]) {}
    }

    fn solo_config() -> RuntimeConfig {
        RuntimeConfig::default()
    }

    #[test]
    fn single_active_player_advances_every_turn() {
        let mut engine = TurnEngine::new(solo_config());
        for player in 1..SimConfig::MAX_PLAYERS as u8 {
            engine.mark_disconnected(player);
        }
        let mut sim = Simulation::new(1, 8, 8);
        let mut transport = LoopbackTransport::default();
        engine.prime(&mut transport);

        for _ in 0..5 {
            assert!(engine.try_advance(&mut sim, &mut transport));
        }
        assert_eq!(engine.current_turn(), 5);
        assert_eq!(sim.tick_counter, 5 * SimConfig::TICKS_PER_TURN);
    }

    #[test]
    fn missing_input_stalls_until_grace_expires() {
        let mut config = solo_config();
        config.sim.disconnect_grace = 2;
        let mut engine = TurnEngine::new(config);
        engine.mark_disconnected(1);
        engine.mark_disconnected(2);
        // player 3 stays active but never submits.
        let mut sim = Simulation::new(1, 8, 8);
        let mut transport = LoopbackTransport::default();

        assert!(!engine.try_advance(&mut sim, &mut transport));
        assert!(!engine.is_waiting());
        assert!(!engine.try_advance(&mut sim, &mut transport));
        assert!(!engine.is_waiting());
        assert!(!engine.try_advance(&mut sim, &mut transport));
        assert!(engine.is_waiting());
        assert_eq!(engine.current_turn(), 0);
    }

    #[test]
    fn verify_checksum_flags_desync() {
        let engine = TurnEngine::new(solo_config());
        assert!(engine.verify_checksum(1, 42, 42).is_ok());
        assert!(engine.verify_checksum(1, 42, 43).is_err());
    }
}
