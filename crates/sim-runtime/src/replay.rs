//! The `.rep` binary replay format (spec §6.2), grounded on
//! `original_source/src/match/replay.cpp`'s `replay_init`/`replay_add_input`.
//!
//! Layout: `u8 version`, `i32 lcg_seed`, `u32 map_width`, `u32 map_height`,
//! `u8 tiles[width*height]`, `MAX_PLAYERS` fixed player records, then a
//! sequence of `(u8 player_id, u32 batch_len, u8 batch[batch_len])` records
//! until EOF. `batch_len` is written as a fixed `u32` rather than the
//! original's native `usize` so the file is portable across builds.

use std::io::{Read, Write};

use sim_core::{Map, Player, SimConfig, Tile};

use crate::error::ReplayError;

const REPLAY_VERSION: u8 = 1;

/// Everything needed to reconstruct the match's starting state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayHeader {
    pub lcg_seed: i32,
    pub map_width: u32,
    pub map_height: u32,
    pub tiles: Vec<u8>,
    pub players: [Player; SimConfig::MAX_PLAYERS],
}

impl ReplayHeader {
    /// Builds a header from a freshly generated map, before any entities
    /// have been spawned onto it.
    pub fn new(lcg_seed: i32, map: &Map, players: [Player; SimConfig::MAX_PLAYERS]) -> Self {
        Self {
            lcg_seed,
            map_width: map.width,
            map_height: map.height,
            tiles: map.tiles.iter().map(pack_tile).collect(),
            players,
        }
    }
}

fn pack_tile(tile: &Tile) -> u8 {
    (tile.elevation & 0x7F) | ((tile.has_decoration as u8) << 7)
}

fn unpack_tile(byte: u8) -> Tile {
    Tile {
        elevation: byte & 0x7F,
        has_decoration: byte & 0x80 != 0,
    }
}

/// Recovers the tile grid a header was built from, for replaying onto a
/// fresh [`Map`].
pub fn tiles_from_header(header: &ReplayHeader) -> Vec<Tile> {
    header.tiles.iter().map(|byte| unpack_tile(*byte)).collect()
}

fn write_u32(writer: &mut impl Write, value: u32) -> Result<(), ReplayError> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_i32(writer: &mut impl Write, value: i32) -> Result<(), ReplayError> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_u32(reader: &mut impl Read) -> Result<u32, ReplayError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).map_err(|_| ReplayError::Truncated)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_i32(reader: &mut impl Read) -> Result<i32, ReplayError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).map_err(|_| ReplayError::Truncated)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_u8(reader: &mut impl Read) -> Result<u8, ReplayError> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf).map_err(|_| ReplayError::Truncated)?;
    Ok(buf[0])
}

/// Appends batches to a `.rep` file as they are produced.
pub struct ReplayWriter<W: Write> {
    writer: W,
}

impl<W: Write> ReplayWriter<W> {
    pub fn new(mut writer: W, header: &ReplayHeader) -> Result<Self, ReplayError> {
        writer.write_all(&[REPLAY_VERSION])?;
        write_i32(&mut writer, header.lcg_seed)?;
        write_u32(&mut writer, header.map_width)?;
        write_u32(&mut writer, header.map_height)?;
        writer.write_all(&header.tiles)?;
        for player in &header.players {
            writer.write_all(&[player.active as u8])?;
            writer.write_all(&player.name)?;
            write_u32(&mut writer, player.team)?;
            write_i32(&mut writer, player.recolor_id)?;
        }
        Ok(Self { writer })
    }

    /// Records one player's input batch for a turn.
    pub fn append_batch(&mut self, player_id: u8, batch: &[u8]) -> Result<(), ReplayError> {
        self.writer.write_all(&[player_id])?;
        write_u32(&mut self.writer, batch.len() as u32)?;
        self.writer.write_all(batch)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ReplayError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// One recorded input batch, as read back from a `.rep` file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedBatch {
    pub player_id: u8,
    pub bytes: Vec<u8>,
}

/// Reads a `.rep` file's header, then yields batches on demand.
pub struct ReplayReader<R: Read> {
    reader: R,
}

impl<R: Read> ReplayReader<R> {
    pub fn open(mut reader: R) -> Result<(Self, ReplayHeader), ReplayError> {
        let version = read_u8(&mut reader)?;
        if version != REPLAY_VERSION {
            return Err(ReplayError::UnknownVersion(version));
        }
        let lcg_seed = read_i32(&mut reader)?;
        let map_width = read_u32(&mut reader)?;
        let map_height = read_u32(&mut reader)?;
        let area = map_width as usize * map_height as usize;
        let mut tiles = vec![0u8; area];
        reader.read_exact(&mut tiles).map_err(|_| ReplayError::Truncated)?;

        let mut players: [Player; SimConfig::MAX_PLAYERS] = core::array::from_fn(|_| Player::default());
        for player in players.iter_mut() {
            let active = read_u8(&mut reader)? != 0;
            let mut name = [0u8; 36];
            reader.read_exact(&mut name).map_err(|_| ReplayError::Truncated)?;
            let team = read_u32(&mut reader)?;
            let recolor_id = read_i32(&mut reader)?;
            *player = Player {
                active,
                name,
                team,
                recolor_id,
                ..Player::default()
            };
        }

        let header = ReplayHeader { lcg_seed, map_width, map_height, tiles, players };
        Ok((Self { reader }, header))
    }

    /// Reads the next recorded batch, or `None` at a clean EOF.
    pub fn next_batch(&mut self) -> Result<Option<RecordedBatch>, ReplayError> {
        let mut tag = [0u8; 1];
        if self.reader.read(&mut tag)? == 0 {
            return Ok(None);
        }
        let player_id = tag[0];
        let len = read_u32(&mut self.reader)? as usize;
        let mut bytes = vec![0u8; len];
        self.reader.read_exact(&mut bytes).map_err(|_| ReplayError::Truncated)?;
        Ok(Some(RecordedBatch { player_id, bytes }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::Map;
    use std::io::Cursor;

    #[test]
    fn header_and_batches_round_trip() {
        let map = Map::new(4, 3);
        let players = core::array::from_fn(|i| Player::new(&format!("p{i}"), 0, i as i32));
        let header = ReplayHeader::new(7, &map, players);

        let mut buffer = Vec::new();
        {
            let mut writer = ReplayWriter::new(&mut buffer, &header).unwrap();
            writer.append_batch(0, &[1, 2, 3]).unwrap();
            writer.append_batch(1, &[]).unwrap();
            writer.flush().unwrap();
        }

        let (mut reader, read_header) = ReplayReader::open(Cursor::new(buffer)).unwrap();
        assert_eq!(read_header.lcg_seed, 7);
        assert_eq!(read_header.map_width, 4);
        assert_eq!(read_header.map_height, 3);
        assert_eq!(read_header.players[0].team, 0);

        let first = reader.next_batch().unwrap().unwrap();
        assert_eq!(first.player_id, 0);
        assert_eq!(first.bytes, vec![1, 2, 3]);

        let second = reader.next_batch().unwrap().unwrap();
        assert_eq!(second.player_id, 1);
        assert!(second.bytes.is_empty());

        assert!(reader.next_batch().unwrap().is_none());
    }

    #[test]
    fn unknown_version_is_rejected() {
        let bytes = vec![99u8, 0, 0, 0, 0];
        let result = ReplayReader::open(Cursor::new(bytes));
        assert!(matches!(result, Err(ReplayError::UnknownVersion(99))));
    }
}
