//! Wire encoding for `MatchInput`: a tag byte followed by fields in
//! declaration order, with entity-id arrays length-prefixed (spec §4.4,
//! §6.3).

use arrayvec::ArrayVec;

use super::{EntityIdList, MatchInput, QueueItemRequest};
use crate::entity::target::{BuildingType, UnitType};
use crate::entity::EntityId;
use crate::map::Cell;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("input buffer truncated mid-record")]
    Truncated,
    #[error("unknown input tag byte {0}")]
    UnknownTag(u8),
    #[error("entity id list exceeds selection limit")]
    TooManyIds,
}

impl crate::error::SimError for DecodeError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Validation
    }
}

const TAG_NONE: u8 = 0;
const TAG_MOVE_CELL: u8 = 1;
const TAG_MOVE_ENTITY: u8 = 2;
const TAG_MOVE_ATTACK_CELL: u8 = 3;
const TAG_MOVE_ATTACK_ENTITY: u8 = 4;
const TAG_MOVE_REPAIR: u8 = 5;
const TAG_MOVE_UNLOAD: u8 = 6;
const TAG_MOVE_MOLOTOV: u8 = 7;
const TAG_STOP: u8 = 8;
const TAG_DEFEND: u8 = 9;
const TAG_BUILD: u8 = 10;
const TAG_BUILD_CANCEL: u8 = 11;
const TAG_BUILDING_ENQUEUE: u8 = 12;
const TAG_BUILDING_DEQUEUE: u8 = 13;
const TAG_RALLY: u8 = 14;
const TAG_SINGLE_UNLOAD: u8 = 15;
const TAG_UNLOAD: u8 = 16;
const TAG_CAMO: u8 = 17;
const TAG_DECAMO: u8 = 18;
const TAG_PATROL: u8 = 19;

const POP_FRONT_SENTINEL: u8 = 0xFF;

/// Appends the wire encoding of `input` to `buffer`.
pub fn encode_into(buffer: &mut Vec<u8>, input: &MatchInput) {
    match input {
        MatchInput::None => buffer.push(TAG_NONE),
        MatchInput::MoveCell { shift, target_cell, entity_ids } => {
            buffer.push(TAG_MOVE_CELL);
            write_bool(buffer, *shift);
            write_cell(buffer, *target_cell);
            write_ids(buffer, entity_ids);
        }
        MatchInput::MoveEntity { shift, target_id, entity_ids } => {
            buffer.push(TAG_MOVE_ENTITY);
            write_bool(buffer, *shift);
            write_id(buffer, *target_id);
            write_ids(buffer, entity_ids);
        }
        MatchInput::MoveAttackCell { shift, target_cell, entity_ids } => {
            buffer.push(TAG_MOVE_ATTACK_CELL);
            write_bool(buffer, *shift);
            write_cell(buffer, *target_cell);
            write_ids(buffer, entity_ids);
        }
        MatchInput::MoveAttackEntity { shift, target_id, entity_ids } => {
            buffer.push(TAG_MOVE_ATTACK_ENTITY);
            write_bool(buffer, *shift);
            write_id(buffer, *target_id);
            write_ids(buffer, entity_ids);
        }
        MatchInput::MoveRepair { shift, target_id, entity_ids } => {
            buffer.push(TAG_MOVE_REPAIR);
            write_bool(buffer, *shift);
            write_id(buffer, *target_id);
            write_ids(buffer, entity_ids);
        }
        MatchInput::MoveUnload { shift, target_cell, entity_ids } => {
            buffer.push(TAG_MOVE_UNLOAD);
            write_bool(buffer, *shift);
            write_cell(buffer, *target_cell);
            write_ids(buffer, entity_ids);
        }
        MatchInput::MoveMolotov { shift, target_cell, entity_ids } => {
            buffer.push(TAG_MOVE_MOLOTOV);
            write_bool(buffer, *shift);
            write_cell(buffer, *target_cell);
            write_ids(buffer, entity_ids);
        }
        MatchInput::Stop { entity_ids } => {
            buffer.push(TAG_STOP);
            write_ids(buffer, entity_ids);
        }
        MatchInput::Defend { entity_ids } => {
            buffer.push(TAG_DEFEND);
            write_ids(buffer, entity_ids);
        }
        MatchInput::Build { shift, building_type, target_cell, entity_ids } => {
            buffer.push(TAG_BUILD);
            write_bool(buffer, *shift);
            buffer.push(building_type_tag(*building_type));
            write_cell(buffer, *target_cell);
            write_ids(buffer, entity_ids);
        }
        MatchInput::BuildCancel { building_id } => {
            buffer.push(TAG_BUILD_CANCEL);
            write_id(buffer, *building_id);
        }
        MatchInput::BuildingEnqueue { item, building_ids } => {
            buffer.push(TAG_BUILDING_ENQUEUE);
            match item {
                QueueItemRequest::Unit(unit_type) => {
                    buffer.push(0);
                    buffer.push(unit_type_tag(*unit_type));
                }
                QueueItemRequest::Upgrade(id) => {
                    buffer.push(1);
                    buffer.extend_from_slice(&id.to_le_bytes());
                }
            }
            write_ids(buffer, building_ids);
        }
        MatchInput::BuildingDequeue { building_id, index } => {
            buffer.push(TAG_BUILDING_DEQUEUE);
            write_id(buffer, *building_id);
            buffer.push(index.unwrap_or(POP_FRONT_SENTINEL));
        }
        MatchInput::Rally { rally_point, building_ids } => {
            buffer.push(TAG_RALLY);
            write_cell(buffer, *rally_point);
            write_ids(buffer, building_ids);
        }
        MatchInput::SingleUnload { entity_id } => {
            buffer.push(TAG_SINGLE_UNLOAD);
            write_id(buffer, *entity_id);
        }
        MatchInput::Unload { carrier_ids } => {
            buffer.push(TAG_UNLOAD);
            write_ids(buffer, carrier_ids);
        }
        MatchInput::Camo { unit_ids } => {
            buffer.push(TAG_CAMO);
            write_ids(buffer, unit_ids);
        }
        MatchInput::Decamo { unit_ids } => {
            buffer.push(TAG_DECAMO);
            write_ids(buffer, unit_ids);
        }
        MatchInput::Patrol { cell_a, cell_b, unit_ids } => {
            buffer.push(TAG_PATROL);
            write_cell(buffer, *cell_a);
            write_cell(buffer, *cell_b);
            write_ids(buffer, unit_ids);
        }
    }
}

/// Decodes every record in `bytes` (a full turn batch) in order.
pub fn decode_batch(bytes: &[u8]) -> Result<Vec<MatchInput>, DecodeError> {
    let mut cursor = 0usize;
    let mut inputs = Vec::new();
    while cursor < bytes.len() {
        let (input, consumed) = decode_one(&bytes[cursor..])?;
        inputs.push(input);
        cursor += consumed;
    }
    Ok(inputs)
}

fn decode_one(bytes: &[u8]) -> Result<(MatchInput, usize), DecodeError> {
    let mut reader = Reader::new(bytes);
    let tag = reader.u8()?;
    let input = match tag {
        TAG_NONE => MatchInput::None,
        TAG_MOVE_CELL => MatchInput::MoveCell {
            shift: reader.bool()?,
            target_cell: reader.cell()?,
            entity_ids: reader.ids()?,
        },
        TAG_MOVE_ENTITY => MatchInput::MoveEntity {
            shift: reader.bool()?,
            target_id: reader.id()?,
            entity_ids: reader.ids()?,
        },
        TAG_MOVE_ATTACK_CELL => MatchInput::MoveAttackCell {
            shift: reader.bool()?,
            target_cell: reader.cell()?,
            entity_ids: reader.ids()?,
        },
        TAG_MOVE_ATTACK_ENTITY => MatchInput::MoveAttackEntity {
            shift: reader.bool()?,
            target_id: reader.id()?,
            entity_ids: reader.ids()?,
        },
        TAG_MOVE_REPAIR => MatchInput::MoveRepair {
            shift: reader.bool()?,
            target_id: reader.id()?,
            entity_ids: reader.ids()?,
        },
        TAG_MOVE_UNLOAD => MatchInput::MoveUnload {
            shift: reader.bool()?,
            target_cell: reader.cell()?,
            entity_ids: reader.ids()?,
        },
        TAG_MOVE_MOLOTOV => MatchInput::MoveMolotov {
            shift: reader.bool()?,
            target_cell: reader.cell()?,
            entity_ids: reader.ids()?,
        },
        TAG_STOP => MatchInput::Stop { entity_ids: reader.ids()? },
        TAG_DEFEND => MatchInput::Defend { entity_ids: reader.ids()? },
        TAG_BUILD => MatchInput::Build {
            shift: reader.bool()?,
            building_type: reader.building_type()?,
            target_cell: reader.cell()?,
            entity_ids: reader.ids()?,
        },
        TAG_BUILD_CANCEL => MatchInput::BuildCancel { building_id: reader.id()? },
        TAG_BUILDING_ENQUEUE => {
            let discriminant = reader.u8()?;
            let item = if discriminant == 0 {
                QueueItemRequest::Unit(reader.unit_type()?)
            } else {
                QueueItemRequest::Upgrade(reader.u16()?)
            };
            MatchInput::BuildingEnqueue { item, building_ids: reader.ids()? }
        }
        TAG_BUILDING_DEQUEUE => {
            let building_id = reader.id()?;
            let raw_index = reader.u8()?;
            MatchInput::BuildingDequeue {
                building_id,
                index: (raw_index != POP_FRONT_SENTINEL).then_some(raw_index),
            }
        }
        TAG_RALLY => MatchInput::Rally {
            rally_point: reader.cell()?,
            building_ids: reader.ids()?,
        },
        TAG_SINGLE_UNLOAD => MatchInput::SingleUnload { entity_id: reader.id()? },
        TAG_UNLOAD => MatchInput::Unload { carrier_ids: reader.ids()? },
        TAG_CAMO => MatchInput::Camo { unit_ids: reader.ids()? },
        TAG_DECAMO => MatchInput::Decamo { unit_ids: reader.ids()? },
        TAG_PATROL => MatchInput::Patrol {
            cell_a: reader.cell()?,
            cell_b: reader.cell()?,
            unit_ids: reader.ids()?,
        },
        other => return Err(DecodeError::UnknownTag(other)),
    };
    Ok((input, reader.position()))
}

fn write_bool(buffer: &mut Vec<u8>, value: bool) {
    buffer.push(value as u8);
}

fn write_cell(buffer: &mut Vec<u8>, cell: Cell) {
    buffer.extend_from_slice(&cell.x.to_le_bytes());
    buffer.extend_from_slice(&cell.y.to_le_bytes());
}

fn write_id(buffer: &mut Vec<u8>, id: EntityId) {
    buffer.extend_from_slice(&id.0.to_le_bytes());
}

fn write_ids(buffer: &mut Vec<u8>, ids: &EntityIdList) {
    buffer.extend_from_slice(&(ids.len() as u16).to_le_bytes());
    for id in ids {
        write_id(buffer, *id);
    }
}

fn unit_type_tag(unit_type: UnitType) -> u8 {
    match unit_type {
        UnitType::Miner => 0,
        UnitType::Cowboy => 1,
        UnitType::Wagon => 2,
    }
}

fn unit_type_from_tag(tag: u8) -> Option<UnitType> {
    match tag {
        0 => Some(UnitType::Miner),
        1 => Some(UnitType::Cowboy),
        2 => Some(UnitType::Wagon),
        _ => None,
    }
}

fn building_type_tag(building_type: BuildingType) -> u8 {
    match building_type {
        BuildingType::House => 0,
        BuildingType::Camp => 1,
        BuildingType::Saloon => 2,
    }
}

fn building_type_from_tag(tag: u8) -> Option<BuildingType> {
    match tag {
        0 => Some(BuildingType::House),
        1 => Some(BuildingType::Camp),
        2 => Some(BuildingType::Saloon),
        _ => None,
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, cursor: 0 }
    }

    fn position(&self) -> usize {
        self.cursor
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.cursor + len > self.bytes.len() {
            return Err(DecodeError::Truncated);
        }
        let slice = &self.bytes[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn i32(&mut self) -> Result<i32, DecodeError> {
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.u8()? != 0)
    }

    fn cell(&mut self) -> Result<Cell, DecodeError> {
        let x = self.i32()?;
        let y = self.i32()?;
        Ok(Cell::new(x, y))
    }

    fn id(&mut self) -> Result<EntityId, DecodeError> {
        let raw = self.i32()? as u32;
        Ok(EntityId(raw))
    }

    fn ids(&mut self) -> Result<EntityIdList, DecodeError> {
        let count = self.u16()? as usize;
        let mut ids = ArrayVec::new();
        for _ in 0..count {
            ids.try_push(self.id()?).map_err(|_| DecodeError::TooManyIds)?;
        }
        Ok(ids)
    }

    fn unit_type(&mut self) -> Result<UnitType, DecodeError> {
        let tag = self.u8()?;
        unit_type_from_tag(tag).ok_or(DecodeError::UnknownTag(tag))
    }

    fn building_type(&mut self) -> Result<BuildingType, DecodeError> {
        let tag = self.u8()?;
        building_type_from_tag(tag).ok_or(DecodeError::UnknownTag(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(input: MatchInput) {
        let mut buffer = Vec::new();
        encode_into(&mut buffer, &input);
        let decoded = decode_batch(&buffer).unwrap();
        assert_eq!(decoded, vec![input]);
    }

    #[test]
    fn none_roundtrips() {
        roundtrip(MatchInput::None);
    }

    #[test]
    fn move_cell_roundtrips() {
        let mut ids = ArrayVec::new();
        ids.push(EntityId(7));
        ids.push(EntityId(9));
        roundtrip(MatchInput::MoveCell {
            shift: true,
            target_cell: Cell::new(3, -4),
            entity_ids: ids,
        });
    }

    #[test]
    fn building_dequeue_pop_front_roundtrips() {
        roundtrip(MatchInput::BuildingDequeue {
            building_id: EntityId(1),
            index: None,
        });
        roundtrip(MatchInput::BuildingDequeue {
            building_id: EntityId(1),
            index: Some(2),
        });
    }

    #[test]
    fn batch_decodes_multiple_records_in_order() {
        let mut buffer = Vec::new();
        encode_into(&mut buffer, &MatchInput::Stop { entity_ids: ArrayVec::new() });
        encode_into(&mut buffer, &MatchInput::Defend { entity_ids: ArrayVec::new() });
        let decoded = decode_batch(&buffer).unwrap();
        assert_eq!(decoded.len(), 2);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let bytes = [200u8];
        assert_eq!(decode_batch(&bytes), Err(DecodeError::UnknownTag(200)));
    }
}
