//! Outbound packets broadcast to nearby observers.
//!
//! These are the messages of the movement synchronization protocol plus the
//! chat and unit-create messages a unit emits on its own. Field order
//! mirrors the wire layout; the byte encoding itself belongs to the
//! transport behind [`crate::resources::broadcast::PacketSink`].

use serde::Serialize;

use crate::components::unit::Guid;

/// Kind of a chat line spoken by a unit.
#[repr(u8)]
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TalkType {
    Say = 0,
    Yell = 1,
    Emote = 2,
}

/// Messages a unit broadcasts to its surroundings.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "opcode")]
pub enum ServerPacket {
    /// A direction started being held.
    MoveStartDirection { guid: Guid, direction: u8 },
    /// A direction was released; carries the authoritative position so
    /// observers can correct their extrapolation.
    MoveStopDirection {
        guid: Guid,
        direction: u8,
        x: f32,
        y: f32,
    },
    /// Periodic re-anchoring while the unit moves.
    MoveHeartbeat {
        guid: Guid,
        move_mask: u8,
        x: f32,
        y: f32,
    },
    ChatMessage {
        kind: TalkType,
        guid: Guid,
        text: String,
    },
    /// Movement part of the object-create block sent when a unit appears.
    UnitCreate {
        guid: Guid,
        x: f32,
        y: f32,
        move_mask: u8,
    },
}

impl ServerPacket {
    /// Identity of the unit the packet is about.
    pub fn guid(&self) -> Guid {
        match self {
            ServerPacket::MoveStartDirection { guid, .. }
            | ServerPacket::MoveStopDirection { guid, .. }
            | ServerPacket::MoveHeartbeat { guid, .. }
            | ServerPacket::ChatMessage { guid, .. }
            | ServerPacket::UnitCreate { guid, .. } => *guid,
        }
    }
}

/// A packet addressed to everyone near `source`.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyBroadcast {
    pub source: Guid,
    pub packet: ServerPacket,
}
