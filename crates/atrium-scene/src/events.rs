//! Lifecycle events emitted by reconciliation passes.
//!
//! Within one pass the order is fixed: every room update (each preceded by
//! that room's anchor events), then every room removal, then every room
//! creation.

use uuid::Uuid;

use crate::anchor::Anchor;
use crate::room::Room;

/// A change to the live graph.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum SceneEvent {
    /// A room entered the graph
    RoomCreated { room: Room },

    /// A room's anchors, layout or pose changed
    RoomUpdated { room: Room },

    /// A room left the graph, taking its anchors with it
    RoomRemoved { room: Room },

    AnchorCreated { room: Uuid, anchor: Anchor },

    AnchorUpdated { room: Uuid, anchor: Anchor },

    AnchorRemoved { room: Uuid, anchor: Anchor },
}

/// Coarse event category, for counting and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneEventKind {
    RoomCreated,
    RoomUpdated,
    RoomRemoved,
    AnchorCreated,
    AnchorUpdated,
    AnchorRemoved,
}

impl SceneEvent {
    /// Id of the room the event concerns.
    pub fn room_id(&self) -> Uuid {
        match self {
            SceneEvent::RoomCreated { room }
            | SceneEvent::RoomUpdated { room }
            | SceneEvent::RoomRemoved { room } => room.id(),
            SceneEvent::AnchorCreated { room, .. }
            | SceneEvent::AnchorUpdated { room, .. }
            | SceneEvent::AnchorRemoved { room, .. } => *room,
        }
    }

    pub fn anchor(&self) -> Option<&Anchor> {
        match self {
            SceneEvent::AnchorCreated { anchor, .. }
            | SceneEvent::AnchorUpdated { anchor, .. }
            | SceneEvent::AnchorRemoved { anchor, .. } => Some(anchor),
            _ => None,
        }
    }

    pub fn kind(&self) -> SceneEventKind {
        match self {
            SceneEvent::RoomCreated { .. } => SceneEventKind::RoomCreated,
            SceneEvent::RoomUpdated { .. } => SceneEventKind::RoomUpdated,
            SceneEvent::RoomRemoved { .. } => SceneEventKind::RoomRemoved,
            SceneEvent::AnchorCreated { .. } => SceneEventKind::AnchorCreated,
            SceneEvent::AnchorUpdated { .. } => SceneEventKind::AnchorUpdated,
            SceneEvent::AnchorRemoved { .. } => SceneEventKind::AnchorRemoved,
        }
    }
}

impl std::fmt::Display for SceneEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneEvent::RoomCreated { room } => {
                write!(f, "room created {} ({} anchors)", room.id(), room.anchors().len())
            }
            SceneEvent::RoomUpdated { room } => {
                write!(f, "room updated {} ({} anchors)", room.id(), room.anchors().len())
            }
            SceneEvent::RoomRemoved { room } => write!(f, "room removed {}", room.id()),
            SceneEvent::AnchorCreated { room, anchor } => {
                write!(f, "  anchor created {} {} in {room}", anchor.id, anchor.label)
            }
            SceneEvent::AnchorUpdated { room, anchor } => {
                write!(f, "  anchor updated {} {} in {room}", anchor.id, anchor.label)
            }
            SceneEvent::AnchorRemoved { room, anchor } => {
                write!(f, "  anchor removed {} {} in {room}", anchor.id, anchor.label)
            }
        }
    }
}
