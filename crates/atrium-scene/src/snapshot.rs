//! Snapshots: read-only room descriptions that drive one reconciliation pass.

use atrium_geometry::{Aabb3, Pose, RigidTransform};
use uuid::Uuid;

use crate::anchor::{Anchor, PlaneBounds};
use crate::label::AnchorLabel;
use crate::room::{Room, RoomLayout};

/// An anchor as reported by a snapshot source. The pose is optional because
/// the source may fail to resolve it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnapshotAnchor {
    pub id: Uuid,
    pub label: AnchorLabel,
    pub pose: Option<Pose>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub plane: Option<PlaneBounds>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub volume: Option<Aabb3>,
}

impl SnapshotAnchor {
    /// Turn the reported data into a live anchor, or say why it is unusable.
    pub fn resolve(&self) -> std::result::Result<Anchor, AnchorDefect> {
        let pose = self.pose.ok_or(AnchorDefect::UnresolvedPose)?;
        let anchor = Anchor {
            id: self.id,
            label: self.label,
            pose,
            plane: self.plane.clone(),
            volume: self.volume,
        };
        if !anchor.is_finite() {
            return Err(AnchorDefect::NonFinite);
        }
        if anchor.plane.as_ref().is_some_and(|p| !p.is_valid()) {
            return Err(AnchorDefect::InvalidBoundary);
        }
        Ok(anchor)
    }
}

impl From<&Anchor> for SnapshotAnchor {
    fn from(anchor: &Anchor) -> Self {
        Self {
            id: anchor.id,
            label: anchor.label,
            pose: Some(anchor.pose),
            plane: anchor.plane.clone(),
            volume: anchor.volume,
        }
    }
}

/// Why a reported anchor was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorDefect {
    UnresolvedPose,
    NonFinite,
    InvalidBoundary,
    DuplicateId,
    /// The id belongs to a live room this pass leaves untouched.
    HeldByOtherRoom,
}

impl std::fmt::Display for AnchorDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnresolvedPose => write!(f, "pose could not be resolved"),
            Self::NonFinite => write!(f, "non-finite pose or bounds"),
            Self::InvalidBoundary => write!(f, "boundary is not a simple loop"),
            Self::DuplicateId => {
                write!(f, "anchor id already reported by an earlier anchor in this snapshot")
            }
            Self::HeldByOtherRoom => write!(f, "anchor id is held by another room that is kept as is"),
        }
    }
}

/// One room of a snapshot. Rooms without a layout component are unordered
/// raw geometry and are routed through the room builder.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnapshotRoom {
    pub id: Uuid,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_local: bool,
    pub pose: Pose,
    #[cfg_attr(feature = "serde", serde(default))]
    pub layout: Option<RoomLayout>,
    pub anchors: Vec<SnapshotAnchor>,
}

impl SnapshotRoom {
    pub fn new(id: Uuid, pose: Pose, is_local: bool) -> Self {
        Self {
            id,
            is_local,
            pose,
            layout: None,
            anchors: Vec::new(),
        }
    }

    /// Describe a live room, layout included.
    pub fn from_room(room: &Room) -> Self {
        Self {
            id: room.id(),
            is_local: room.is_local(),
            pose: *room.pose(),
            layout: Some(room.layout().clone()),
            anchors: room.anchors().iter().map(SnapshotAnchor::from).collect(),
        }
    }

    pub fn anchor(&self, id: Uuid) -> Option<&SnapshotAnchor> {
        self.anchors.iter().find(|a| a.id == id)
    }
}

/// Zero or more rooms in one coordinate frame.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    pub rooms: Vec<SnapshotRoom>,
}

impl Snapshot {
    pub fn new(rooms: Vec<SnapshotRoom>) -> Self {
        Self { rooms }
    }

    pub fn from_rooms<'a>(rooms: impl IntoIterator<Item = &'a Room>) -> Self {
        Self {
            rooms: rooms.into_iter().map(SnapshotRoom::from_room).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn room(&self, id: Uuid) -> Option<&SnapshotRoom> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// First anchor with this id in any room.
    pub fn find_anchor(&self, id: Uuid) -> Option<&SnapshotAnchor> {
        self.rooms.iter().find_map(|r| r.anchor(id))
    }

    /// Move every room and anchor pose by `transform`. Boundaries and boxes
    /// are anchor-local and follow their pose. Unresolved poses stay
    /// unresolved.
    pub fn transformed(&self, transform: &RigidTransform) -> Self {
        let rooms = self
            .rooms
            .iter()
            .map(|room| SnapshotRoom {
                pose: transform.apply_pose(&room.pose),
                anchors: room
                    .anchors
                    .iter()
                    .map(|a| SnapshotAnchor {
                        pose: a.pose.map(|p| transform.apply_pose(&p)),
                        ..a.clone()
                    })
                    .collect(),
                ..room.clone()
            })
            .collect();
        Self { rooms }
    }
}
