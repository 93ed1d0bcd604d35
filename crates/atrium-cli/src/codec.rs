//! JSON snapshot documents.
//!
//! A document carries the frame it was written in. Left-handed documents
//! (Y up, Z flipped) are mirrored across the XY plane on the way in and out,
//! so the scene graph only ever sees right-handed coordinates.

use std::str::FromStr;

use atrium_scene::geometry::Pose;
use atrium_scene::{AnchorLabel, Room, SceneNode, Snapshot, SnapshotAnchor, SnapshotRoom};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Handedness of a document's coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoordinateSystem {
    #[default]
    RightHandedYUp,
    LeftHandedYUp,
}

impl FromStr for CoordinateSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "right-handed-y-up" | "right" => Ok(Self::RightHandedYUp),
            "left-handed-y-up" | "left" => Ok(Self::LeftHandedYUp),
            other => Err(Error::InvalidInput(format!("unknown coordinate system: {other}"))),
        }
    }
}

/// On-disk snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(default)]
    pub coordinate_system: CoordinateSystem,
    pub rooms: Vec<SnapshotRoom>,
}

/// On-disk authored scene tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub coordinate_system: CoordinateSystem,
    pub root: SceneNode,
}

/// Parse a snapshot document into right-handed coordinates.
pub fn deserialize(text: &str) -> Result<Snapshot> {
    let document: SnapshotDocument = serde_json::from_str(text)?;
    let mut snapshot = Snapshot::new(document.rooms);
    if document.coordinate_system == CoordinateSystem::LeftHandedYUp {
        mirror_snapshot(&mut snapshot);
    }
    Ok(snapshot)
}

/// Write rooms as a snapshot document. Global mesh anchors are dropped
/// unless `include_mesh` is set.
pub fn serialize(
    rooms: &[Room],
    coordinate_system: CoordinateSystem,
    include_mesh: bool,
) -> Result<String> {
    let mut snapshot = Snapshot::from_rooms(rooms);
    if !include_mesh {
        for room in &mut snapshot.rooms {
            room.anchors
                .retain(|a| !a.label.intersects(AnchorLabel::GLOBAL_MESH));
        }
    }
    write_snapshot(snapshot, coordinate_system)
}

/// Write an already assembled snapshot.
pub fn write_snapshot(mut snapshot: Snapshot, coordinate_system: CoordinateSystem) -> Result<String> {
    if coordinate_system == CoordinateSystem::LeftHandedYUp {
        mirror_snapshot(&mut snapshot);
    }
    let document = SnapshotDocument {
        coordinate_system,
        rooms: snapshot.rooms,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parse an authored scene document into a right-handed tree.
pub fn deserialize_scene(text: &str) -> Result<SceneNode> {
    let document: SceneDocument = serde_json::from_str(text)?;
    let mut root = document.root;
    if document.coordinate_system == CoordinateSystem::LeftHandedYUp {
        let mut stack = vec![&mut root];
        while let Some(node) = stack.pop() {
            node.local = mirror_pose(&node.local);
            stack.extend(node.children.iter_mut());
        }
    }
    Ok(root)
}

fn mirror_snapshot(snapshot: &mut Snapshot) {
    for room in &mut snapshot.rooms {
        room.pose = mirror_pose(&room.pose);
        for anchor in &mut room.anchors {
            mirror_anchor(anchor);
        }
    }
}

fn mirror_anchor(anchor: &mut SnapshotAnchor) {
    anchor.pose = anchor.pose.as_ref().map(mirror_pose);
    anchor.volume = anchor.volume.map(|v| v.mirror_z());
}

/// Reflect across the XY plane. Applying it twice is the identity.
fn mirror_pose(pose: &Pose) -> Pose {
    let p = pose.position;
    let q = pose.rotation;
    Pose::new(Vec3::new(p.x, p.y, -p.z), Quat::from_xyzw(-q.x, -q.y, q.z, q.w))
}
