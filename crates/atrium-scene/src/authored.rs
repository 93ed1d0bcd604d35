//! Rooms authored as scene trees (test prefabs, hand-built fixtures).
//!
//! Each labeled node becomes an anchor: its name carries the label
//! (`WALL_FACE`, `Couch (2)`, `TABLE.001`), its local transform chain gives
//! the pose and its `size` the extent. Nodes with depth become volumes in the
//! authored centered/Y-up convention; flat nodes become planes. The collected
//! anchors go through the [`RoomGeometryBuilder`].
//!
//! Traversal uses an explicit stack, so tree depth is bounded by memory only.

use atrium_geometry::{Aabb3, Pose, Rect};
use glam::Vec3;
use tracing::debug;
use uuid::Uuid;

use crate::anchor::Anchor;
use crate::builder::{BuilderConfig, BuilderInput, RoomGeometryBuilder};
use crate::error::BuildError;
use crate::label::AnchorLabel;
use crate::room::Room;
use crate::snapshot::{Snapshot, SnapshotRoom};

/// Namespace for ids of authored rooms.
const AUTHORED_NAMESPACE: Uuid = Uuid::from_u128(0x7c1f_3a52_9e04_4d6b_a1c8_52f0_e6d9_b413);

/// A node of an authored scene tree.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SceneNode {
    pub name: String,
    /// Transform relative to the parent node
    #[cfg_attr(feature = "serde", serde(default))]
    pub local: Pose,
    /// Full extent; `z == 0` for flat nodes
    #[cfg_attr(feature = "serde", serde(default))]
    pub size: Vec3,
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<SceneNode>,
}

/// A node reached during traversal, with its world pose and tree path.
#[derive(Debug, Clone)]
pub struct VisitedNode<'a> {
    pub node: &'a SceneNode,
    pub world: Pose,
    /// Sibling indices and names from the root, e.g. `0:Room/2:WALL_FACE`
    pub path: String,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, local: Pose) -> Self {
        Self {
            name: name.into(),
            local,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: Vec3) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Every node in pre-order (parents before children, siblings in order).
    pub fn walk(&self) -> Vec<VisitedNode<'_>> {
        let mut visited = Vec::new();
        let mut stack = vec![VisitedNode {
            node: self,
            world: self.local,
            path: format!("0:{}", self.name),
        }];
        while let Some(current) = stack.pop() {
            // Reverse so the first child is popped first
            for (index, child) in current.node.children.iter().enumerate().rev() {
                stack.push(VisitedNode {
                    node: child,
                    world: current.world.compose(&child.local),
                    path: format!("{}/{index}:{}", current.path, child.name),
                });
            }
            visited.push(current);
        }
        visited
    }

    /// First node named `name` in pre-order, with its world pose.
    pub fn find(&self, name: &str) -> Option<(&SceneNode, Pose)> {
        let mut stack = vec![(self, self.local)];
        while let Some((node, world)) = stack.pop() {
            if node.name == name {
                return Some((node, world));
            }
            stack.extend(
                node.children
                    .iter()
                    .rev()
                    .map(|child| (child, world.compose(&child.local))),
            );
        }
        None
    }

    /// Id of the room authored under this node.
    pub fn room_id(&self) -> Uuid {
        Uuid::new_v5(&AUTHORED_NAMESPACE, self.name.as_bytes())
    }
}

fn anchor_for(room: Uuid, visited: &VisitedNode<'_>, label: AnchorLabel) -> Anchor {
    let id = Uuid::new_v5(&room, visited.path.as_bytes());
    let size = visited.node.size;
    let anchor = Anchor::with_id(id, label, visited.world);
    if size.z > 0.0 && !label.is_wall() {
        anchor.with_volume(Aabb3::centered(size))
    } else {
        anchor.with_rect(Rect::centered(size.truncate()))
    }
}

/// Build the room authored under `root`. The root itself is the room anchor.
pub fn build_authored_room(root: &SceneNode, is_local: bool) -> Result<Room, BuildError> {
    let room_id = root.room_id();
    let anchors: Vec<Anchor> = root
        .walk()
        .iter()
        .skip(1)
        .filter_map(|visited| {
            AnchorLabel::parse_node_name(&visited.node.name)
                .map(|label| anchor_for(room_id, visited, label))
        })
        .collect();
    debug!(room = %room_id, name = %root.name, anchors = anchors.len(), "collected authored anchors");

    RoomGeometryBuilder::new(BuilderConfig::authored()).build(
        room_id,
        root.local,
        is_local,
        BuilderInput::classify(anchors),
    )
}

/// Build every named room found in `scene` into one snapshot (layouts
/// included). Names that are not found are skipped.
pub fn authored_snapshot(
    scene: &SceneNode,
    room_names: &[&str],
    is_local: bool,
) -> Result<Snapshot, BuildError> {
    let mut rooms = Vec::with_capacity(room_names.len());
    for name in room_names {
        let Some((node, world)) = scene.find(name) else {
            debug!(%name, "authored room not found");
            continue;
        };
        // Re-root at the found node so its world pose becomes the room pose
        let rooted = SceneNode {
            local: world,
            ..node.clone()
        };
        rooms.push(SnapshotRoom::from_room(&build_authored_room(&rooted, is_local)?));
    }
    Ok(Snapshot::new(rooms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use std::f32::consts::{FRAC_PI_2, PI};

    /// 4 x 4 room, 2.5 tall, walls facing inward, plus a table and a couch.
    fn authored_room(name: &str) -> SceneNode {
        let wall = |label: &str, x: f32, z: f32, yaw: f32| {
            SceneNode::new(label, Pose::new(Vec3::new(x, 1.25, z), Quat::from_rotation_y(yaw)))
                .with_size(Vec3::new(4.0, 2.5, 0.0))
        };
        SceneNode::new(name, Pose::IDENTITY)
            .with_child(
                SceneNode::new("Walls", Pose::IDENTITY)
                    .with_child(wall("WALL_FACE", 0.0, -2.0, 0.0))
                    .with_child(wall("WALL_FACE (1)", 0.0, 2.0, PI))
                    .with_child(wall("WALL_FACE (2)", 2.0, 0.0, -FRAC_PI_2))
                    .with_child(wall("WALL_FACE (3)", -2.0, 0.0, FRAC_PI_2)),
            )
            .with_child(
                SceneNode::new("TABLE", Pose::from_position(Vec3::new(0.5, 0.4, 0.0)))
                    .with_size(Vec3::new(1.2, 0.8, 0.6)),
            )
            .with_child(
                SceneNode::new("Couch", Pose::from_position(Vec3::new(-1.0, 0.45, 1.0)))
                    .with_size(Vec3::new(2.0, 0.9, 0.9)),
            )
            .with_child(SceneNode::new("Lighting", Pose::IDENTITY))
    }

    #[test]
    fn walk_is_preorder_with_world_poses() {
        let root = SceneNode::new("root", Pose::from_position(Vec3::X))
            .with_child(
                SceneNode::new("a", Pose::from_position(Vec3::Y))
                    .with_child(SceneNode::new("a1", Pose::from_position(Vec3::Z))),
            )
            .with_child(SceneNode::new("b", Pose::IDENTITY));

        let names: Vec<&str> = root.walk().iter().map(|v| v.node.name.as_str()).collect();
        assert_eq!(names, vec!["root", "a", "a1", "b"]);

        let (_, world) = root.find("a1").unwrap();
        assert!(world.position.abs_diff_eq(Vec3::ONE, 1e-6));
        assert!(root.find("missing").is_none());
    }

    #[test]
    fn deep_tree_does_not_recurse() {
        let mut node = SceneNode::new("TABLE", Pose::from_position(Vec3::Y * 0.001));
        for _ in 0..10_000 {
            node = SceneNode::new("Group", Pose::IDENTITY).with_child(node);
        }
        assert!(node.find("TABLE").is_some());
        // Drop the chain without overflowing the stack
        let mut stack = vec![node];
        while let Some(mut n) = stack.pop() {
            stack.append(&mut n.children);
        }
    }

    #[test]
    fn authored_room_is_closed_with_converted_volumes() {
        let room = build_authored_room(&authored_room("Studio"), false).unwrap();

        assert_eq!(room.layout().walls.len(), 4);
        assert!(room.is_wall_loop_closed(1e-4));
        assert!(room.is_position_in_room(Vec3::new(1.0, 1.0, 1.0)));

        let table = room.anchors_with_label(AnchorLabel::TABLE).next().unwrap();
        assert!(table.pose.position.abs_diff_eq(Vec3::new(0.5, 0.8, 0.0), 1e-5));
        let couch = room.anchors_with_label(AnchorLabel::COUCH).next().unwrap();
        assert!(couch.pose.position.abs_diff_eq(Vec3::new(-1.0, 0.45, 1.0), 1e-5));
        // Unlabeled groups are not anchors
        assert_eq!(room.anchors().len(), 8);
    }

    #[test]
    fn authored_ids_are_deterministic() {
        let a = build_authored_room(&authored_room("Studio"), false).unwrap();
        let b = build_authored_room(&authored_room("Studio"), false).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.id(), authored_room("Office").room_id());
    }

    #[test]
    fn snapshot_collects_named_rooms() {
        let scene = SceneNode::new("Level", Pose::IDENTITY)
            .with_child(authored_room("Studio"))
            .with_child(authored_room("Office"));
        let snapshot = authored_snapshot(&scene, &["Office", "Attic"], true).unwrap();
        assert_eq!(snapshot.rooms.len(), 1);
        assert!(snapshot.rooms[0].layout.is_some());
        assert!(snapshot.rooms[0].is_local);
    }
}
