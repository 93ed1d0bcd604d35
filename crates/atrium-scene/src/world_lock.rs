//! World lock: keep the tracking space pinned to the room the viewer is in.

use atrium_geometry::RigidTransform;
use glam::Vec3;
use tracing::trace;
use uuid::Uuid;

use crate::graph::SceneGraph;

/// Per-frame tracking-space correction. Reads the graph, never writes it.
#[derive(Debug, Clone, Default)]
pub struct WorldLock {
    tracking_space: RigidTransform,
    locked_room: Option<Uuid>,
}

impl WorldLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tracking-space transform.
    pub fn tracking_space(&self) -> &RigidTransform {
        &self.tracking_space
    }

    /// Room providing the lock on the last update, if any.
    pub fn locked_room(&self) -> Option<Uuid> {
        self.locked_room
    }

    /// One step: adopt the current room's lock transform, or reset to
    /// identity when there is no room or it provides no lock.
    pub fn update(&mut self, graph: &SceneGraph, viewer: Vec3) -> RigidTransform {
        let lock = graph
            .current_room(viewer)
            .and_then(|room| room.lock_transform().map(|t| (room.id(), t)));

        match lock {
            Some((room, transform)) => {
                if self.locked_room != Some(room) {
                    trace!(%room, "world lock switched room");
                }
                self.locked_room = Some(room);
                self.tracking_space = transform;
            }
            None => {
                self.locked_room = None;
                self.tracking_space = RigidTransform::IDENTITY;
            }
        }
        self.tracking_space
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::SceneGraphReconciler;
    use crate::room::RoomLayout;
    use crate::snapshot::{Snapshot, SnapshotAnchor, SnapshotRoom};
    use crate::{anchor::Anchor, label::AnchorLabel};
    use atrium_geometry::{Pose, Rect};
    use glam::{Quat, Vec2};

    fn room_snapshot(id: Uuid, pose: Pose, is_local: bool) -> Snapshot {
        let floor = Anchor::new(
            AnchorLabel::FLOOR,
            Pose::new(Vec3::ZERO, Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
        )
        .with_rect(Rect::centered(Vec2::splat(4.0)));
        Snapshot::new(vec![SnapshotRoom {
            layout: Some(RoomLayout::default()),
            anchors: vec![SnapshotAnchor::from(&floor)],
            ..SnapshotRoom::new(id, pose, is_local)
        }])
    }

    #[test]
    fn drifted_local_room_provides_lock() {
        let id = Uuid::new_v4();
        let reconciler = SceneGraphReconciler::default();
        let mut graph = SceneGraph::new();
        reconciler
            .reconcile(&mut graph, &room_snapshot(id, Pose::IDENTITY, true), None)
            .unwrap();

        let mut lock = WorldLock::new();
        assert!(lock.update(&graph, Vec3::new(0.0, 1.0, 0.0)).is_identity(1e-6));
        assert_eq!(lock.locked_room(), Some(id));

        let mut drifted = room_snapshot(id, Pose::from_position(Vec3::new(0.02, 0.0, 0.0)), true);
        // Keep the floor anchor identical so only the room pose moves
        drifted.rooms[0].anchors = graph.to_snapshot().rooms[0].anchors.clone();
        reconciler.reconcile(&mut graph, &drifted, None).unwrap();

        let t = lock.update(&graph, Vec3::new(0.0, 1.0, 0.0));
        assert!(t.translation.abs_diff_eq(Vec3::new(-0.02, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn imported_room_resets_to_identity() {
        let mut graph = SceneGraph::new();
        SceneGraphReconciler::default()
            .reconcile(&mut graph, &room_snapshot(Uuid::new_v4(), Pose::IDENTITY, false), None)
            .unwrap();

        let mut lock = WorldLock::new();
        assert!(lock.update(&graph, Vec3::new(0.0, 1.0, 0.0)).is_identity(1e-6));
        assert!(lock.locked_room().is_none());
        assert!(lock.update(&SceneGraph::new(), Vec3::ZERO).is_identity(1e-6));
    }
}
