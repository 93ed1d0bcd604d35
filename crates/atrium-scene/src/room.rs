//! Rooms: the unit of reconciliation.
//!
//! A room owns its anchors. The [`RoomLayout`] names which of them form the
//! wall loop (in order), the floor and the ceiling; it only ever references
//! anchors the room actually holds.

use std::collections::{HashMap, HashSet};

use atrium_geometry::{contains_point, horizontal, Pose, RigidTransform};
use glam::{Vec2, Vec3};
use uuid::Uuid;

use crate::anchor::Anchor;
use crate::label::AnchorLabel;

/// Room layout component: ordered wall loop plus floor and ceiling.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomLayout {
    pub floor: Option<Uuid>,
    pub ceiling: Option<Uuid>,
    /// Clockwise viewed from above
    pub walls: Vec<Uuid>,
}

impl RoomLayout {
    pub fn new(floor: Option<Uuid>, ceiling: Option<Uuid>, walls: Vec<Uuid>) -> Self {
        Self {
            floor,
            ceiling,
            walls,
        }
    }

    /// Every anchor the layout refers to.
    pub fn references(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.floor
            .iter()
            .chain(self.ceiling.iter())
            .chain(self.walls.iter())
            .copied()
    }

    /// Drop references for which `keep` returns false.
    pub fn retain(&mut self, keep: impl Fn(&Uuid) -> bool) {
        self.floor = self.floor.filter(|id| keep(id));
        self.ceiling = self.ceiling.filter(|id| keep(id));
        self.walls.retain(|id| keep(id));
    }
}

/// A physical or authored space.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Room {
    id: Uuid,
    is_local: bool,
    /// Current pose of the room anchor
    pose: Pose,
    /// Pose of the room anchor when the room entered the graph
    reference_pose: Pose,
    anchors: Vec<Anchor>,
    layout: RoomLayout,
}

impl Room {
    /// An empty room.
    pub fn new(id: Uuid, pose: Pose, is_local: bool) -> Self {
        Self {
            id,
            is_local,
            pose,
            reference_pose: pose,
            anchors: Vec::new(),
            layout: RoomLayout::default(),
        }
    }

    /// Assemble a room from anchors and a layout. Layout references to
    /// anchors not in `anchors` are dropped.
    pub fn from_parts(
        id: Uuid,
        pose: Pose,
        is_local: bool,
        anchors: Vec<Anchor>,
        layout: RoomLayout,
    ) -> Self {
        let mut room = Self::new(id, pose, is_local);
        room.anchors = anchors;
        room.set_layout(layout);
        room
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_local(&self) -> bool {
        self.is_local
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn reference_pose(&self) -> &Pose {
        &self.reference_pose
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn layout(&self) -> &RoomLayout {
        &self.layout
    }

    pub fn anchor(&self, id: Uuid) -> Option<&Anchor> {
        self.anchors.iter().find(|a| a.id == id)
    }

    pub fn contains_anchor(&self, id: Uuid) -> bool {
        self.anchor(id).is_some()
    }

    /// Walls in loop order.
    pub fn walls(&self) -> impl Iterator<Item = &Anchor> + '_ {
        self.layout.walls.iter().filter_map(|id| self.anchor(*id))
    }

    pub fn floor(&self) -> Option<&Anchor> {
        self.layout.floor.and_then(|id| self.anchor(id))
    }

    pub fn ceiling(&self) -> Option<&Anchor> {
        self.layout.ceiling.and_then(|id| self.anchor(id))
    }

    pub fn anchors_with_label(&self, label: AnchorLabel) -> impl Iterator<Item = &Anchor> + '_ {
        self.anchors.iter().filter(move |a| a.has_label(label))
    }

    /// Floor boundary in world XZ.
    pub fn floor_outline(&self) -> Vec<Vec2> {
        self.floor()
            .map(|f| f.boundary_world().into_iter().map(horizontal).collect())
            .unwrap_or_default()
    }

    /// Ceiling boundary in world XZ.
    pub fn ceiling_outline(&self) -> Vec<Vec2> {
        self.ceiling()
            .map(|c| c.boundary_world().into_iter().map(horizontal).collect())
            .unwrap_or_default()
    }

    /// Floor anchor position, if the room has a floor.
    pub fn center(&self) -> Option<Vec3> {
        self.floor().map(|f| f.pose.position)
    }

    /// Inside the floor outline and between floor and ceiling heights.
    pub fn is_position_in_room(&self, position: Vec3) -> bool {
        let Some(floor) = self.floor() else {
            return false;
        };
        if position.y < floor.pose.position.y {
            return false;
        }
        if let Some(ceiling) = self.ceiling() {
            if position.y > ceiling.pose.position.y {
                return false;
            }
        }
        contains_point(&self.floor_outline(), horizontal(position))
    }

    /// Transform that maps the room anchor's current pose back onto the pose
    /// it had when the room was created. Only device-captured rooms drift;
    /// imported rooms provide no lock.
    pub fn lock_transform(&self) -> Option<RigidTransform> {
        self.is_local
            .then(|| RigidTransform::align(&self.pose, &self.reference_pose))
    }

    /// Distance between each wall's trailing corner and the next wall's
    /// leading corner, in loop order (the last entry closes the loop).
    pub fn wall_loop_gaps(&self) -> Vec<f32> {
        let walls: Vec<&Anchor> = self.walls().collect();
        let n = walls.len();
        (0..n)
            .filter_map(|i| {
                let trailing = walls[i].trailing_corner()?;
                let leading = walls[(i + 1) % n].leading_corner()?;
                Some(trailing.distance(leading))
            })
            .collect()
    }

    pub fn is_wall_loop_closed(&self, tolerance: f32) -> bool {
        let gaps = self.wall_loop_gaps();
        gaps.len() == self.layout.walls.len() && gaps.iter().all(|g| *g <= tolerance)
    }

    /// Same anchors (as a set, compared field by field), same layout, same pose.
    pub(crate) fn same_contents(&self, other: &Room) -> bool {
        if self.pose != other.pose
            || self.layout != other.layout
            || self.anchors.len() != other.anchors.len()
        {
            return false;
        }
        let mine: HashMap<Uuid, &Anchor> = self.anchors.iter().map(|a| (a.id, a)).collect();
        other
            .anchors
            .iter()
            .all(|a| mine.get(&a.id).is_some_and(|m| *m == a))
    }

    pub(crate) fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    pub(crate) fn insert_anchor(&mut self, anchor: Anchor) {
        self.anchors.push(anchor);
    }

    pub(crate) fn remove_anchor(&mut self, id: Uuid) -> Option<Anchor> {
        let index = self.anchors.iter().position(|a| a.id == id)?;
        Some(self.anchors.remove(index))
    }

    /// Replace an anchor in place, keeping its slot. Returns the old value.
    pub(crate) fn replace_anchor(&mut self, anchor: Anchor) -> Option<Anchor> {
        let slot = self.anchors.iter_mut().find(|a| a.id == anchor.id)?;
        Some(std::mem::replace(slot, anchor))
    }

    /// Install a layout, dropping references to anchors the room does not
    /// hold. A missing floor or ceiling falls back to the first anchor with
    /// that label.
    pub(crate) fn set_layout(&mut self, mut layout: RoomLayout) {
        let present: HashSet<Uuid> = self.anchors.iter().map(|a| a.id).collect();
        layout.retain(|id| present.contains(id));
        if layout.floor.is_none() {
            layout.floor = self.anchors_with_label(AnchorLabel::FLOOR).next().map(|a| a.id);
        }
        if layout.ceiling.is_none() {
            layout.ceiling = self
                .anchors_with_label(AnchorLabel::CEILING)
                .next()
                .map(|a| a.id);
        }
        self.layout = layout;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_geometry::Rect;
    use glam::Quat;

    use crate::anchor::PlaneBounds;

    fn floor(size: f32) -> Anchor {
        // Z-up floor: local Y maps to world -Z
        let rotation = Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);
        Anchor::new(AnchorLabel::FLOOR, Pose::new(Vec3::ZERO, rotation))
            .with_rect(Rect::centered(Vec2::splat(size)))
    }

    fn ceiling(size: f32, height: f32) -> Anchor {
        let rotation = Quat::from_rotation_x(std::f32::consts::FRAC_PI_2);
        Anchor::new(AnchorLabel::CEILING, Pose::new(Vec3::Y * height, rotation))
            .with_rect(Rect::centered(Vec2::splat(size)))
    }

    fn room_with(anchors: Vec<Anchor>, is_local: bool) -> Room {
        Room::from_parts(Uuid::new_v4(), Pose::IDENTITY, is_local, anchors, RoomLayout::default())
    }

    #[test]
    fn layout_falls_back_to_labels() {
        let room = room_with(vec![floor(4.0), ceiling(4.0, 2.5)], true);
        assert!(room.floor().is_some());
        assert!(room.ceiling().is_some());
        assert_eq!(room.walls().count(), 0);
    }

    #[test]
    fn layout_drops_unknown_references() {
        let f = floor(4.0);
        let layout = RoomLayout::new(Some(f.id), None, vec![Uuid::new_v4()]);
        let room = Room::from_parts(Uuid::new_v4(), Pose::IDENTITY, true, vec![f], layout);
        assert!(room.layout().walls.is_empty());
        assert!(room.floor().is_some());
    }

    #[test]
    fn position_containment_uses_floor_and_ceiling() {
        let room = room_with(vec![floor(4.0), ceiling(4.0, 2.5)], true);
        assert!(room.is_position_in_room(Vec3::new(0.5, 1.0, -1.0)));
        assert!(!room.is_position_in_room(Vec3::new(3.0, 1.0, 0.0)));
        assert!(!room.is_position_in_room(Vec3::new(0.0, 3.0, 0.0)));
        assert!(!room.is_position_in_room(Vec3::new(0.0, -0.1, 0.0)));
    }

    #[test]
    fn room_without_floor_contains_nothing() {
        let room = room_with(vec![], true);
        assert!(!room.is_position_in_room(Vec3::ZERO));
        assert!(room.floor_outline().is_empty());
    }

    #[test]
    fn lock_transform_only_for_local_rooms() {
        let mut local = room_with(vec![], true);
        assert!(local.lock_transform().unwrap().is_identity(1e-6));

        local.set_pose(Pose::from_position(Vec3::new(0.1, 0.0, 0.0)));
        let lock = local.lock_transform().unwrap();
        assert!(lock
            .apply_point(Vec3::new(0.1, 0.0, 0.0))
            .abs_diff_eq(Vec3::ZERO, 1e-6));

        let imported = room_with(vec![], false);
        assert!(imported.lock_transform().is_none());
    }

    #[test]
    fn same_contents_ignores_anchor_order() {
        let a = floor(4.0);
        let b = Anchor::new(AnchorLabel::TABLE, Pose::IDENTITY)
            .with_plane(PlaneBounds::from_rect(Rect::centered(Vec2::ONE)));
        let id = Uuid::new_v4();
        let first = Room::from_parts(id, Pose::IDENTITY, true, vec![a.clone(), b.clone()], RoomLayout::default());
        let second = Room::from_parts(id, Pose::IDENTITY, true, vec![b.clone(), a.clone()], RoomLayout::default());
        assert!(first.same_contents(&second));

        let mut moved = b;
        moved.pose.position.x += 0.01;
        let third = Room::from_parts(id, Pose::IDENTITY, true, vec![a, moved], RoomLayout::default());
        assert!(!first.same_contents(&third));
    }
}
