//! The live room graph and its read-side queries.

use glam::Vec3;
use uuid::Uuid;

use crate::anchor::Anchor;
use crate::events::SceneEvent;
use crate::room::Room;
use crate::snapshot::Snapshot;

/// Two candidate rooms closer than this to a position are considered tied.
const CURRENT_ROOM_TIE: f32 = 1e-4;

/// Rooms currently known, in the order they entered the graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneGraph {
    rooms: Vec<Room>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, id: Uuid) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id() == id)
    }

    pub fn contains_room(&self, id: Uuid) -> bool {
        self.room(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Find an anchor and its owning room.
    pub fn find_anchor(&self, id: Uuid) -> Option<(&Room, &Anchor)> {
        self.rooms
            .iter()
            .find_map(|room| room.anchor(id).map(|anchor| (room, anchor)))
    }

    /// The room the position is in. When several rooms contain it, the one
    /// whose floor center is nearest wins; on a tie a locally captured room
    /// beats an imported one.
    pub fn current_room(&self, position: Vec3) -> Option<&Room> {
        let mut best: Option<(&Room, f32)> = None;
        for room in self.rooms.iter().filter(|r| r.is_position_in_room(position)) {
            let distance = room
                .center()
                .map_or(f32::INFINITY, |c| c.distance(position));
            best = match best {
                None => Some((room, distance)),
                Some((current, d)) if (distance - d).abs() <= CURRENT_ROOM_TIE => {
                    if room.is_local() && !current.is_local() {
                        Some((room, distance))
                    } else {
                        Some((current, d))
                    }
                }
                Some((_, d)) if distance < d => Some((room, distance)),
                keep => keep,
            };
        }
        best.map(|(room, _)| room)
    }

    /// Remove every room. Returns one removal event per room, in graph order.
    pub fn clear(&mut self) -> Vec<SceneEvent> {
        self.rooms
            .drain(..)
            .map(|room| SceneEvent::RoomRemoved { room })
            .collect()
    }

    /// Describe the graph as a snapshot (layouts included).
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot::from_rooms(&self.rooms)
    }

    pub(crate) fn rooms_mut(&mut self) -> &mut Vec<Room> {
        &mut self.rooms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::AnchorLabel;
    use crate::room::RoomLayout;
    use atrium_geometry::{Pose, Rect};
    use glam::{Quat, Vec2};

    fn square_room(center: Vec3, size: f32, is_local: bool) -> Room {
        let floor = Anchor::new(
            AnchorLabel::FLOOR,
            Pose::new(center, Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
        )
        .with_rect(Rect::centered(Vec2::splat(size)));
        Room::from_parts(Uuid::new_v4(), Pose::IDENTITY, is_local, vec![floor], RoomLayout::default())
    }

    fn graph_of(rooms: Vec<Room>) -> SceneGraph {
        SceneGraph { rooms }
    }

    #[test]
    fn current_room_prefers_nearest_center() {
        let big = square_room(Vec3::ZERO, 10.0, false);
        let small = square_room(Vec3::new(3.0, 0.0, 0.0), 2.0, false);
        let graph = graph_of(vec![big.clone(), small.clone()]);

        assert_eq!(graph.current_room(Vec3::new(3.2, 1.0, 0.0)).map(Room::id), Some(small.id()));
        assert_eq!(graph.current_room(Vec3::new(-3.0, 1.0, 0.0)).map(Room::id), Some(big.id()));
        assert!(graph.current_room(Vec3::new(20.0, 1.0, 0.0)).is_none());
    }

    #[test]
    fn current_room_tie_goes_to_local() {
        let imported = square_room(Vec3::ZERO, 4.0, false);
        let local = square_room(Vec3::ZERO, 4.0, true);
        let graph = graph_of(vec![imported, local.clone()]);
        assert_eq!(graph.current_room(Vec3::new(0.5, 1.0, 0.5)).map(Room::id), Some(local.id()));
    }

    #[test]
    fn clear_reports_every_room() {
        let a = square_room(Vec3::ZERO, 4.0, true);
        let b = square_room(Vec3::X * 10.0, 4.0, true);
        let mut graph = graph_of(vec![a.clone(), b.clone()]);

        let events = graph.clear();
        assert!(graph.is_empty());
        assert_eq!(
            events,
            vec![SceneEvent::RoomRemoved { room: a }, SceneEvent::RoomRemoved { room: b }]
        );
    }

    #[test]
    fn find_anchor_returns_owner() {
        let room = square_room(Vec3::ZERO, 4.0, true);
        let floor_id = room.layout().floor.unwrap();
        let graph = graph_of(vec![room.clone()]);

        let (owner, anchor) = graph.find_anchor(floor_id).unwrap();
        assert_eq!(owner.id(), room.id());
        assert_eq!(anchor.id, floor_id);
    }
}
