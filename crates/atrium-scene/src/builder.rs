//! Room geometry construction from unordered anchors.
//!
//! Authored rooms (test prefabs, imported geometry) arrive as loose wall,
//! volume and plane anchors. The builder turns them into a consistent room:
//!
//! 1. **Chain**: starting from the first wall, repeatedly append the remaining
//!    wall whose leading (bottom-left) corner is nearest to the current
//!    wall's trailing (bottom-right) corner. Ties go to the earlier input.
//! 2. **Snap**: corner `i` is the midpoint of wall `i-1`'s trailing corner and
//!    wall `i`'s leading corner, flattened onto the seed wall's base plane.
//!    Each wall is then rebuilt to span exactly `corner[i] → corner[i+1]`,
//!    which closes the loop by construction.
//! 3. **Floor / ceiling**: the longest wall's frame measures the footprint;
//!    the floor sits at the base of that footprint facing up, the ceiling at
//!    wall height facing down with the same outline wound the other way.
//! 4. **Volumes**: authored volumes (centered pivot, Y-up) are re-pivoted to
//!    the room convention (top-face pivot, Z-up). Seating keeps a centered
//!    pivot so the seat surface stays at the anchor origin.

use std::f32::consts::{FRAC_PI_2, PI};

use atrium_geometry::{Aabb3, Pose, Rect};
use glam::{Quat, Vec2, Vec3};
use tracing::debug;
use uuid::Uuid;

use crate::anchor::{Anchor, PlaneBounds};
use crate::error::BuildError;
use crate::label::AnchorLabel;
use crate::room::{Room, RoomLayout};

/// How volume anchors handed to the builder are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VolumeConvention {
    /// Already top-anchored and Z-up; passed through untouched.
    #[default]
    Room,
    /// Centered pivot, Y-up, as authored in a scene tree.
    Authored,
}

/// Configuration for the room builder.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Convention of incoming volume anchors.
    pub volume_convention: VolumeConvention,

    /// Derive floor and ceiling from the wall loop when none are supplied.
    pub derive_floor_and_ceiling: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            volume_convention: VolumeConvention::Room,
            derive_floor_and_ceiling: true,
        }
    }
}

impl BuilderConfig {
    /// Config for geometry authored in a scene tree.
    #[must_use]
    pub fn authored() -> Self {
        Self {
            volume_convention: VolumeConvention::Authored,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_volume_convention(mut self, convention: VolumeConvention) -> Self {
        self.volume_convention = convention;
        self
    }

    #[must_use]
    pub fn with_derived_floor_and_ceiling(mut self, derive: bool) -> Self {
        self.derive_floor_and_ceiling = derive;
        self
    }
}

/// Anchors for one room, sorted by role. Wall order is irrelevant.
#[derive(Debug, Clone, Default)]
pub struct BuilderInput {
    pub walls: Vec<Anchor>,
    pub volumes: Vec<Anchor>,
    pub planes: Vec<Anchor>,
    pub floors: Vec<Anchor>,
    pub ceilings: Vec<Anchor>,
}

impl BuilderInput {
    /// Sort anchors by role: walls (wall labels with a plane), floors,
    /// ceilings, volumes (anything with a box), then remaining planes.
    pub fn classify(anchors: impl IntoIterator<Item = Anchor>) -> Self {
        let mut input = Self::default();
        for anchor in anchors {
            if anchor.label.is_wall() && anchor.plane.is_some() {
                input.walls.push(anchor);
            } else if anchor.has_label(AnchorLabel::FLOOR) {
                input.floors.push(anchor);
            } else if anchor.has_label(AnchorLabel::CEILING) {
                input.ceilings.push(anchor);
            } else if anchor.volume.is_some() {
                input.volumes.push(anchor);
            } else {
                input.planes.push(anchor);
            }
        }
        input
    }

    pub fn len(&self) -> usize {
        self.walls.len()
            + self.volumes.len()
            + self.planes.len()
            + self.floors.len()
            + self.ceilings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A wall with its corners resolved in world space.
struct WallSegment {
    anchor: Anchor,
    leading: Vec3,
    trailing: Vec3,
    half_extents: Vec2,
}

/// The closed wall loop after snapping.
struct WallLoop {
    walls: Vec<Anchor>,
    /// `corners[i]` is the leading corner of `walls[i]`
    corners: Vec<Vec3>,
    height: f32,
}

/// Builds geometrically closed rooms from unordered anchors.
#[derive(Debug, Clone, Default)]
pub struct RoomGeometryBuilder {
    config: BuilderConfig,
}

impl RoomGeometryBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Build a room. A room without walls is allowed (it gets no derived
    /// floor or ceiling); one or two walls cannot form a loop.
    pub fn build(
        &self,
        id: Uuid,
        pose: Pose,
        is_local: bool,
        input: BuilderInput,
    ) -> Result<Room, BuildError> {
        let BuilderInput {
            walls,
            volumes,
            planes,
            floors,
            ceilings,
        } = input;

        let wall_loop = if walls.is_empty() {
            None
        } else {
            Some(self.build_wall_loop(walls)?)
        };

        let mut anchors = Vec::new();
        let mut layout = RoomLayout::default();

        if let Some(wall_loop) = &wall_loop {
            layout.walls = wall_loop.walls.iter().map(|w| w.id).collect();
            anchors.extend(wall_loop.walls.iter().cloned());
        }

        let derived = match &wall_loop {
            Some(wall_loop)
                if self.config.derive_floor_and_ceiling
                    && (floors.is_empty() || ceilings.is_empty()) =>
            {
                Some(derive_floor_and_ceiling(id, wall_loop))
            }
            _ => None,
        };

        match (floors.is_empty(), &derived) {
            (false, _) => {
                layout.floor = floors.first().map(|f| f.id);
                anchors.extend(floors);
            }
            (true, Some((floor, _))) => {
                layout.floor = Some(floor.id);
                anchors.push(floor.clone());
            }
            (true, None) => {}
        }

        match (ceilings.is_empty(), derived) {
            (false, _) => {
                layout.ceiling = ceilings.first().map(|c| c.id);
                anchors.extend(ceilings);
            }
            (true, Some((_, ceiling))) => {
                layout.ceiling = Some(ceiling.id);
                anchors.push(ceiling);
            }
            (true, None) => {}
        }

        anchors.extend(volumes.into_iter().map(|v| self.convert_volume(v)));
        anchors.extend(planes);

        debug!(
            room = %id,
            walls = layout.walls.len(),
            anchors = anchors.len(),
            "built room geometry"
        );

        Ok(Room::from_parts(id, pose, is_local, anchors, layout))
    }

    fn build_wall_loop(&self, walls: Vec<Anchor>) -> Result<WallLoop, BuildError> {
        if walls.len() < 3 {
            return Err(BuildError::TooFewWalls { found: walls.len() });
        }

        let mut remaining = walls
            .into_iter()
            .map(|anchor| {
                let rect = anchor
                    .plane
                    .as_ref()
                    .map(|p| p.rect)
                    .ok_or(BuildError::WallWithoutPlane(anchor.id))?;
                let leading = anchor.pose.transform_point(rect.bottom_left().extend(0.0));
                let trailing = anchor.pose.transform_point(rect.bottom_right().extend(0.0));
                Ok(WallSegment {
                    anchor,
                    leading,
                    trailing,
                    half_extents: rect.half_extents(),
                })
            })
            .collect::<Result<Vec<_>, BuildError>>()?;

        // The seed wall fixes height, up axis and base plane for the loop
        let seed = remaining.remove(0);
        let height = seed.half_extents.y * 2.0;
        let up = seed.anchor.pose.up();
        let base = seed.leading;

        let mut ordered = vec![seed];
        while !remaining.is_empty() {
            let tail = ordered[ordered.len() - 1].trailing;
            let next = remaining
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    a.leading
                        .distance_squared(tail)
                        .total_cmp(&b.leading.distance_squared(tail))
                })
                .map(|(i, _)| i)
                .unwrap_or(0);
            ordered.push(remaining.remove(next));
        }

        let n = ordered.len();
        let corners: Vec<Vec3> = (0..n)
            .map(|i| {
                let prev = &ordered[(i + n - 1) % n];
                let joint = (prev.trailing + ordered[i].leading) * 0.5;
                joint - up * (joint - base).dot(up)
            })
            .collect();

        let walls = ordered
            .into_iter()
            .enumerate()
            .map(|(i, segment)| {
                let start = corners[i];
                let end = corners[(i + 1) % n];
                let width = start.distance(end);
                let center = (start + end) * 0.5 + up * (height * 0.5);
                let pose = Pose::from_segment(center, start, end, up)?;
                Ok(Anchor {
                    pose,
                    plane: Some(PlaneBounds::from_rect(Rect::centered(Vec2::new(width, height)))),
                    ..segment.anchor
                })
            })
            .collect::<Result<Vec<_>, BuildError>>()?;

        debug!(walls = n, height, "ordered wall loop");

        Ok(WallLoop {
            walls,
            corners,
            height,
        })
    }

    fn convert_volume(&self, anchor: Anchor) -> Anchor {
        if self.config.volume_convention == VolumeConvention::Room {
            return anchor;
        }
        let Some(volume) = anchor.volume else {
            return anchor;
        };

        // Authored size: x across, y up, z depth
        let size = volume.size();
        let up = anchor.pose.up();
        let center = anchor.pose.transform_point(volume.center());
        // Local Z becomes the authored up axis; local Y the authored -Z
        let rotation = (anchor.pose.rotation * Quat::from_rotation_x(-FRAC_PI_2)).normalize();
        let room_size = Vec3::new(size.x, size.z, size.y);

        let (position, volume) = if anchor.label.is_seating() {
            (center, Aabb3::centered(room_size))
        } else {
            (center + up * (size.y * 0.5), Aabb3::top_anchored(room_size))
        };

        Anchor {
            pose: Pose::new(position, rotation),
            volume: Some(volume),
            ..anchor
        }
    }
}

/// Floor and ceiling from the snapped corner loop, measured in the frame of
/// the longest wall.
fn derive_floor_and_ceiling(room: Uuid, wall_loop: &WallLoop) -> (Anchor, Anchor) {
    let width = |w: &Anchor| w.plane.as_ref().map_or(0.0, |p| p.rect.size.x);
    let mut longest = &wall_loop.walls[0];
    for wall in &wall_loop.walls[1..] {
        if width(wall) > width(longest) {
            longest = wall;
        }
    }

    let frame = longest.pose;
    let (mut min, mut max) = (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY));
    for corner in &wall_loop.corners {
        let local = frame.inverse_transform_point(*corner);
        let xz = Vec2::new(local.x, local.z);
        min = min.min(xz);
        max = max.max(xz);
    }
    let mid = (min + max) * 0.5;
    let center = frame.transform_point(Vec3::new(mid.x, -wall_loop.height * 0.5, mid.y));

    let right = frame.right();
    let up = frame.up();
    let floor_pose = Pose::from_axes(center, right, up.cross(right), up);
    let floor_boundary: Vec<Vec2> = wall_loop
        .corners
        .iter()
        .map(|c| floor_pose.inverse_transform_point(*c).truncate())
        .collect();

    // Flipped about local X: same outline seen from below
    let ceiling_pose = floor_pose.compose(&Pose::new(
        Vec3::Z * wall_loop.height,
        Quat::from_rotation_x(PI),
    ));
    let ceiling_boundary: Vec<Vec2> = floor_boundary
        .iter()
        .rev()
        .map(|p| Vec2::new(p.x, -p.y))
        .collect();

    let floor = Anchor::with_id(
        Uuid::new_v5(&room, b"floor"),
        AnchorLabel::FLOOR,
        floor_pose,
    )
    .with_plane(PlaneBounds::from_boundary(floor_boundary));
    let ceiling = Anchor::with_id(
        Uuid::new_v5(&room, b"ceiling"),
        AnchorLabel::CEILING,
        ceiling_pose,
    )
    .with_plane(PlaneBounds::from_boundary(ceiling_boundary));

    (floor, ceiling)
}
