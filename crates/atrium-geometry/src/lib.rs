//! Atrium Geometry
//!
//! Spatial primitives shared by the room scene graph.
//!
//! # Conventions
//!
//! World space is right-handed with +Y up. Every anchor carries a [`Pose`]
//! (position + unit rotation) and describes its extent in its own local frame:
//!
//! - Planar anchors (walls, floor, ceiling, flat furniture) live in the local
//!   XY plane; local +Z is the plane normal, facing into the room.
//! - Wall anchors have local +X running along the wall and local +Y pointing
//!   up. The bottom-left corner is the wall's *leading* corner, the
//!   bottom-right its *trailing* corner.
//! - Volume anchors are Z-up with the pivot on the top face.
//!
//! # Alignment
//!
//! [`RigidTransform::align`] maps a snapshot captured in a remote frame into
//! the local frame given one anchor observed in both. Because boundaries are
//! stored anchor-local, transforming every pose carries the polygons along.

mod aabb;
mod error;
mod polygon;
mod pose;
mod rect;
mod transform;

pub use aabb::Aabb3;
pub use error::{GeometryError, Result};
pub use polygon::{
    bounds, contains_point, is_simple, outlines_match, reversed, signed_area, winding, Winding,
};
pub use pose::Pose;
pub use rect::Rect;
pub use transform::RigidTransform;

/// World up axis.
pub const WORLD_UP: glam::Vec3 = glam::Vec3::Y;

/// Project a world point onto the horizontal (XZ) plane.
#[inline]
pub fn horizontal(point: glam::Vec3) -> glam::Vec2 {
    glam::Vec2::new(point.x, point.z)
}
