//! Rigid poses: a position plus a unit rotation.

use std::ops::Mul;

use glam::{Mat3, Quat, Vec3};

use crate::error::{GeometryError, Result};

/// Position and orientation of an anchor in its parent frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    /// Origin of the local frame
    pub position: Vec3,
    /// Orientation of the local frame (unit quaternion)
    pub rotation: Quat,
}

impl Pose {
    /// The identity pose.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Create a new pose.
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// A pose with no rotation.
    pub const fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Build a pose from an orthonormal basis (local X, Y and Z in world space).
    pub fn from_axes(position: Vec3, x: Vec3, y: Vec3, z: Vec3) -> Self {
        let rotation = Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize();
        Self { position, rotation }
    }

    /// Build a pose whose local +X runs from `start` to `end` and whose local
    /// +Y is `up`. Local +Z completes a right-handed frame.
    ///
    /// Fails when the segment is (numerically) vertical or zero-length.
    pub fn from_segment(position: Vec3, start: Vec3, end: Vec3, up: Vec3) -> Result<Self> {
        let up = up.normalize_or_zero();
        let along = end - start;
        let along = (along - up * along.dot(up)).normalize_or_zero();
        if along == Vec3::ZERO || up == Vec3::ZERO {
            return Err(GeometryError::DegenerateSegment(start, end));
        }
        let normal = along.cross(up);
        Ok(Self::from_axes(position, along, up, normal))
    }

    /// Transform a point from local to parent space.
    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Transform a point from parent to local space.
    #[inline]
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    /// The inverse pose.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self {
            position: -(rotation * self.position),
            rotation,
        }
    }

    /// Compose: `self` applied after `local` (i.e. `local` expressed in `self`).
    pub fn compose(&self, local: &Pose) -> Self {
        Self {
            position: self.transform_point(local.position),
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    /// Local +X in parent space.
    #[inline]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Local +Y in parent space.
    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Local +Z in parent space.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }

    /// Compare poses within a tolerance. `q` and `-q` are the same rotation.
    pub fn abs_diff_eq(&self, other: &Pose, tolerance: f32) -> bool {
        self.position.abs_diff_eq(other.position, tolerance)
            && (self.rotation.abs_diff_eq(other.rotation, tolerance)
                || self.rotation.abs_diff_eq(-other.rotation, tolerance))
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Pose {
    type Output = Pose;

    #[inline]
    fn mul(self, rhs: Pose) -> Pose {
        self.compose(&rhs)
    }
}

impl std::fmt::Display for Pose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.3}, {:.3}, {:.3}) @ ({:.3}, {:.3}, {:.3}, {:.3})",
            self.position.x,
            self.position.y,
            self.position.z,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
            self.rotation.w
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-5;

    #[test]
    fn identity_leaves_points_alone() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Pose::IDENTITY.transform_point(p), p);
    }

    #[test]
    fn inverse_round_trips_points() {
        let pose = Pose::new(Vec3::new(3.0, -1.0, 2.0), Quat::from_rotation_y(0.7));
        let p = Vec3::new(-4.0, 0.5, 9.0);
        let back = pose.inverse_transform_point(pose.transform_point(p));
        assert!(back.abs_diff_eq(p, EPS));
        assert!(pose.inverse().compose(&pose).abs_diff_eq(&Pose::IDENTITY, EPS));
    }

    #[test]
    fn compose_matches_sequential_transform() {
        let parent = Pose::new(Vec3::new(1.0, 0.0, 0.0), Quat::from_rotation_y(FRAC_PI_2));
        let child = Pose::from_position(Vec3::new(0.0, 0.0, 2.0));
        let p = Vec3::new(0.5, 1.0, 0.0);

        let composed = (parent * child).transform_point(p);
        let stepped = parent.transform_point(child.transform_point(p));
        assert!(composed.abs_diff_eq(stepped, EPS));
    }

    #[test]
    fn segment_frame_is_right_handed() {
        let pose = Pose::from_segment(
            Vec3::ZERO,
            Vec3::new(-2.0, 0.0, -2.0),
            Vec3::new(2.0, 0.0, -2.0),
            Vec3::Y,
        )
        .unwrap();

        assert!(pose.right().abs_diff_eq(Vec3::X, EPS));
        assert!(pose.up().abs_diff_eq(Vec3::Y, EPS));
        // Normal of a wall running +X faces +Z
        assert!(pose.forward().abs_diff_eq(Vec3::Z, EPS));
    }

    #[test]
    fn vertical_segment_is_degenerate() {
        let result = Pose::from_segment(Vec3::ZERO, Vec3::ZERO, Vec3::Y, Vec3::Y);
        assert!(matches!(result, Err(GeometryError::DegenerateSegment(..))));
    }

    #[test]
    fn negated_quaternion_compares_equal() {
        let a = Pose::new(Vec3::ONE, Quat::from_rotation_z(0.3));
        let b = Pose::new(Vec3::ONE, -Quat::from_rotation_z(0.3));
        assert!(a.abs_diff_eq(&b, EPS));
    }

    #[test]
    fn nan_pose_is_not_finite() {
        let pose = Pose::from_position(Vec3::new(f32::NAN, 0.0, 0.0));
        assert!(!pose.is_finite());
        assert!(Pose::IDENTITY.is_finite());
    }
}
