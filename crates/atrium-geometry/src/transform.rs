//! Rigid transforms for co-located alignment.
//!
//! Two parties observe the same physical anchor. The receiver knows where
//! that anchor sits in its own world (`remote`, supplied by the host of the
//! session) and the snapshot describes it in the sender's frame (`local`).
//! The transform that reconciles both frames is:
//!
//! ```text
//! rotation    = remote.rotation ∘ local.rotation⁻¹
//! translation = remote.position − rotation · local.position
//! ```
//!
//! Applying it to `local` yields exactly `remote`; applying it to every other
//! anchor of the snapshot moves the whole room rigidly.

use glam::{Quat, Vec3};

use crate::pose::Pose;

/// A rotation followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RigidTransform {
    pub rotation: Quat,
    pub translation: Vec3,
}

impl RigidTransform {
    pub const IDENTITY: Self = Self {
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    pub const fn new(rotation: Quat, translation: Vec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Compute the transform mapping `local` onto `remote`.
    pub fn align(local: &Pose, remote: &Pose) -> Self {
        let rotation = (remote.rotation * local.rotation.inverse()).normalize();
        let translation = remote.position - rotation * local.position;
        Self {
            rotation,
            translation,
        }
    }

    #[inline]
    pub fn apply_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.translation
    }

    pub fn apply_pose(&self, pose: &Pose) -> Pose {
        Pose {
            position: self.apply_point(pose.position),
            rotation: (self.rotation * pose.rotation).normalize(),
        }
    }

    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self {
            rotation,
            translation: -(rotation * self.translation),
        }
    }

    /// `self` after `first`.
    pub fn then_after(&self, first: &RigidTransform) -> Self {
        Self {
            rotation: (self.rotation * first.rotation).normalize(),
            translation: self.apply_point(first.translation),
        }
    }

    pub fn is_identity(&self, tolerance: f32) -> bool {
        self.translation.abs_diff_eq(Vec3::ZERO, tolerance)
            && (self.rotation.abs_diff_eq(Quat::IDENTITY, tolerance)
                || self.rotation.abs_diff_eq(-Quat::IDENTITY, tolerance))
    }

    pub fn is_finite(&self) -> bool {
        self.rotation.is_finite() && self.translation.is_finite()
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Pose> for RigidTransform {
    fn from(pose: Pose) -> Self {
        Self::new(pose.rotation, pose.position)
    }
}
