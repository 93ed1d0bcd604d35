//! Axis-aligned boxes in an anchor's local frame.

use glam::Vec3;

/// Local-space bounding box of a volume anchor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb3 {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// A box of `size` centered on the local origin.
    pub fn centered(size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: -half,
            max: half,
        }
    }

    /// A Z-up box of `size` whose top face contains the local origin.
    pub fn top_anchored(size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: Vec3::new(-half.x, -half.y, -size.z),
            max: Vec3::new(half.x, half.y, 0.0),
        }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Mirror through the local XY plane (used when converting handedness).
    pub fn mirror_z(&self) -> Self {
        Self {
            min: Vec3::new(self.min.x, self.min.y, -self.max.z),
            max: Vec3::new(self.max.x, self.max.y, -self.min.z),
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_anchored_hangs_below_origin() {
        let b = Aabb3::top_anchored(Vec3::new(2.0, 1.0, 0.8));
        assert_eq!(b.max.z, 0.0);
        assert_eq!(b.min.z, -0.8);
        assert_eq!(b.size(), Vec3::new(2.0, 1.0, 0.8));
        assert!(b.contains(Vec3::new(0.0, 0.0, -0.4)));
        assert!(!b.contains(Vec3::new(0.0, 0.0, 0.1)));
    }

    #[test]
    fn mirror_keeps_size() {
        let b = Aabb3::top_anchored(Vec3::new(1.0, 1.0, 2.0));
        let m = b.mirror_z();
        assert_eq!(m.size(), b.size());
        assert_eq!(m.min.z, 0.0);
        assert_eq!(m.max.z, 2.0);
        assert_eq!(m.mirror_z(), b);
    }
}
