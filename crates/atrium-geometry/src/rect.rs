//! Axis-aligned rectangles in an anchor's local plane.

use glam::Vec2;

/// Planar extent of an anchor in its local XY plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Lower-left corner
    pub min: Vec2,
    /// Width (x) and height (y)
    pub size: Vec2,
}

impl Rect {
    pub const fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// A rectangle centered on the local origin.
    pub fn centered(size: Vec2) -> Self {
        Self {
            min: -size * 0.5,
            size,
        }
    }

    pub fn from_half_extents(half: Vec2) -> Self {
        Self {
            min: -half,
            size: half * 2.0,
        }
    }

    /// Smallest rectangle containing all points. Empty input gives a zero rect.
    pub fn enclosing(points: &[Vec2]) -> Self {
        match crate::polygon::bounds(points) {
            Some((min, max)) => Self {
                min,
                size: max - min,
            },
            None => Self::default(),
        }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    pub fn half_extents(&self) -> Vec2 {
        self.size * 0.5
    }

    /// Corners counter-clockwise from bottom-left: BL, BR, TR, TL.
    pub fn corners(&self) -> [Vec2; 4] {
        let max = self.max();
        [
            self.min,
            Vec2::new(max.x, self.min.y),
            max,
            Vec2::new(self.min.x, max.y),
        ]
    }

    pub fn bottom_left(&self) -> Vec2 {
        self.min
    }

    pub fn bottom_right(&self) -> Vec2 {
        Vec2::new(self.min.x + self.size.x, self.min.y)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.x <= max.x && point.y >= self.min.y && point.y <= max.y
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.size.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_extents_round_trip() {
        let rect = Rect::from_half_extents(Vec2::new(2.0, 1.5));
        assert_eq!(rect.size, Vec2::new(4.0, 3.0));
        assert_eq!(rect.half_extents(), Vec2::new(2.0, 1.5));
        assert_eq!(rect.center(), Vec2::ZERO);
    }

    #[test]
    fn corners_start_bottom_left() {
        let rect = Rect::centered(Vec2::new(2.0, 2.0));
        let [bl, br, tr, tl] = rect.corners();
        assert_eq!(bl, Vec2::new(-1.0, -1.0));
        assert_eq!(br, Vec2::new(1.0, -1.0));
        assert_eq!(tr, Vec2::new(1.0, 1.0));
        assert_eq!(tl, Vec2::new(-1.0, 1.0));
        assert_eq!(rect.bottom_left(), bl);
        assert_eq!(rect.bottom_right(), br);
    }

    #[test]
    fn enclosing_covers_points() {
        let pts = [Vec2::new(1.0, -1.0), Vec2::new(-3.0, 2.0), Vec2::new(0.0, 0.5)];
        let rect = Rect::enclosing(&pts);
        for p in pts {
            assert!(rect.contains(p));
        }
        assert_eq!(rect.min, Vec2::new(-3.0, -1.0));
        assert_eq!(rect.max(), Vec2::new(1.0, 2.0));
        assert_eq!(Rect::enclosing(&[]), Rect::default());
    }
}
