//! Closed 2D polygons stored as ordered vertex loops.
//!
//! The closing edge (last → first) is implicit; vertices are never repeated.

use glam::Vec2;

/// Orientation of a closed loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
    /// Zero signed area (collinear or empty)
    Degenerate,
}

/// Shoelace signed area; positive for counter-clockwise loops.
pub fn signed_area(points: &[Vec2]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        twice += a.perp_dot(b);
    }
    twice * 0.5
}

pub fn winding(points: &[Vec2]) -> Winding {
    let area = signed_area(points);
    if area > f32::EPSILON {
        Winding::CounterClockwise
    } else if area < -f32::EPSILON {
        Winding::Clockwise
    } else {
        Winding::Degenerate
    }
}

/// Even-odd point containment. Points exactly on an edge may go either way.
pub fn contains_point(points: &[Vec2], point: Vec2) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let t = (point.y - a.y) / (b.y - a.y);
            if point.x < a.x + t * (b.x - a.x) {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Same vertices, opposite winding.
pub fn reversed(points: &[Vec2]) -> Vec<Vec2> {
    points.iter().rev().copied().collect()
}

/// Component-wise min and max, or `None` for an empty slice.
pub fn bounds(points: &[Vec2]) -> Option<(Vec2, Vec2)> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
    )
}

/// True when no two non-adjacent edges intersect.
pub fn is_simple(points: &[Vec2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let (a1, a2) = (points[i], points[(i + 1) % n]);
        for j in (i + 1)..n {
            // Adjacent edges share a vertex
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let (b1, b2) = (points[j], points[(j + 1) % n]);
            if segments_intersect(a1, a2, b1, b2) {
                return false;
            }
        }
    }
    true
}

/// Whether two loops describe the same outline: equal length and every
/// vertex of `a` lies within `tolerance` of some vertex of `b`.
pub fn outlines_match(a: &[Vec2], b: &[Vec2], tolerance: f32) -> bool {
    a.len() == b.len()
        && !a.is_empty()
        && a.iter()
            .all(|p| b.iter().any(|q| p.distance(*q) <= tolerance))
}

fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let d1 = (q2 - q1).perp_dot(p1 - q1);
    let d2 = (q2 - q1).perp_dot(p2 - q1);
    let d3 = (p2 - p1).perp_dot(q1 - p1);
    let d4 = (p2 - p1).perp_dot(q2 - p1);
    ((d1 > 0.0) != (d2 > 0.0)) && ((d3 > 0.0) != (d4 > 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(-2.0, -2.0),
            Vec2::new(2.0, -2.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(-2.0, 2.0),
        ]
    }

    #[test]
    fn square_area_and_winding() {
        let sq = square();
        assert_eq!(signed_area(&sq), 16.0);
        assert_eq!(winding(&sq), Winding::CounterClockwise);
        assert_eq!(winding(&reversed(&sq)), Winding::Clockwise);
        assert_eq!(winding(&sq[..2]), Winding::Degenerate);
    }

    #[test]
    fn containment() {
        let sq = square();
        assert!(contains_point(&sq, Vec2::ZERO));
        assert!(contains_point(&sq, Vec2::new(1.9, -1.9)));
        assert!(!contains_point(&sq, Vec2::new(2.5, 0.0)));
        assert!(contains_point(&reversed(&sq), Vec2::ZERO));
    }

    #[test]
    fn bow_tie_is_not_simple() {
        let bow = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ];
        assert!(!is_simple(&bow));
        assert!(is_simple(&square()));
    }

    #[test]
    fn outline_match_ignores_start_vertex() {
        let sq = square();
        let mut rotated = sq.clone();
        rotated.rotate_left(2);
        assert!(outlines_match(&sq, &rotated, 1e-4));
        assert!(!outlines_match(&sq, &sq[..3], 1e-4));
    }

    #[test]
    fn bounds_of_empty_is_none() {
        assert!(bounds(&[]).is_none());
        assert_eq!(
            bounds(&square()),
            Some((Vec2::new(-2.0, -2.0), Vec2::new(2.0, 2.0)))
        );
    }
}
