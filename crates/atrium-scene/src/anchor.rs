//! Anchors: labeled spatial objects inside a room.

use atrium_geometry::{is_simple, Aabb3, Pose, Rect};
use glam::{Vec2, Vec3};
use uuid::Uuid;

use crate::label::AnchorLabel;

/// Planar extent of an anchor: its rectangle plus an ordered boundary loop,
/// both in the anchor's local XY plane.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaneBounds {
    pub rect: Rect,
    pub boundary: Vec<Vec2>,
}

impl PlaneBounds {
    pub fn new(rect: Rect, boundary: Vec<Vec2>) -> Self {
        Self { rect, boundary }
    }

    /// A plane whose boundary is the four corners of `rect`.
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            rect,
            boundary: rect.corners().to_vec(),
        }
    }

    /// A plane whose rectangle encloses `boundary`.
    pub fn from_boundary(boundary: Vec<Vec2>) -> Self {
        Self {
            rect: Rect::enclosing(&boundary),
            boundary,
        }
    }

    /// Finite rectangle and a simple boundary loop.
    pub fn is_valid(&self) -> bool {
        self.rect.is_finite()
            && self.boundary.iter().all(|p| p.is_finite())
            && is_simple(&self.boundary)
    }
}

/// A labeled spatial object. Identity is the UUID; everything else can be
/// updated in place.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Anchor {
    pub id: Uuid,
    pub label: AnchorLabel,
    pub pose: Pose,
    pub plane: Option<PlaneBounds>,
    pub volume: Option<Aabb3>,
}

impl Anchor {
    /// A new anchor with a random identity.
    pub fn new(label: AnchorLabel, pose: Pose) -> Self {
        Self::with_id(Uuid::new_v4(), label, pose)
    }

    pub fn with_id(id: Uuid, label: AnchorLabel, pose: Pose) -> Self {
        Self {
            id,
            label,
            pose,
            plane: None,
            volume: None,
        }
    }

    #[must_use]
    pub fn with_plane(mut self, plane: PlaneBounds) -> Self {
        self.plane = Some(plane);
        self
    }

    #[must_use]
    pub fn with_rect(self, rect: Rect) -> Self {
        self.with_plane(PlaneBounds::from_rect(rect))
    }

    #[must_use]
    pub fn with_volume(mut self, volume: Aabb3) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn has_label(&self, label: AnchorLabel) -> bool {
        self.label.intersects(label)
    }

    /// World position of the plane's bottom-left corner.
    pub fn leading_corner(&self) -> Option<Vec3> {
        let rect = self.plane.as_ref()?.rect;
        Some(self.local_to_world(rect.bottom_left()))
    }

    /// World position of the plane's bottom-right corner.
    pub fn trailing_corner(&self) -> Option<Vec3> {
        let rect = self.plane.as_ref()?.rect;
        Some(self.local_to_world(rect.bottom_right()))
    }

    /// Boundary loop transformed to world space.
    pub fn boundary_world(&self) -> Vec<Vec3> {
        self.plane
            .as_ref()
            .map(|plane| {
                plane
                    .boundary
                    .iter()
                    .map(|p| self.local_to_world(*p))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_finite(&self) -> bool {
        self.pose.is_finite()
            && self.volume.map_or(true, |v| v.is_finite())
            && self.plane.as_ref().map_or(true, |p| p.rect.is_finite())
    }

    fn local_to_world(&self, local: Vec2) -> Vec3 {
        self.pose.transform_point(local.extend(0.0))
    }
}
