//! The four-sided outer boundary of a quad mesh and the border projector.

use glam::Vec2;

use crate::{geometry::closest_point_on_segment, mesh::QuadMesh};

/// One of the four straight border edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BorderSide {
    /// `left_start`–`right_start`.
    Top,
    /// `left_end`–`right_end`.
    Bottom,
    /// `left_start`–`left_end`.
    Left,
    /// `right_start`–`right_end`.
    Right,
}

impl BorderSide {
    /// Edges in the order the projector scans them. Ties go to the earlier edge.
    pub const SCAN_ORDER: [BorderSide; 4] = [
        BorderSide::Top,
        BorderSide::Bottom,
        BorderSide::Left,
        BorderSide::Right,
    ];
}

/// Quadrilateral outline of a mesh, given by its four corners.
///
/// The "start" corners bound the top edge and the "end" corners the bottom
/// edge; the left side joins `left_start` to `left_end` and the right side
/// joins `right_start` to `right_end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Border {
    pub left_start: Vec2,
    pub left_end: Vec2,
    pub right_start: Vec2,
    pub right_end: Vec2,
}

impl Border {
    pub fn new(left_start: Vec2, left_end: Vec2, right_start: Vec2, right_end: Vec2) -> Self {
        Self {
            left_start,
            left_end,
            right_start,
            right_end,
        }
    }

    /// Axis-aligned rectangle with `min` at the top-left corner and `max` at
    /// the bottom-right one (y grows downwards, like the mesh rows).
    pub fn rect(min: Vec2, max: Vec2) -> Self {
        Self::new(
            min,
            Vec2::new(min.x, max.y),
            Vec2::new(max.x, min.y),
            max,
        )
    }

    /// Endpoints of one border edge.
    pub fn edge(&self, side: BorderSide) -> (Vec2, Vec2) {
        match side {
            BorderSide::Top => (self.left_start, self.right_start),
            BorderSide::Bottom => (self.left_end, self.right_end),
            BorderSide::Left => (self.left_start, self.left_end),
            BorderSide::Right => (self.right_start, self.right_end),
        }
    }

    /// All four edges in [`BorderSide::SCAN_ORDER`].
    pub fn edges(&self) -> [(Vec2, Vec2); 4] {
        BorderSide::SCAN_ORDER.map(|side| self.edge(side))
    }

    /// Bilinear point inside the quad: `u` runs left to right, `v` top to bottom.
    pub fn point_at(&self, u: f32, v: f32) -> Vec2 {
        let top = self.left_start.lerp(self.right_start, u);
        let bottom = self.left_end.lerp(self.right_end, u);
        top.lerp(bottom, v)
    }

    /// Closest point on any of the four edges, and the edge it lies on.
    ///
    /// Edges are scanned in [`BorderSide::SCAN_ORDER`]; a later edge wins
    /// only if it is strictly closer. Degenerate edges project onto their
    /// start corner.
    pub fn closest_point_with_side(&self, point: Vec2) -> (Vec2, BorderSide) {
        let mut best = (point, BorderSide::Top);
        let mut best_d2 = f32::MAX;
        for side in BorderSide::SCAN_ORDER {
            let (a, b) = self.edge(side);
            let candidate = closest_point_on_segment(a, b, point);
            let d2 = candidate.distance_squared(point);
            if d2 < best_d2 {
                best_d2 = d2;
                best = (candidate, side);
            }
        }
        best
    }

    /// Closest point on any of the four edges.
    #[inline]
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        self.closest_point_with_side(point).0
    }

    /// Euclidean distance from `point` to the border outline.
    pub fn distance(&self, point: Vec2) -> f32 {
        self.closest_point(point).distance(point)
    }
}

/// Snaps `point` onto the nearest of `mesh`'s four border edges.
///
/// Collaborators that edit a mesh interactively use this to keep dragged
/// points on the outline.
pub fn closest_border_point(mesh: &QuadMesh, point: Vec2) -> Vec2 {
    mesh.border.closest_point(point)
}
