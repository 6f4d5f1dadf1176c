use glam::Vec2;

/// One cell of a kite mesh: a vertex together with the summary of its
/// plus-sign stencil arms.
///
/// `arm_length` and `angle` are only written by the full relaxation step
/// ([`crate::relax::full_update`]). Before the first full step both are `0.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlusSignVertex {
    pub position: Vec2,
    /// Fixed vertices keep their position through every step.
    pub should_move: bool,
    /// Average distance to the axial neighbors as of the last full step.
    pub arm_length: f32,
    /// Average signed rotation (radians, counter-clockwise) of the arms
    /// relative to the canonical axial directions, as of the last full step.
    pub angle: f32,
}

impl PlusSignVertex {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            should_move: true,
            arm_length: 0.0,
            angle: 0.0,
        }
    }

    pub fn fixed(position: Vec2) -> Self {
        Self {
            should_move: false,
            ..Self::new(position)
        }
    }
}

impl Default for PlusSignVertex {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}
