//! Single-mesh relaxation steps.
//!
//! A step reads the mesh's current grid as a frozen snapshot, computes the
//! next state of every vertex from that snapshot alone, and only then swaps
//! the new grid in. Vertex evaluation order therefore never matters, which
//! is what lets [`simple_step`] and [`full_step`] fan the per-vertex work out
//! over rayon.
//!
//! Two update rules exist:
//!
//! 1. [`simple_update`]: move each vertex to the average of its axial
//!    neighbors.
//! 2. [`full_update`]: the same averaging, plus tracking of the vertex's
//!    mean arm length and arm rotation. At the border, where one side of an
//!    axis is missing, the missing neighbor is extrapolated from the real
//!    neighbor's own arm geometry ([`virtual_neighbor`]).
//!
//! In both rules a vertex with fewer than four neighbors is projected onto
//! the nearest border edge, and a vertex with no neighbors at all stays put.

use glam::Vec2;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::trace;

use crate::{
    border::Border,
    geometry::{DOWN, LEFT, RIGHT, UP, direction, rotate, signed_rotation},
    grid::VertexGrid,
    mesh::QuadMesh,
    types::Cell,
    vertex::PlusSignVertex,
};

/// Number of neighbors of a vertex with a complete plus-sign stencil.
const FULL_STENCIL: u32 = 4;

/// The two step variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Simple,
    Full,
}

impl Step {
    /// Runs this step on one mesh and returns the summed vertex movement.
    pub fn apply(self, mesh: &mut QuadMesh, parallel: bool) -> f32 {
        match self {
            Step::Simple => simple_step(mesh, parallel),
            Step::Full => full_step(mesh, parallel),
        }
    }
}

/// Runs one position-only relaxation step on `mesh`.
///
/// ### Parameters
/// - `mesh` - Mesh to relax; its grid is replaced once all vertices are computed.
/// - `parallel` - Evaluate vertices on the rayon pool (ignored without the
///   `parallel` feature).
///
/// ### Returns
/// The sum over all vertices of the distance each one moved.
pub fn simple_step(mesh: &mut QuadMesh, parallel: bool) -> f32 {
    step_with(mesh, parallel, simple_update)
}

/// Runs one position-and-arm relaxation step on `mesh`.
///
/// Same contract as [`simple_step`], but every movable vertex also gets a
/// fresh `arm_length` and `angle`.
pub fn full_step(mesh: &mut QuadMesh, parallel: bool) -> f32 {
    step_with(mesh, parallel, full_update)
}

/// Computes the next state of one vertex under the simple rule.
///
/// The neighbor average is taken over the left, right, up and down
/// neighbors that exist in `grid`. With all four present the average is the
/// new position; with fewer it is snapped onto `border`. Fixed vertices and
/// vertices without neighbors are returned unchanged. `arm_length` and
/// `angle` are never touched.
///
/// ### Parameters
/// - `grid` - Snapshot of the previous iteration.
/// - `border` - Outline used to pin under-constrained vertices.
/// - `cell` - Vertex to update.
pub fn simple_update(grid: &VertexGrid, border: &Border, cell: Cell) -> PlusSignVertex {
    let vertex = grid[cell];
    if !vertex.should_move {
        return vertex;
    }

    let mut sum = Vec2::ZERO;
    let mut count = 0u32;
    for n in grid.neighbors(cell).iter() {
        sum += grid[n].position;
        count += 1;
    }

    if count == 0 {
        trace!(?cell, "vertex has no neighbors, leaving it in place");
        return vertex;
    }

    let average = sum / count as f32;
    PlusSignVertex {
        position: pin_to_border(border, average, count),
        ..vertex
    }
}

/// Computes the next state of one vertex under the full rule.
///
/// Each axis is handled on its own:
///
/// - both neighbors present: both positions enter the average, and both
///   arms contribute their length and their rotation away from the
///   canonical direction (`-X`/`+X` horizontally, `-Y`/`+Y` vertically);
/// - one neighbor present: a [`virtual_neighbor`] stands in for the missing
///   side in the position average, while the real arm still contributes its
///   length and rotation;
/// - no neighbor: the axis contributes nothing.
///
/// The three sums are divided by the number of contributions. The position
/// is snapped onto `border` when that number is below four; `arm_length`
/// and `angle` are stored as averaged. Fixed vertices and vertices without
/// neighbors are returned unchanged.
pub fn full_update(grid: &VertexGrid, border: &Border, cell: Cell) -> PlusSignVertex {
    let vertex = grid[cell];
    if !vertex.should_move {
        return vertex;
    }

    let n = grid.neighbors(cell);
    let mut acc = ArmAccumulator::new(vertex.position);
    acc.add_axis(grid, n.left, n.right, LEFT, RIGHT);
    acc.add_axis(grid, n.up, n.down, UP, DOWN);

    if acc.count == 0 {
        trace!(?cell, "vertex has no neighbors, leaving it in place");
        return vertex;
    }

    let count = acc.count as f32;
    PlusSignVertex {
        position: pin_to_border(border, acc.position / count, acc.count),
        arm_length: acc.arm_length / count,
        angle: acc.angle / count,
        ..vertex
    }
}

/// Extrapolates the neighbor missing on one side of an axis.
///
/// Starting from the real neighbor `real`, step along `missing_side` (the
/// canonical direction of the absent side) by `real.arm_length`, rotated by
/// `real.angle`. Before the first full step both are zero and the virtual
/// neighbor coincides with `real`.
pub fn virtual_neighbor(real: &PlusSignVertex, missing_side: Vec2) -> Vec2 {
    real.position + rotate(missing_side * real.arm_length, real.angle)
}

fn pin_to_border(border: &Border, average: Vec2, count: u32) -> Vec2 {
    if count < FULL_STENCIL {
        border.closest_point(average)
    } else {
        average
    }
}

/// Running sums for one vertex of the full step.
#[derive(Debug)]
struct ArmAccumulator {
    center: Vec2,
    position: Vec2,
    arm_length: f32,
    angle: f32,
    count: u32,
}

impl ArmAccumulator {
    fn new(center: Vec2) -> Self {
        Self {
            center,
            position: Vec2::ZERO,
            arm_length: 0.0,
            angle: 0.0,
            count: 0,
        }
    }

    /// Adds the length and rotation of the real arm towards `neighbor`.
    fn add_arm(&mut self, neighbor: Vec2, canonical: Vec2) {
        self.arm_length += self.center.distance(neighbor);
        self.angle += signed_rotation(canonical, direction(self.center, neighbor));
    }

    /// Adds one axis; `low`/`high` are the left/right (or up/down) neighbors.
    fn add_axis(
        &mut self,
        grid: &VertexGrid,
        low: Option<Cell>,
        high: Option<Cell>,
        low_dir: Vec2,
        high_dir: Vec2,
    ) {
        match (low, high) {
            (Some(low), Some(high)) => {
                // Interior axis: both real neighbors enter every sum.
                let (low, high) = (grid[low].position, grid[high].position);
                self.position += low;
                self.add_arm(low, low_dir);
                self.position += high;
                self.add_arm(high, high_dir);
                self.count += 2;
            }
            (Some(low), None) => {
                // Only the position comes from the extrapolated neighbor;
                // arm length and rotation use the real arm.
                let low = grid[low];
                self.position += virtual_neighbor(&low, high_dir);
                self.add_arm(low.position, low_dir);
                self.count += 1;
            }
            (None, Some(high)) => {
                let high = grid[high];
                self.position += virtual_neighbor(&high, low_dir);
                self.add_arm(high.position, high_dir);
                self.count += 1;
            }
            // Single row or column: this axis has no stencil.
            (None, None) => {}
        }
    }
}

/// Evaluates `update` for every cell of the mesh's current grid, swaps the
/// result in, and returns the summed movement.
fn step_with<F>(mesh: &mut QuadMesh, parallel: bool, update: F) -> f32
where
    F: Fn(&VertexGrid, &Border, Cell) -> PlusSignVertex + Sync,
{
    let border = mesh.border;
    // Every update reads this snapshot; nothing is written until all are done.
    let grid = mesh.grid();
    let cells = compute_cells(grid, &border, parallel, &update);

    let displacement = grid
        .cells()
        .iter()
        .zip(&cells)
        .map(|(old, new)| old.position.distance(new.position))
        .sum();

    let next = grid.with_cells(cells);
    mesh.replace_grid(next);
    displacement
}

fn compute_cells<F>(
    grid: &VertexGrid,
    border: &Border,
    parallel: bool,
    update: &F,
) -> Vec<PlusSignVertex>
where
    F: Fn(&VertexGrid, &Border, Cell) -> PlusSignVertex + Sync,
{
    #[cfg(feature = "parallel")]
    {
        if parallel {
            return (0..grid.len())
                .into_par_iter()
                .map(|i| update(grid, border, grid.cell_at(i)))
                .collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    (0..grid.len())
        .map(|i| update(grid, border, grid.cell_at(i)))
        .collect()
}
