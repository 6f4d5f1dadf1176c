//! Quad meshes: a vertex grid inside a four-cornered border, tagged with the
//! kind of stencil it carries.

use glam::Vec2;
use rand::Rng;

use crate::{
    border::Border,
    error::{MeshError, Result},
    grid::VertexGrid,
    types::Cell,
    vertex::PlusSignVertex,
};

/// Mesh topology tag. Only [`MeshKind::Kite`] meshes are relaxed by the
/// batch drivers; everything else is passed over untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshKind {
    /// Plus-sign stencil mesh handled by the relaxation engine.
    Kite,
    /// Any other mesh kept alongside kite meshes in a collection.
    Other,
}

impl MeshKind {
    /// Whether the relaxation engine applies to meshes of this kind.
    pub fn is_relaxable(self) -> bool {
        matches!(self, MeshKind::Kite)
    }
}

/// A grid of plus-sign vertices bounded by a quadrilateral border.
///
/// The grid shape is fixed at construction. Relaxation replaces the grid
/// contents wholesale; editing helpers change single vertices in place.
#[derive(Clone, Debug)]
pub struct QuadMesh {
    pub kind: MeshKind,
    pub border: Border,
    grid: VertexGrid,
}

impl QuadMesh {
    pub fn new(kind: MeshKind, border: Border, grid: VertexGrid) -> Self {
        Self { kind, border, grid }
    }

    /// Fills a `width × height` grid by bilinear interpolation of the border
    /// corners.
    ///
    /// Vertex `(c, r)` is placed at `border.point_at(c / (width - 1), r / (height - 1))`,
    /// using parameter `0` along a dimension of size 1. Every vertex starts
    /// movable with zero arm length and angle.
    ///
    /// ### Errors
    /// [`MeshError::EmptyGrid`] if either dimension is zero.
    pub fn from_border(kind: MeshKind, border: Border, width: usize, height: usize) -> Result<Self> {
        let param = |i: usize, n: usize| {
            if n > 1 {
                i as f32 / (n - 1) as f32
            } else {
                0.0
            }
        };
        let grid = VertexGrid::from_fn(width, height, |(c, r)| {
            PlusSignVertex::new(border.point_at(param(c, width), param(r, height)))
        })?;
        Ok(Self::new(kind, border, grid))
    }

    pub fn grid(&self) -> &VertexGrid {
        &self.grid
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn vertex(&self, cell: Cell) -> Option<&PlusSignVertex> {
        self.grid.get(cell)
    }

    /// Positions of all vertices as `(cell, position)`, for drawing.
    pub fn positions(&self) -> impl Iterator<Item = (Cell, Vec2)> {
        self.grid.iter().map(|(cell, v)| (cell, v.position))
    }

    /// Moves one vertex.
    pub fn set_position(&mut self, cell: Cell, position: Vec2) -> Result<()> {
        self.grid.try_get_mut(cell)?.position = position;
        Ok(())
    }

    /// Marks one vertex as movable or fixed.
    pub fn set_movable(&mut self, cell: Cell, movable: bool) -> Result<()> {
        self.grid.try_get_mut(cell)?.should_move = movable;
        Ok(())
    }

    /// Fixes every vertex of column `col`.
    pub fn fix_column(&mut self, col: usize) -> Result<()> {
        if col >= self.width() {
            return Err(self.out_of_range((col, 0)));
        }
        for row in 0..self.height() {
            self.grid[(col, row)].should_move = false;
        }
        Ok(())
    }

    /// Fixes every vertex of row `row`.
    pub fn fix_row(&mut self, row: usize) -> Result<()> {
        if row >= self.height() {
            return Err(self.out_of_range((0, row)));
        }
        for col in 0..self.width() {
            self.grid[(col, row)].should_move = false;
        }
        Ok(())
    }

    /// Fixes the four corner vertices.
    pub fn fix_corners(&mut self) {
        let (w, h) = (self.width() - 1, self.height() - 1);
        for cell in [(0, 0), (w, 0), (0, h), (w, h)] {
            self.grid[cell].should_move = false;
        }
    }

    /// Fixes every vertex on the outermost rows and columns.
    pub fn fix_outline(&mut self) {
        let (w, h) = (self.width(), self.height());
        for (cell, v) in (0..w)
            .flat_map(|c| (0..h).map(move |r| (c, r)))
            .zip(self.grid.iter_mut())
        {
            if cell.0 == 0 || cell.1 == 0 || cell.0 == w - 1 || cell.1 == h - 1 {
                v.should_move = false;
            }
        }
    }

    /// Offsets every movable vertex by a uniform random vector in
    /// `[-amount, amount]²`. Non-positive or non-finite amounts leave the
    /// mesh unchanged.
    pub fn jitter(&mut self, amount: f32, rng: &mut impl Rng) {
        // Uniform sampling needs finite bounds.
        if !amount.is_finite() || amount <= 0.0 {
            return;
        }
        for v in self.grid.iter_mut().filter(|v| v.should_move) {
            let dx = rng.random_range(-amount..=amount);
            let dy = rng.random_range(-amount..=amount);
            v.position += Vec2::new(dx, dy);
        }
    }

    /// Swaps in the grid produced by a relaxation step.
    pub(crate) fn replace_grid(&mut self, next: VertexGrid) {
        debug_assert_eq!(
            (next.width(), next.height()),
            (self.width(), self.height()),
            "relaxation must not resize the mesh"
        );
        self.grid = next;
    }

    fn out_of_range(&self, (col, row): Cell) -> MeshError {
        MeshError::IndexOutOfRange {
            col,
            row,
            width: self.width(),
            height: self.height(),
        }
    }
}
