//! Fixed-size 2-D grid of [`PlusSignVertex`] and plus-sign neighborhood
//! lookup.

use std::ops::{Index, IndexMut};

use crate::{
    error::{MeshError, Result},
    types::Cell,
    vertex::PlusSignVertex,
};

/// A `width × height` grid of vertices.
///
/// Storage is column-major: cell `(col, row)` lives at
/// `col * height + row`. Both dimensions are at least 1 and never change
/// after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexGrid {
    width: usize,
    height: usize,
    cells: Vec<PlusSignVertex>,
}

/// The axial neighbors of one cell. Missing sides are `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Neighbors {
    pub left: Option<Cell>,
    pub right: Option<Cell>,
    pub up: Option<Cell>,
    pub down: Option<Cell>,
}

impl Neighbors {
    /// Number of neighbors that exist (0 to 4).
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Existing neighbors in the order left, right, up, down.
    pub fn iter(&self) -> impl Iterator<Item = Cell> {
        [self.left, self.right, self.up, self.down]
            .into_iter()
            .flatten()
    }
}

impl VertexGrid {
    /// Wraps column-major `cells` as a `width × height` grid.
    ///
    /// ### Errors
    /// - [`MeshError::EmptyGrid`] if either dimension is zero.
    /// - [`MeshError::CellCountMismatch`] if `cells.len() != width * height`.
    pub fn new(width: usize, height: usize, cells: Vec<PlusSignVertex>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MeshError::EmptyGrid { width, height });
        }
        let expected = width * height;
        if cells.len() != expected {
            return Err(MeshError::CellCountMismatch {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Builds a grid by calling `f(cell)` for every cell in storage order.
    ///
    /// ### Errors
    /// [`MeshError::EmptyGrid`] if either dimension is zero.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(Cell) -> PlusSignVertex,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MeshError::EmptyGrid { width, height });
        }
        let cells = (0..width)
            .flat_map(|col| (0..height).map(move |row| (col, row)))
            .map(&mut f)
            .collect();
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells, `width * height`.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; kept for symmetry with [`VertexGrid::len`].
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, (col, row): Cell) -> bool {
        col < self.width && row < self.height
    }

    pub fn get(&self, cell: Cell) -> Option<&PlusSignVertex> {
        if self.contains(cell) {
            Some(&self.cells[self.index_of(cell)])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, cell: Cell) -> Option<&mut PlusSignVertex> {
        if self.contains(cell) {
            let i = self.index_of(cell);
            Some(&mut self.cells[i])
        } else {
            None
        }
    }

    /// Like [`VertexGrid::get_mut`], but reports an out-of-range cell as an error.
    pub fn try_get_mut(&mut self, cell: Cell) -> Result<&mut PlusSignVertex> {
        let (width, height) = (self.width, self.height);
        self.get_mut(cell).ok_or(MeshError::IndexOutOfRange {
            col: cell.0,
            row: cell.1,
            width,
            height,
        })
    }

    /// Vertices in storage order.
    pub fn cells(&self) -> &[PlusSignVertex] {
        &self.cells
    }

    /// Iterates `(cell, vertex)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &PlusSignVertex)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, v)| (self.cell_at(i), v))
    }

    /// Iterates mutable vertices in storage order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlusSignVertex> {
        self.cells.iter_mut()
    }

    /// Maps a storage index back to its `(col, row)`.
    #[inline]
    pub fn cell_at(&self, index: usize) -> Cell {
        (index / self.height, index % self.height)
    }

    #[inline]
    fn index_of(&self, (col, row): Cell) -> usize {
        col * self.height + row
    }

    /// Returns the axial neighbors of `cell`.
    ///
    /// A cell has a left neighbor iff `col > 0`, a right neighbor iff
    /// `col < width - 1`, and likewise up/down along the rows.
    pub fn neighbors(&self, (col, row): Cell) -> Neighbors {
        Neighbors {
            left: (col > 0).then(|| (col - 1, row)),
            right: (col + 1 < self.width).then(|| (col + 1, row)),
            up: (row > 0).then(|| (col, row - 1)),
            down: (row + 1 < self.height).then(|| (col, row + 1)),
        }
    }

    /// Builds a grid with the same shape as `self` from cells in storage order.
    ///
    /// ### Panics
    /// Panics if `cells` does not have exactly `self.len()` entries.
    pub(crate) fn with_cells(&self, cells: Vec<PlusSignVertex>) -> Self {
        assert_eq!(cells.len(), self.cells.len(), "grid shape changed");
        Self {
            width: self.width,
            height: self.height,
            cells,
        }
    }
}

impl Index<Cell> for VertexGrid {
    type Output = PlusSignVertex;

    fn index(&self, cell: Cell) -> &Self::Output {
        assert!(self.contains(cell), "cell {cell:?} out of range");
        &self.cells[self.index_of(cell)]
    }
}

impl IndexMut<Cell> for VertexGrid {
    fn index_mut(&mut self, cell: Cell) -> &mut Self::Output {
        assert!(self.contains(cell), "cell {cell:?} out of range");
        let i = self.index_of(cell);
        &mut self.cells[i]
    }
}
