/// Address of a vertex inside a [`crate::grid::VertexGrid`], as `(col, row)`.
///
/// `col` runs along the grid width (left to right) and `row` along the grid
/// height (top to bottom). A cell is only meaningful for the grid it was
/// taken from.
pub type Cell = (usize, usize);
