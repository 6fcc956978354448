/// A dense matrix type a trajectory table can be exported into.
///
/// Rows are samples and columns follow the table's column order, time first. Nested
/// vectors are always available; `ndarray::Array2` and `nalgebra::DMatrix` sit behind
/// the `ndarray` and `nalgebra` features.
///
/// # Examples
///
/// ```rust
/// use reactsim::prelude::*;
///
/// let raw = RawTrajectory::new(
///     vec![0.0, 1.0],
///     Layout::ColumnMajor,
///     RawBlock::new(vec!["A".into()], vec![1.0, 0.5]),
///     RawBlock::default(),
///     RawBlock::default(),
/// );
/// let table = build_table(raw).unwrap();
///
/// let grid: Vec<Vec<f64>> = table.to_matrix();
/// assert_eq!(grid, vec![vec![0.0, 1.0], vec![1.0, 0.5]]);
/// assert_eq!(grid.dims(), (2, 2));
/// ```
pub trait Matrix: Sized {
    /// Builds a matrix from row-major data.
    ///
    /// # Arguments
    /// * `rows` - Number of rows
    /// * `cols` - Number of columns
    /// * `data` - `rows * cols` values, element (i, j) at index `i * cols + j`
    fn from_row_major(rows: usize, cols: usize, data: &[f64]) -> Self;

    /// Returns the dimensions of the matrix as (rows, columns).
    fn dims(&self) -> (usize, usize);
}

impl Matrix for Vec<Vec<f64>> {
    fn from_row_major(rows: usize, cols: usize, data: &[f64]) -> Self {
        (0..rows)
            .map(|i| data[i * cols..(i + 1) * cols].to_vec())
            .collect()
    }

    fn dims(&self) -> (usize, usize) {
        (self.len(), self.first().map_or(0, Vec::len))
    }
}

#[cfg(feature = "ndarray")]
impl Matrix for ndarray::Array2<f64> {
    fn from_row_major(rows: usize, cols: usize, data: &[f64]) -> Self {
        ndarray::Array2::from_shape_fn((rows, cols), |(i, j)| data[i * cols + j])
    }

    fn dims(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
}

#[cfg(feature = "nalgebra")]
impl Matrix for nalgebra::DMatrix<f64> {
    fn from_row_major(rows: usize, cols: usize, data: &[f64]) -> Self {
        nalgebra::DMatrix::from_row_slice(rows, cols, data)
    }

    fn dims(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
}

impl crate::table::TrajectoryTable {
    /// Values of the whole table in row-major order.
    pub fn to_row_major(&self) -> Vec<f64> {
        (0..self.rows())
            .flat_map(|i| self.columns().iter().map(move |c| c.values[i]))
            .collect()
    }

    /// Exports the table as a `rows x columns` matrix.
    pub fn to_matrix<M: Matrix>(&self) -> M {
        M::from_row_major(self.rows(), self.columns().len(), &self.to_row_major())
    }
}
