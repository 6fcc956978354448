//! Trajectory tables.
//!
//! This module turns a `RawTrajectory` into a `TrajectoryTable`: an ordered list of named
//! columns, time first, then species, parameters and compartments in the order the
//! integrator declared them. Every column holds one value per sampled time point.
//!
//! The only real work is `transpose`, which materializes each column of a block as a
//! contiguous vector whatever the block's memory layout. It is public so the layout
//! handling can be checked on its own.
//!
//! # Example
//!
//! ```
//! use reactsim::raw::{Layout, RawBlock, RawTrajectory};
//! use reactsim::table::build_table;
//!
//! let raw = RawTrajectory::new(
//!     vec![0.0, 1.0],
//!     Layout::RowMajor,
//!     RawBlock::new(vec!["A".into(), "B".into()], vec![1.0, 0.0, 0.5, 0.5]),
//!     RawBlock::new(vec!["k".into()], vec![0.7, 0.7]),
//!     RawBlock::default(),
//! );
//!
//! let table = build_table(raw).unwrap();
//! assert_eq!(table.names(), vec!["time", "A", "B", "k"]);
//! assert_eq!(table.column("B").unwrap().values, vec![0.0, 0.5]);
//! ```

use itertools::Itertools;

use crate::errors::SimulatorError;
use crate::raw::{Layout, RawBlock, RawTrajectory};

/// One named column of a trajectory table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// Column-oriented simulation result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrajectoryTable {
    columns: Vec<Column>,
}

impl TrajectoryTable {
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// The time axis, always the first column.
    pub fn time(&self) -> &[f64] {
        self.columns
            .first()
            .map(|c| c.values.as_slice())
            .unwrap_or_default()
    }

    /// Number of sampled time points.
    pub fn rows(&self) -> usize {
        self.time().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows() == 0
    }

    /// Values of every column at sample `index`, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<f64>> {
        (index < self.rows()).then(|| self.columns.iter().map(|c| c.values[index]).collect())
    }
}

impl std::fmt::Display for TrajectoryTable {
    /// Header line with the column names, then one line per sample.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.names().join(" "))?;
        for i in 0..self.rows() {
            writeln!(
                f,
                "{}",
                self.columns.iter().map(|c| c.values[i]).join(" ")
            )?;
        }
        Ok(())
    }
}

/// Splits a flat block buffer into `cols` contiguous columns of `rows` values each.
///
/// # Errors
/// Returns `SimulatorError::MalformedResult` if `values.len() != rows * cols`.
pub fn transpose(
    values: &[f64],
    rows: usize,
    cols: usize,
    layout: Layout,
) -> Result<Vec<Vec<f64>>, SimulatorError> {
    let expected = rows.checked_mul(cols).ok_or_else(|| {
        SimulatorError::MalformedResult(format!("{rows} rows x {cols} columns overflows"))
    })?;
    if values.len() != expected {
        return Err(SimulatorError::MalformedResult(format!(
            "block holds {} values, expected {rows} rows x {cols} columns",
            values.len()
        )));
    }

    Ok(match layout {
        Layout::ColumnMajor => (0..cols)
            .map(|col| values[col * rows..(col + 1) * rows].to_vec())
            .collect(),
        Layout::RowMajor => (0..cols)
            .map(|col| (0..rows).map(|row| values[row * cols + col]).collect())
            .collect(),
    })
}

fn push_block(
    columns: &mut Vec<Column>,
    block: RawBlock,
    rows: usize,
    layout: Layout,
) -> Result<(), SimulatorError> {
    let data = transpose(&block.values, rows, block.names.len(), layout)?;
    columns.extend(
        block
            .names
            .into_iter()
            .zip(data)
            .map(|(name, values)| Column { name, values }),
    );
    Ok(())
}

/// Builds the trajectory table from a raw integrator buffer, consuming it.
///
/// # Errors
/// Returns `SimulatorError::MalformedResult` when the buffer contradicts its own
/// metadata: the time column length differs from the row count, a block's buffer does
/// not match `names * rows`, or the resulting columns differ in length.
pub fn build_table(raw: RawTrajectory) -> Result<TrajectoryTable, SimulatorError> {
    let rows = raw.rows;
    if raw.time.len() != rows {
        return Err(SimulatorError::MalformedResult(format!(
            "time column holds {} values, expected {rows}",
            raw.time.len()
        )));
    }

    let mut columns = Vec::with_capacity(raw.columns());
    columns.push(Column {
        name: raw.time_name,
        values: raw.time,
    });
    push_block(&mut columns, raw.species, rows, raw.layout)?;
    push_block(&mut columns, raw.parameters, rows, raw.layout)?;
    push_block(&mut columns, raw.compartments, rows, raw.layout)?;

    if let Some(column) = columns.iter().find(|c| c.values.len() != rows) {
        return Err(SimulatorError::MalformedResult(format!(
            "column {} holds {} values, expected {rows}",
            column.name,
            column.values.len()
        )));
    }

    Ok(TrajectoryTable { columns })
}
