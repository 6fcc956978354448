//! Raw trajectory buffers produced by integrators.
//!
//! A `RawTrajectory` is what an `Integrator` hands back: the time column plus one flat
//! value buffer per block (species, parameters, compartments) with the block's column
//! names. How the values inside a block are ordered depends on the integrator and is
//! declared through `Layout`.

/// Memory order of the value buffer of a block with `rows` samples and `cols` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// All samples of column 0, then all samples of column 1, ...
    /// Element `(row, col)` sits at `col * rows + row`.
    #[default]
    ColumnMajor,
    /// Sample 0 of every column, then sample 1 of every column, ...
    /// Element `(row, col)` sits at `row * cols + col`.
    RowMajor,
}

impl std::str::FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "column-major" | "column" | "col" => Ok(Layout::ColumnMajor),
            "row-major" | "row" => Ok(Layout::RowMajor),
            other => Err(format!("unknown layout: {other}")),
        }
    }
}

/// Named columns sharing one flat value buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBlock {
    pub names: Vec<String>,
    pub values: Vec<f64>,
}

impl RawBlock {
    pub fn new(names: Vec<String>, values: Vec<f64>) -> Self {
        Self { names, values }
    }

    /// Builds a block in the given layout from per-row samples.
    pub fn from_rows(names: Vec<String>, rows: &[Vec<f64>], layout: Layout) -> Self {
        let cols = names.len();
        let values = match layout {
            Layout::RowMajor => rows.iter().flatten().copied().collect(),
            Layout::ColumnMajor => (0..cols)
                .flat_map(|col| rows.iter().map(move |row| row[col]))
                .collect(),
        };
        Self { names, values }
    }

    pub fn columns(&self) -> usize {
        self.names.len()
    }
}

/// Integrator output for one time-course run.
///
/// A trajectory flagged with an error message carries no usable samples.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTrajectory {
    pub time_name: String,
    pub time: Vec<f64>,
    pub rows: usize,
    pub layout: Layout,
    pub species: RawBlock,
    pub parameters: RawBlock,
    pub compartments: RawBlock,
    error: Option<String>,
}

impl RawTrajectory {
    pub fn new(
        time: Vec<f64>,
        layout: Layout,
        species: RawBlock,
        parameters: RawBlock,
        compartments: RawBlock,
    ) -> Self {
        Self {
            time_name: "time".to_string(),
            rows: time.len(),
            time,
            layout,
            species,
            parameters,
            compartments,
            error: None,
        }
    }

    /// An error-flagged result carrying the integrator's diagnostic text.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            time_name: "time".to_string(),
            time: Vec::new(),
            rows: 0,
            layout: Layout::default(),
            species: RawBlock::default(),
            parameters: RawBlock::default(),
            compartments: RawBlock::default(),
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Total number of value columns, time included.
    pub fn columns(&self) -> usize {
        1 + self.species.columns() + self.parameters.columns() + self.compartments.columns()
    }
}
