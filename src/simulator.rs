//! The host-facing simulator.
//!
//! `Simulator` bundles a document parser, an integrator and the model state, and is the
//! type most callers use:
//!
//! ```
//! use reactsim::Simulator;
//!
//! let document = r#"{ "model": {
//!     "compartments": [{ "id": "cell" }],
//!     "species": [{ "id": "A", "compartment": "cell", "initialConcentration": 10.0 }],
//!     "parameters": [{ "id": "k", "value": 0.5 }],
//!     "reactions": [{ "id": "R", "reactants": [{ "species": "A" }], "kineticLaw": "k * A" }]
//! } }"#;
//!
//! let mut sim = Simulator::new();
//! sim.load(document).unwrap();
//! sim.set_variable("k", 0.1).unwrap();
//!
//! let table = sim.simulate_time_course(10.0, 5).unwrap();
//! assert_eq!(table.names(), vec!["time", "A", "k", "cell"]);
//! assert_eq!(table.rows(), 6);
//! ```
//!
//! Every failing operation also stores its message, retrievable with `last_error`.

use std::path::Path;

use rayon::prelude::*;
use tracing::info;

use crate::document::{read_document, DocumentParser, JsonDocumentParser};
use crate::driver;
use crate::errors::{ParseError, SimulatorError};
use crate::integrator::{Dopri5Integrator, Integrator};
use crate::overrides::apply_override;
use crate::state::ModelState;
use crate::table::{build_table, TrajectoryTable};
use crate::types::VariableMap;

/// Loads reaction-network models, applies overrides and runs time courses.
#[derive(Debug, Clone, Default)]
pub struct Simulator<P = JsonDocumentParser, I = Dopri5Integrator> {
    parser: P,
    integrator: I,
    state: ModelState,
    last_error: Option<String>,
}

impl Simulator {
    /// A simulator with the JSON parser and the Dormand-Prince integrator.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: DocumentParser, I: Integrator> Simulator<P, I> {
    pub fn with_collaborators(parser: P, integrator: I) -> Self {
        Self {
            parser,
            integrator,
            state: ModelState::new(),
            last_error: None,
        }
    }

    fn record<T>(&mut self, result: Result<T, SimulatorError>) -> Result<T, SimulatorError> {
        if let Err(err) = &result {
            self.last_error = Some(err.to_string());
        }
        result
    }

    /// Loads a model document, replacing the current model only on success.
    pub fn load(&mut self, text: &str) -> Result<(), SimulatorError> {
        let result = self.state.load(&self.parser, text);
        self.record(result)
    }

    /// Reads and loads a model document from disk.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), SimulatorError> {
        let result = match read_document(path.as_ref()) {
            Ok(text) => self.state.load(&self.parser, &text),
            Err(diagnostic) => {
                Err(ParseError::new(diagnostic.code.category(), diagnostic.to_string()).into())
            }
        };
        self.record(result)
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    /// Load-time values of the floating species.
    pub fn floating_species(&mut self) -> Result<VariableMap, SimulatorError> {
        let result = self.state.floating_species().cloned();
        self.record(result)
    }

    /// Load-time values of the boundary species.
    pub fn boundary_species(&mut self) -> Result<VariableMap, SimulatorError> {
        let result = self.state.boundary_species().cloned();
        self.record(result)
    }

    /// Load-time values of the parameters.
    pub fn parameters(&mut self) -> Result<VariableMap, SimulatorError> {
        let result = self.state.parameters().cloned();
        self.record(result)
    }

    /// Every species identifier, floating and boundary, in declaration order.
    pub fn species_ids(&mut self) -> Result<Vec<String>, SimulatorError> {
        let result = self
            .state
            .live_model()
            .map(|m| m.species().iter().map(|s| s.id.clone()).collect());
        self.record(result)
    }

    pub fn parameter_ids(&mut self) -> Result<Vec<String>, SimulatorError> {
        let result = self
            .state
            .live_model()
            .map(|m| m.parameters().iter().map(|p| p.id.clone()).collect());
        self.record(result)
    }

    /// Overrides a species initial concentration or a parameter value.
    ///
    /// Unknown identifiers are ignored.
    pub fn set_variable(&mut self, id: &str, value: f64) -> Result<(), SimulatorError> {
        let result = self.state.set_variable(id, value);
        self.record(result)
    }

    /// Restores every species and parameter to its load-time value.
    pub fn reset_variables(&mut self) -> Result<(), SimulatorError> {
        let result = self.state.reset();
        self.record(result)
    }

    /// Simulates the live model over `[0, duration]`, sampled at `points` intervals.
    pub fn simulate_time_course(
        &mut self,
        duration: f64,
        points: usize,
    ) -> Result<TrajectoryTable, SimulatorError> {
        let result = self.run(duration, points);
        self.record(result)
    }

    fn run(&self, duration: f64, points: usize) -> Result<TrajectoryTable, SimulatorError> {
        let model = self.state.live_model()?;
        let raw = driver::simulate_time_course(&self.integrator, model, duration, points)?;
        let table = build_table(raw)?;
        info!(
            rows = table.rows(),
            columns = table.columns().len(),
            "time course finished"
        );
        Ok(table)
    }

    /// Message of the most recent failed operation.
    ///
    /// Successful operations leave it untouched.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl<P: DocumentParser, I: Integrator + Sync> Simulator<P, I> {
    /// Runs one time course per value of `id`, in parallel.
    ///
    /// Each run starts from a copy of the live model with `id` overridden, so neither
    /// the live model nor the snapshot changes. Tables are returned in `values` order.
    pub fn scan(
        &mut self,
        id: &str,
        values: &[f64],
        duration: f64,
        points: usize,
    ) -> Result<Vec<TrajectoryTable>, SimulatorError> {
        let result = self.scan_inner(id, values, duration, points);
        self.record(result)
    }

    fn scan_inner(
        &self,
        id: &str,
        values: &[f64],
        duration: f64,
        points: usize,
    ) -> Result<Vec<TrajectoryTable>, SimulatorError> {
        let base = self.state.live_model()?;
        let integrator = &self.integrator;
        values
            .par_iter()
            .map(|&value| {
                let mut model = base.clone();
                apply_override(&mut model, id, value);
                let raw = driver::simulate_time_course(integrator, &model, duration, points)?;
                build_table(raw)
            })
            .collect()
    }
}
