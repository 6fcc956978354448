//! Reaction-network time-course simulation.
//!
//! This crate loads a reaction-network model from a document, lets callers override
//! species initial concentrations and parameter values (and reset them to their
//! load-time defaults), and runs deterministic time-course simulations that come back
//! as column-oriented tables. Kinetic laws are parsed with
//! [evalexpr](https://github.com/ISibboI/evalexpr) and integrated with the
//! Dormand-Prince method from [ode_solvers](https://github.com/srenevey/ode-solvers).
//!
//! # Features
//!
//! - Load-time snapshot of floating species, boundary species and parameters
//! - Overrides by identifier, with unknown identifiers ignored
//! - Time-course tables independent of the integrator's buffer layout
//! - Pluggable document parser and integrator
//!
//! # Example
//!
//! ```rust
//! use reactsim::Simulator;
//!
//! let mut sim = Simulator::new();
//! sim.load_file(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/chain.json")).unwrap();
//!
//! // Defaults as loaded: A = 10, B = 0, C = 0
//! assert_eq!(sim.floating_species().unwrap()["A"], 10.0);
//!
//! sim.set_variable("k1", 0.7).unwrap();
//! let table = sim.simulate_time_course(10.0, 20).unwrap();
//! assert_eq!(table.rows(), 21);
//!
//! sim.reset_variables().unwrap();
//! ```

pub use errors::SimulatorError;
pub use simulator::Simulator;
pub use table::TrajectoryTable;

pub mod prelude {
    pub use crate::backends::matrix::Matrix;
    pub use crate::document::{DocumentParser, JsonDocumentParser};
    pub use crate::driver::IntegrationConfig;
    pub use crate::errors::{ParseCategory, ParseError, SimulatorError};
    pub use crate::integrator::{Dopri5Integrator, Integrator};
    pub use crate::model::Model;
    pub use crate::raw::{Layout, RawBlock, RawTrajectory};
    pub use crate::simulator::Simulator;
    pub use crate::table::{build_table, TrajectoryTable};
}

/// Matrix exports of trajectory tables
pub mod backends {
    pub mod matrix;
}
/// Model documents, parser diagnostics and the JSON parser
pub mod document;
/// Fixed integration policy and the time-course driver
pub mod driver;
/// Error types for the various failure modes
pub mod errors;
/// The integrator interface and the Dormand-Prince integrator
pub mod integrator;
/// Kinetic-law parsing and rate expressions
pub mod kinetics;
/// Reaction-network model representation
pub mod model;
pub mod overrides;
/// Raw integrator output
pub mod raw;
pub mod simulator;
/// Live model and load-time snapshot
pub mod state;
pub mod table;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;
