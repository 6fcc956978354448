//! Error types for the reactsim crate.
//!
//! This module defines the failure modes of loading, overriding and simulating a
//! reaction-network model. The main error types are:
//!
//! - `KineticLawError`: Errors while turning a kinetic-law formula into a rate expression
//! - `ParseError`: Errors reported while loading a model document, tagged by category
//! - `SimulatorError`: High-level errors returned by the simulator operations
//!
//! Every error renders a human-readable message through `Display`. The simulator keeps
//! the rendered text of the most recent failure so hosts without structured errors can
//! still ask for it.

use evalexpr::{DefaultNumericTypes, EvalexprError};
use thiserror::Error;

/// Errors that can occur while converting a kinetic-law formula into a rate expression.
#[derive(Error, Debug)]
pub enum KineticLawError {
    /// The formula could not be parsed by evalexpr
    #[error("Failed to parse kinetic law: {0}")]
    Syntax(#[from] EvalexprError<DefaultNumericTypes>),
    /// Error when encountering an operator that has no rate-expression counterpart
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
    /// Error when encountering a function that has no rate-expression counterpart
    #[error("Unsupported function: {0}")]
    UnsupportedFunction(String),
    /// Error when the root node does not have exactly one child
    #[error("Expected single child for root node: {0}")]
    RootNode(String),
    /// Error when a constant is not numeric
    #[error("Expected numeric constant: {0}")]
    ConstOperator(String),
    /// Error when the formula references an identifier the model does not declare
    #[error("Unknown identifier in kinetic law: {0}")]
    UnknownIdentifier(String),
}

/// Structural problems found while assembling a model from its declarations.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The same identifier is declared twice across compartments, species and parameters
    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),
    /// A species lives in a compartment the model does not declare
    #[error("Species {species} references unknown compartment {compartment}")]
    UnknownCompartment { species: String, compartment: String },
    /// A reaction consumes or produces a species the model does not declare
    #[error("Reaction {reaction} references unknown species {species}")]
    UnknownSpecies { reaction: String, species: String },
    /// A reaction's kinetic law cannot be compiled
    #[error("Kinetic law of reaction {reaction}: {source}")]
    KineticLaw {
        reaction: String,
        source: KineticLawError,
    },
}

/// Category of a failed document load.
///
/// The categories mirror the diagnostic classes reported by model-document parsers.
/// Everything that is not one of the explicit infrastructure failures is an
/// `InvalidDocument`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseCategory {
    /// The source could not be located or read
    DocumentUnreadable,
    /// Write, network or other operational failure while parsing
    DocumentIo,
    /// Internal fault of the parser or its transcoder
    ParserInternal,
    /// Resource exhaustion while parsing
    OutOfMemory,
    /// Unclassified parser fault
    Unknown,
    /// Any other error or fatal diagnostic, including a document without a model
    InvalidDocument,
}

impl ParseCategory {
    /// Returns the message shown to users for this category.
    pub fn message(&self) -> &'static str {
        match self {
            ParseCategory::DocumentUnreadable => "File not found.",
            ParseCategory::DocumentIo => "Document operation failed.",
            ParseCategory::ParserInternal => "Internal parser error.",
            ParseCategory::OutOfMemory => "Out of memory.",
            ParseCategory::Unknown => "Unknown error in document.",
            ParseCategory::InvalidDocument => "Invalid model document.",
        }
    }
}

impl std::fmt::Display for ParseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// A failed document load.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{category}{}", .detail.as_ref().map(|d| format!(" {d}")).unwrap_or_default())]
pub struct ParseError {
    /// Category of the first error or fatal diagnostic
    pub category: ParseCategory,
    /// Parser-supplied text describing the failure, if any
    pub detail: Option<String>,
}

impl ParseError {
    pub fn new(category: ParseCategory, detail: impl Into<String>) -> Self {
        Self {
            category,
            detail: Some(detail.into()),
        }
    }

    /// A document that parsed but contains no model definition.
    pub fn no_model() -> Self {
        Self::new(ParseCategory::InvalidDocument, "No model present.")
    }
}

/// High-level errors returned by the simulator operations.
///
/// Parse and simulation failures are recoverable: the operation returns the error and
/// the simulator keeps its previous state. `MalformedResult` signals a broken
/// integrator contract or a defect in the table builder.
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// The model document could not be loaded
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// An operation that needs a model was called before a successful load
    #[error("No model document loaded.")]
    NotLoaded,
    /// The requested time horizon violates `duration > 0` and `points >= 1`
    #[error("Invalid simulation horizon: duration {duration}, points {points}")]
    InvalidHorizon { duration: f64, points: usize },
    /// The integrator returned no result, or a result flagged as an error
    #[error("{}", .message.as_deref().unwrap_or("Simulation failed."))]
    SimulationFailed { message: Option<String> },
    /// The raw trajectory is inconsistent with its own metadata
    #[error("Malformed simulation result: {0}")]
    MalformedResult(String),
}
