//! Model documents and their parsers.
//!
//! A `DocumentParser` turns document text into a `Model`, or into a list of categorized
//! diagnostics when it cannot. The simulator only looks at the diagnostics' codes and
//! severities; everything format specific stays inside the parser.
//!
//! The crate ships `JsonDocumentParser`, which reads a JSON rendition of a reaction
//! network:
//!
//! ```json
//! {
//!   "model": {
//!     "id": "chain",
//!     "compartments": [{ "id": "cell", "size": 1.0 }],
//!     "species": [
//!       { "id": "A", "compartment": "cell", "initialConcentration": 10.0 },
//!       { "id": "B", "compartment": "cell", "initialConcentration": 0.0, "boundaryCondition": true }
//!     ],
//!     "parameters": [{ "id": "k1", "value": 0.35 }],
//!     "reactions": [
//!       {
//!         "id": "J0",
//!         "reactants": [{ "species": "A", "stoichiometry": 1 }],
//!         "products": [{ "species": "B" }],
//!         "kineticLaw": "k1 * A"
//!       }
//!     ]
//!   }
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::errors::{ModelError, ParseCategory};
use crate::model::{Compartment, Model, Parameter, Reaction, Species, SpeciesReference};

/// Severity of a parser diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    /// Whether a diagnostic of this severity fails the load.
    pub fn is_failure(&self) -> bool {
        matches!(self, Severity::Error | Severity::Fatal)
    }
}

/// Classes of problems a parser can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    FileUnreadable,
    FileUnwritable,
    FileOperation,
    NetworkAccess,
    InternalParser,
    UnrecognizedParserCode,
    Transcoder,
    OutOfMemory,
    Unknown,
    /// The text is not a well-formed document
    Syntax,
    /// The document is well formed but describes an inconsistent model
    Structure,
    /// Informational or stylistic remarks
    Note,
}

impl DiagnosticCode {
    /// Maps the code onto the load-failure category reported to callers.
    pub fn category(&self) -> ParseCategory {
        match self {
            DiagnosticCode::FileUnreadable => ParseCategory::DocumentUnreadable,
            DiagnosticCode::FileUnwritable
            | DiagnosticCode::FileOperation
            | DiagnosticCode::NetworkAccess => ParseCategory::DocumentIo,
            DiagnosticCode::InternalParser
            | DiagnosticCode::UnrecognizedParserCode
            | DiagnosticCode::Transcoder => ParseCategory::ParserInternal,
            DiagnosticCode::OutOfMemory => ParseCategory::OutOfMemory,
            DiagnosticCode::Unknown => ParseCategory::Unknown,
            DiagnosticCode::Syntax | DiagnosticCode::Structure | DiagnosticCode::Note => {
                ParseCategory::InvalidDocument
            }
        }
    }
}

/// A single parser finding.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    /// One-based line of the finding, when the parser knows it
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl From<ModelError> for Diagnostic {
    fn from(err: ModelError) -> Self {
        Diagnostic::new(DiagnosticCode::Structure, Severity::Error, err.to_string())
    }
}

/// Result of handing a document to a parser.
///
/// A parser may return a model together with warnings, or no model with one or more
/// error diagnostics. A document that parses cleanly but declares no model yields
/// neither.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub model: Option<Model>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutcome {
    pub fn parsed(model: Model) -> Self {
        Self {
            model: Some(model),
            diagnostics: Vec::new(),
        }
    }

    pub fn failed(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            model: None,
            diagnostics,
        }
    }

    /// First diagnostic with error or fatal severity.
    pub fn first_failure(&self) -> Option<&Diagnostic> {
        self.diagnostics.iter().find(|d| d.severity.is_failure())
    }
}

/// Turns document text into a model.
pub trait DocumentParser {
    fn parse(&self, text: &str) -> ParseOutcome;
}

/// Reads a document from disk, classifying failures as parser diagnostics.
pub fn read_document(path: &Path) -> Result<String, Diagnostic> {
    std::fs::read_to_string(path).map_err(|err| {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                DiagnosticCode::FileUnreadable
            }
            std::io::ErrorKind::OutOfMemory => DiagnosticCode::OutOfMemory,
            _ => DiagnosticCode::FileOperation,
        };
        Diagnostic::new(code, Severity::Fatal, format!("{}: {err}", path.display()))
    })
}

/// Parser for the JSON rendition of a reaction network.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentParser;

impl DocumentParser for JsonDocumentParser {
    fn parse(&self, text: &str) -> ParseOutcome {
        let document: JsonDocument = match serde_json::from_str(text) {
            Ok(document) => document,
            Err(err) => return ParseOutcome::failed(vec![json_diagnostic(&err)]),
        };

        let Some(model) = document.model else {
            return ParseOutcome::default();
        };

        let mut warnings = Vec::new();
        if model.reactions.is_empty() {
            warnings.push(Diagnostic::new(
                DiagnosticCode::Note,
                Severity::Warning,
                "model declares no reactions",
            ));
        }

        match model.into_model() {
            Ok(model) => ParseOutcome {
                model: Some(model),
                diagnostics: warnings,
            },
            Err(problems) => {
                ParseOutcome::failed(problems.into_iter().map(Diagnostic::from).collect())
            }
        }
    }
}

fn json_diagnostic(err: &serde_json::Error) -> Diagnostic {
    let code = match err.classify() {
        serde_json::error::Category::Io => DiagnosticCode::FileOperation,
        serde_json::error::Category::Syntax
        | serde_json::error::Category::Data
        | serde_json::error::Category::Eof => DiagnosticCode::Syntax,
    };
    Diagnostic::new(code, Severity::Fatal, err.to_string()).at_line(err.line())
}

#[derive(Debug, Deserialize)]
struct JsonDocument {
    model: Option<JsonModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonModel {
    id: Option<String>,
    #[serde(default)]
    compartments: Vec<JsonCompartment>,
    #[serde(default)]
    species: Vec<JsonSpecies>,
    #[serde(default)]
    parameters: Vec<JsonParameter>,
    #[serde(default)]
    reactions: Vec<JsonReaction>,
}

#[derive(Debug, Deserialize)]
struct JsonCompartment {
    id: String,
    #[serde(default = "unit")]
    size: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonSpecies {
    id: String,
    compartment: String,
    #[serde(default)]
    initial_concentration: f64,
    #[serde(default)]
    boundary_condition: bool,
}

#[derive(Debug, Deserialize)]
struct JsonParameter {
    id: String,
    #[serde(default)]
    value: f64,
}

#[derive(Debug, Deserialize)]
struct JsonSpeciesReference {
    species: String,
    #[serde(default = "unit")]
    stoichiometry: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonReaction {
    id: String,
    #[serde(default)]
    reactants: Vec<JsonSpeciesReference>,
    #[serde(default)]
    products: Vec<JsonSpeciesReference>,
    kinetic_law: String,
}

fn unit() -> f64 {
    1.0
}

impl JsonModel {
    fn into_model(self) -> Result<Model, Vec<ModelError>> {
        let reference = |r: JsonSpeciesReference| SpeciesReference {
            species: r.species,
            stoichiometry: r.stoichiometry,
        };

        Model::new(
            self.id,
            self.compartments
                .into_iter()
                .map(|c| Compartment::new(c.id, c.size))
                .collect(),
            self.species
                .into_iter()
                .map(|s| {
                    Species::new(
                        s.id,
                        s.compartment,
                        s.initial_concentration,
                        s.boundary_condition,
                    )
                })
                .collect(),
            self.parameters
                .into_iter()
                .map(|p| Parameter::new(p.id, p.value))
                .collect(),
            self.reactions
                .into_iter()
                .map(|r| Reaction {
                    id: r.id,
                    reactants: r.reactants.into_iter().map(reference).collect(),
                    products: r.products.into_iter().map(reference).collect(),
                    kinetic_law: r.kinetic_law,
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN: &str = include_str!("../demos/chain.json");

    #[test]
    fn test_parse_chain() -> Result<(), Box<dyn std::error::Error>> {
        let outcome = JsonDocumentParser.parse(CHAIN);
        assert!(outcome.first_failure().is_none());
        let model = outcome.model.ok_or("model missing")?;

        let species: Vec<&str> = model.species().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(species, vec!["A", "B", "C"]);
        assert_eq!(model.parameters()[1].id, "k2");
        assert_eq!(model.reactions().len(), 2);
        Ok(())
    }

    #[test]
    fn test_syntax_error_is_invalid_document() {
        let outcome = JsonDocumentParser.parse("{ \"model\": ");
        let failure = outcome.first_failure().expect("diagnostic expected");
        assert_eq!(failure.code, DiagnosticCode::Syntax);
        assert_eq!(failure.code.category(), ParseCategory::InvalidDocument);
        assert!(outcome.model.is_none());
    }

    #[test]
    fn test_missing_model_yields_nothing() {
        let outcome = JsonDocumentParser.parse("{}");
        assert!(outcome.model.is_none());
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_structure_problems_are_errors() {
        let text = r#"{
            "model": {
                "compartments": [{ "id": "cell" }],
                "species": [{ "id": "A", "compartment": "cell" }],
                "parameters": [{ "id": "A", "value": 1.0 }],
                "reactions": [{ "id": "R", "reactants": [{ "species": "A" }], "kineticLaw": "q * A" }]
            }
        }"#;
        let outcome = JsonDocumentParser.parse(text);
        assert!(outcome.model.is_none());
        assert!(outcome
            .diagnostics
            .iter()
            .all(|d| d.code == DiagnosticCode::Structure && d.severity == Severity::Error));
        assert_eq!(outcome.diagnostics.len(), 2);
    }

    #[test]
    fn test_warning_does_not_fail() {
        let text = r#"{ "model": { "compartments": [{ "id": "c" }], "parameters": [{ "id": "k" }] } }"#;
        let outcome = JsonDocumentParser.parse(text);
        assert!(outcome.model.is_some());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.first_failure().is_none());
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_document(Path::new("/definitely/not/here.json")).unwrap_err();
        assert_eq!(err.code.category(), ParseCategory::DocumentUnreadable);
        assert_eq!(err.severity, Severity::Fatal);
    }

    #[test]
    fn test_code_categories() {
        assert_eq!(
            DiagnosticCode::NetworkAccess.category(),
            ParseCategory::DocumentIo
        );
        assert_eq!(
            DiagnosticCode::Transcoder.category(),
            ParseCategory::ParserInternal
        );
        assert_eq!(DiagnosticCode::Unknown.category(), ParseCategory::Unknown);
    }
}
