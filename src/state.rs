//! Model state management.
//!
//! `ModelState` owns the live model and the snapshot of its variable values taken when
//! it was loaded. Overrides mutate the live model only; the getters on this type always
//! report the snapshot, so a caller can tell the defaults apart from the values a
//! simulation will actually start from.

use tracing::{info, warn};

use crate::document::{DocumentParser, Severity};
use crate::errors::{ParseError, SimulatorError};
use crate::model::Model;
use crate::types::VariableMap;

/// Variable values captured at load time.
///
/// Partitions keep the model's declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub floating_species: VariableMap,
    pub boundary_species: VariableMap,
    pub parameters: VariableMap,
}

impl Snapshot {
    /// Captures the current values of `model`.
    pub fn capture(model: &Model) -> Self {
        let (boundary, floating): (Vec<_>, Vec<_>) =
            model.species().iter().partition(|s| s.boundary_condition);

        Self {
            floating_species: floating
                .into_iter()
                .map(|s| (s.id.clone(), s.initial_concentration))
                .collect(),
            boundary_species: boundary
                .into_iter()
                .map(|s| (s.id.clone(), s.initial_concentration))
                .collect(),
            parameters: model
                .parameters()
                .iter()
                .map(|p| (p.id.clone(), p.value))
                .collect(),
        }
    }

    /// All snapshotted entries: floating species, boundary species, then parameters.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.floating_species
            .iter()
            .chain(self.boundary_species.iter())
            .chain(self.parameters.iter())
    }
}

#[derive(Debug, Clone)]
struct Loaded {
    model: Model,
    snapshot: Snapshot,
}

/// Holds at most one live model together with its load-time snapshot.
#[derive(Debug, Clone, Default)]
pub struct ModelState {
    loaded: Option<Loaded>,
}

impl ModelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `text` and, on success, replaces the held model and its snapshot.
    ///
    /// The first diagnostic with error or fatal severity decides the failure category.
    /// Warnings are logged and otherwise ignored. On failure the previously held model,
    /// if any, stays loaded and untouched.
    pub fn load<P: DocumentParser + ?Sized>(
        &mut self,
        parser: &P,
        text: &str,
    ) -> Result<(), SimulatorError> {
        let outcome = parser.parse(text);

        if let Some(failure) = outcome.first_failure() {
            return Err(ParseError::new(failure.code.category(), failure.to_string()).into());
        }
        for diagnostic in &outcome.diagnostics {
            if diagnostic.severity == Severity::Warning {
                warn!(%diagnostic, "model document warning");
            }
        }

        let model = outcome.model.ok_or_else(ParseError::no_model)?;
        let snapshot = Snapshot::capture(&model);
        info!(
            model = model.id().unwrap_or("<unnamed>"),
            species = model.species().len(),
            parameters = model.parameters().len(),
            reactions = model.reactions().len(),
            "model loaded"
        );
        self.loaded = Some(Loaded { model, snapshot });
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Load-time values of the floating species.
    pub fn floating_species(&self) -> Result<&VariableMap, SimulatorError> {
        Ok(&self.snapshot()?.floating_species)
    }

    /// Load-time values of the boundary species.
    pub fn boundary_species(&self) -> Result<&VariableMap, SimulatorError> {
        Ok(&self.snapshot()?.boundary_species)
    }

    /// Load-time values of the parameters.
    pub fn parameters(&self) -> Result<&VariableMap, SimulatorError> {
        Ok(&self.snapshot()?.parameters)
    }

    pub fn snapshot(&self) -> Result<&Snapshot, SimulatorError> {
        self.loaded
            .as_ref()
            .map(|l| &l.snapshot)
            .ok_or(SimulatorError::NotLoaded)
    }

    pub fn live_model(&self) -> Result<&Model, SimulatorError> {
        self.loaded
            .as_ref()
            .map(|l| &l.model)
            .ok_or(SimulatorError::NotLoaded)
    }

    pub fn live_model_mut(&mut self) -> Result<&mut Model, SimulatorError> {
        self.loaded
            .as_mut()
            .map(|l| &mut l.model)
            .ok_or(SimulatorError::NotLoaded)
    }

    /// Live model and snapshot together, for resetting one from the other.
    pub(crate) fn parts_mut(&mut self) -> Result<(&mut Model, &Snapshot), SimulatorError> {
        self.loaded
            .as_mut()
            .map(|l| (&mut l.model, &l.snapshot))
            .ok_or(SimulatorError::NotLoaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Diagnostic, DiagnosticCode, JsonDocumentParser, ParseOutcome};
    use crate::errors::ParseCategory;
    use crate::testing::{scenario_document, SCENARIO};

    /// Parser that always reports the configured diagnostics and no model.
    struct Failing(Vec<Diagnostic>);

    impl DocumentParser for Failing {
        fn parse(&self, _text: &str) -> ParseOutcome {
            ParseOutcome::failed(self.0.clone())
        }
    }

    #[test]
    fn test_getters_before_load() {
        let state = ModelState::new();
        assert!(matches!(
            state.floating_species(),
            Err(SimulatorError::NotLoaded)
        ));
        assert!(matches!(
            state.boundary_species(),
            Err(SimulatorError::NotLoaded)
        ));
        assert!(matches!(state.parameters(), Err(SimulatorError::NotLoaded)));
        assert!(matches!(state.live_model(), Err(SimulatorError::NotLoaded)));
    }

    #[test]
    fn test_snapshot_partitions() -> Result<(), Box<dyn std::error::Error>> {
        let mut state = ModelState::new();
        state.load(&JsonDocumentParser, SCENARIO)?;

        let floating: Vec<_> = state.floating_species()?.iter().collect();
        assert_eq!(floating, vec![(&"A".to_string(), &1.0)]);
        let boundary: Vec<_> = state.boundary_species()?.iter().collect();
        assert_eq!(boundary, vec![(&"B".to_string(), &2.0)]);
        let parameters: Vec<_> = state.parameters()?.iter().collect();
        assert_eq!(parameters, vec![(&"k".to_string(), &0.5)]);
        Ok(())
    }

    #[test]
    fn test_snapshot_ignores_live_mutation() -> Result<(), Box<dyn std::error::Error>> {
        let mut state = ModelState::new();
        state.load(&JsonDocumentParser, SCENARIO)?;
        let before = state.snapshot()?.clone();

        state.live_model_mut()?.set_species_concentration(0, 99.0);
        state.live_model_mut()?.set_parameter_value(0, 7.0);

        assert_eq!(state.snapshot()?, &before);
        assert_eq!(state.live_model()?.species()[0].initial_concentration, 99.0);
        Ok(())
    }

    #[test]
    fn test_failed_load_keeps_previous_model() -> Result<(), Box<dyn std::error::Error>> {
        let mut state = ModelState::new();
        state.load(&JsonDocumentParser, SCENARIO)?;
        state.live_model_mut()?.set_parameter_value(0, 3.0);
        let snapshot = state.snapshot()?.clone();

        let result = state.load(&JsonDocumentParser, "not json at all");
        assert!(matches!(
            result,
            Err(SimulatorError::Parse(ParseError {
                category: ParseCategory::InvalidDocument,
                ..
            }))
        ));
        assert_eq!(state.snapshot()?, &snapshot);
        assert_eq!(state.live_model()?.parameters()[0].value, 3.0);
        Ok(())
    }

    #[test]
    fn test_failed_first_load_stays_uninitialized() {
        let mut state = ModelState::new();
        let parser = Failing(vec![Diagnostic::new(
            DiagnosticCode::OutOfMemory,
            Severity::Fatal,
            "arena exhausted",
        )]);
        let result = state.load(&parser, "");
        assert!(matches!(
            result,
            Err(SimulatorError::Parse(ParseError {
                category: ParseCategory::OutOfMemory,
                ..
            }))
        ));
        assert!(!state.is_loaded());
    }

    #[test]
    fn test_first_failure_decides_category() {
        let mut state = ModelState::new();
        let parser = Failing(vec![
            Diagnostic::new(DiagnosticCode::FileUnreadable, Severity::Warning, "ignored"),
            Diagnostic::new(DiagnosticCode::NetworkAccess, Severity::Error, "offline"),
            Diagnostic::new(DiagnosticCode::Unknown, Severity::Fatal, "later"),
        ]);
        let err = state.load(&parser, "").unwrap_err();
        assert_eq!(err.to_string(), "Document operation failed. offline");
    }

    #[test]
    fn test_document_without_model() {
        let mut state = ModelState::new();
        let err = state.load(&JsonDocumentParser, "{}").unwrap_err();
        assert!(matches!(
            err,
            SimulatorError::Parse(ParseError {
                category: ParseCategory::InvalidDocument,
                ..
            })
        ));
    }

    #[test]
    fn test_reload_replaces_snapshot() -> Result<(), Box<dyn std::error::Error>> {
        let mut state = ModelState::new();
        state.load(&JsonDocumentParser, SCENARIO)?;
        state.load(&JsonDocumentParser, &scenario_document(4.0, 3.0, 0.25))?;
        assert_eq!(state.floating_species()?["A"], 4.0);
        assert_eq!(state.boundary_species()?["B"], 3.0);
        assert_eq!(state.parameters()?["k"], 0.25);
        Ok(())
    }
}
