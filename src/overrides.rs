//! Variable overrides and reset.
//!
//! Overrides write straight into the live model held by `ModelState`. Identifiers are
//! resolved through the model's variable registry: a species entry changes the
//! species' initial concentration, a parameter entry changes the parameter value.
//! Anything else, unknown identifiers and compartments included, is ignored without
//! an error. Callers are expected to discover valid identifiers through the snapshot
//! getters first.

use tracing::{debug, warn};

use crate::errors::SimulatorError;
use crate::model::{Model, VariableRef};
use crate::state::ModelState;

/// Writes `value` into the species or parameter named `id`.
///
/// Returns whether the identifier resolved to an overridable variable.
pub fn apply_override(model: &mut Model, id: &str, value: f64) -> bool {
    match model.lookup(id) {
        Some(VariableRef::Species(index)) => model.set_species_concentration(index, value),
        Some(VariableRef::Parameter(index)) => model.set_parameter_value(index, value),
        Some(VariableRef::Compartment(_)) | None => false,
    }
}

impl ModelState {
    /// Overrides the value of a species or parameter in the live model.
    pub fn set_variable(&mut self, id: &str, value: f64) -> Result<(), SimulatorError> {
        if !apply_override(self.live_model_mut()?, id, value) {
            debug!(id, "ignoring override of unknown variable");
        }
        Ok(())
    }

    /// Writes every snapshotted value back into the live model.
    pub fn reset(&mut self) -> Result<(), SimulatorError> {
        let (model, snapshot) = self.parts_mut()?;
        for (id, value) in snapshot.entries() {
            if !apply_override(model, id, *value) {
                warn!(id = id.as_str(), "snapshot entry no longer resolves");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::apply_override;
    use crate::document::JsonDocumentParser;
    use crate::errors::SimulatorError;
    use crate::state::ModelState;
    use crate::testing::{scenario_model, SCENARIO};

    fn loaded() -> Result<ModelState, SimulatorError> {
        let mut state = ModelState::new();
        state.load(&JsonDocumentParser, SCENARIO)?;
        Ok(state)
    }

    fn live_values(state: &ModelState) -> Result<Vec<f64>, SimulatorError> {
        let model = state.live_model()?;
        Ok(model
            .species()
            .iter()
            .map(|s| s.initial_concentration)
            .chain(model.parameters().iter().map(|p| p.value))
            .collect())
    }

    #[test]
    fn test_not_loaded() {
        let mut state = ModelState::new();
        assert!(matches!(
            state.set_variable("A", 1.0),
            Err(SimulatorError::NotLoaded)
        ));
        assert!(matches!(state.reset(), Err(SimulatorError::NotLoaded)));
    }

    #[test]
    fn test_override_species_and_parameter() -> Result<(), Box<dyn std::error::Error>> {
        let mut state = loaded()?;
        state.set_variable("A", 5.0)?;
        state.set_variable("B", 8.0)?;
        state.set_variable("k", 1.25)?;
        assert_eq!(live_values(&state)?, vec![5.0, 8.0, 1.25]);
        Ok(())
    }

    #[test]
    fn test_unknown_identifier_is_noop() -> Result<(), Box<dyn std::error::Error>> {
        let mut state = loaded()?;
        let before = live_values(&state)?;
        state.set_variable("does_not_exist", 1.0)?;
        state.set_variable("cell", 42.0)?;
        assert_eq!(live_values(&state)?, before);
        assert_eq!(state.live_model()?.compartments()[0].size, 1.0);
        Ok(())
    }

    #[test]
    fn test_round_trip_reset() -> Result<(), Box<dyn std::error::Error>> {
        let mut state = loaded()?;
        let baseline = live_values(&state)?;

        for (i, x) in [f64::MAX, -3.5, 0.0, 1e-300, 17.0].into_iter().enumerate() {
            state.set_variable("A", x)?;
            state.set_variable("k", x * 2.0)?;
            if i % 2 == 0 {
                state.set_variable("B", -x)?;
            }
            // reads in between must not disturb anything
            let _ = state.floating_species()?;
        }
        assert_ne!(live_values(&state)?, baseline);

        state.reset()?;
        let restored = live_values(&state)?;
        assert_eq!(
            restored.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            baseline.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn test_snapshot_unchanged_by_overrides() -> Result<(), Box<dyn std::error::Error>> {
        let mut state = loaded()?;
        let floating = state.floating_species()?.clone();
        let boundary = state.boundary_species()?.clone();
        let parameters = state.parameters()?.clone();

        for value in [0.1, 2.0, 300.0] {
            state.set_variable("A", value)?;
            state.set_variable("B", value)?;
            state.set_variable("k", value)?;
        }

        assert_eq!(state.floating_species()?, &floating);
        assert_eq!(state.boundary_species()?, &boundary);
        assert_eq!(state.parameters()?, &parameters);
        Ok(())
    }

    #[test]
    fn test_apply_override_reports_resolution() -> Result<(), Box<dyn std::error::Error>> {
        let mut model = scenario_model()?;
        assert!(apply_override(&mut model, "k", 2.0));
        assert!(!apply_override(&mut model, "cell", 2.0));
        assert!(!apply_override(&mut model, "nope", 2.0));
        assert_eq!(model.parameters()[0].value, 2.0);
        Ok(())
    }
}
