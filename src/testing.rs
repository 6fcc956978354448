//! Shared fixtures for unit tests.

use std::sync::Mutex;

use crate::document::{DocumentParser, JsonDocumentParser};
use crate::driver::IntegrationConfig;
use crate::integrator::Integrator;
use crate::model::Model;
use crate::raw::{Layout, RawBlock, RawTrajectory};

/// One compartment `cell`, floating `A = 1`, boundary `B = 2`, parameter `k = 0.5` and
/// a single reaction consuming `A` at rate `k * A`.
pub const SCENARIO: &str = r#"{
  "model": {
    "id": "scenario",
    "compartments": [{ "id": "cell", "size": 1.0 }],
    "species": [
      { "id": "A", "compartment": "cell", "initialConcentration": 1.0 },
      { "id": "B", "compartment": "cell", "initialConcentration": 2.0, "boundaryCondition": true }
    ],
    "parameters": [{ "id": "k", "value": 0.5 }],
    "reactions": [
      { "id": "decay", "reactants": [{ "species": "A" }], "kineticLaw": "k * A" }
    ]
  }
}"#;

/// The scenario document with different initial values.
pub fn scenario_document(a: f64, b: f64, k: f64) -> String {
    SCENARIO
        .replace(
            r#""initialConcentration": 1.0"#,
            &format!(r#""initialConcentration": {a:?}"#),
        )
        .replace(
            r#""initialConcentration": 2.0"#,
            &format!(r#""initialConcentration": {b:?}"#),
        )
        .replace(r#""value": 0.5"#, &format!(r#""value": {k:?}"#))
}

pub fn scenario_model() -> Result<Model, Box<dyn std::error::Error>> {
    Ok(JsonDocumentParser
        .parse(SCENARIO)
        .model
        .ok_or("scenario did not parse")?)
}

/// What a `ScriptedIntegrator` answers with.
#[derive(Debug, Clone)]
pub enum Script {
    /// No result at all
    Nothing,
    /// An error-flagged result with this message
    Fail(String),
    /// The model's current values held constant over the requested grid, row-major
    Echo,
    /// This exact buffer
    Raw(RawTrajectory),
}

/// Integrator double that replays a script and records how it was called.
#[derive(Debug)]
pub struct ScriptedIntegrator {
    script: Script,
    seen: Mutex<Vec<IntegrationConfig>>,
}

impl ScriptedIntegrator {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().map(|s| s.len()).unwrap_or_default()
    }

    pub fn last_config(&self) -> Option<IntegrationConfig> {
        self.seen.lock().ok()?.last().cloned()
    }
}

impl Integrator for ScriptedIntegrator {
    fn integrate(&self, model: &Model, config: &IntegrationConfig) -> Option<RawTrajectory> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(config.clone());
        }
        match &self.script {
            Script::Nothing => None,
            Script::Fail(message) => Some(RawTrajectory::failed(message.clone())),
            Script::Raw(raw) => Some(raw.clone()),
            Script::Echo => {
                let samples = config.samples();
                let species: Vec<f64> = model
                    .species()
                    .iter()
                    .map(|s| s.initial_concentration)
                    .collect();
                let parameters: Vec<f64> = model.parameters().iter().map(|p| p.value).collect();
                let compartments: Vec<f64> = model.compartments().iter().map(|c| c.size).collect();
                Some(RawTrajectory::new(
                    (0..samples).map(|i| config.sample_time(i)).collect(),
                    Layout::RowMajor,
                    RawBlock::from_rows(
                        model.species().iter().map(|s| s.id.clone()).collect(),
                        &vec![species; samples],
                        Layout::RowMajor,
                    ),
                    RawBlock::from_rows(
                        model.parameters().iter().map(|p| p.id.clone()).collect(),
                        &vec![parameters; samples],
                        Layout::RowMajor,
                    ),
                    RawBlock::from_rows(
                        model.compartments().iter().map(|c| c.id.clone()).collect(),
                        &vec![compartments; samples],
                        Layout::RowMajor,
                    ),
                ))
            }
        }
    }
}
