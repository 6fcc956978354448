//! Integrators.
//!
//! An `Integrator` takes a model and an `IntegrationConfig` and returns a raw trajectory.
//! It signals failure in one of two ways: by returning no result at all, or by returning
//! a trajectory flagged with an error message. The driver maps both onto
//! `SimulatorError::SimulationFailed`.
//!
//! `Dopri5Integrator` is the integrator shipped with the crate. It integrates the
//! floating-species amounts with the Dormand-Prince 5(4) method from `ode_solvers`,
//! holding boundary species, parameters and compartments constant.

use ode_solvers::dop_shared::OutputType;
use ode_solvers::dopri5::Dopri5;
use ode_solvers::System;
use tracing::debug;

use crate::driver::IntegrationConfig;
use crate::model::Model;
use crate::raw::{Layout, RawBlock, RawTrajectory};
use crate::types::State;

/// Relative tolerance used when the configuration leaves it unset.
pub const DEFAULT_RTOL: f64 = 1.0e-6;
/// Absolute tolerance used when the configuration leaves it unset.
pub const DEFAULT_ATOL: f64 = 1.0e-10;
/// Maximum step-growth factor used when the configuration leaves it unset.
pub const DEFAULT_FACMAX: f64 = 10.0;

const SAFETY_FACTOR: f64 = 0.9;
const BETA: f64 = 0.04;
const FACMIN: f64 = 0.2;
/// Lower bound on the step budget; long grids get at least ten steps per sample.
const MIN_STEPS: u32 = 100_000;

/// Produces raw trajectories for a model.
pub trait Integrator {
    /// Runs one time course. `None` means the integrator produced no result.
    fn integrate(&self, model: &Model, config: &IntegrationConfig) -> Option<RawTrajectory>;
}

/// Dormand-Prince 5(4) integrator with dense output at every print interval.
///
/// Samples are taken at `k * print_interval` for `k = 0..=points`.
#[derive(Debug, Clone, Copy)]
pub struct Dopri5Integrator {
    layout: Layout,
    rtol: f64,
    atol: f64,
}

impl Default for Dopri5Integrator {
    fn default() -> Self {
        Self {
            layout: Layout::ColumnMajor,
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
        }
    }
}

impl Dopri5Integrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memory layout of the value blocks in the produced trajectories.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Tolerances used when the configuration does not set its own.
    pub fn with_tolerances(mut self, rtol: f64, atol: f64) -> Self {
        self.rtol = rtol;
        self.atol = atol;
        self
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }
}

/// Right-hand side of the reaction network in amount space.
struct NetworkRhs<'a> {
    model: &'a Model,
    /// Slot vector with the constant entries filled in
    base: Vec<f64>,
    /// Species index of each state component
    floating: Vec<usize>,
    /// State component of each species, `None` for boundary species
    state_index: Vec<Option<usize>>,
    volumes: Vec<f64>,
}

impl<'a> NetworkRhs<'a> {
    fn new(model: &'a Model) -> Self {
        let floating: Vec<usize> = model
            .species()
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.boundary_condition)
            .map(|(i, _)| i)
            .collect();
        let mut state_index = vec![None; model.species().len()];
        for (k, &s) in floating.iter().enumerate() {
            state_index[s] = Some(k);
        }

        Self {
            model,
            base: model.slot_values(),
            floating,
            state_index,
            volumes: (0..model.species().len())
                .map(|i| model.species_volume(i))
                .collect(),
        }
    }

    fn initial_amounts(&self) -> State {
        State::from_iterator(
            self.floating.len(),
            self.floating
                .iter()
                .map(|&s| self.base[s] * self.volumes[s]),
        )
    }

    /// Reported value of every species for a state, as amounts or concentrations.
    fn species_row(&self, y: &State, report_amounts: bool) -> Vec<f64> {
        (0..self.state_index.len())
            .map(|s| {
                let amount = match self.state_index[s] {
                    Some(k) => y[k],
                    None => self.base[s] * self.volumes[s],
                };
                if report_amounts {
                    amount
                } else {
                    amount / self.volumes[s]
                }
            })
            .collect()
    }
}

impl System<f64, State> for NetworkRhs<'_> {
    fn system(&self, _t: f64, y: &State, dy: &mut State) {
        let mut slots = self.base.clone();
        for (k, &s) in self.floating.iter().enumerate() {
            slots[s] = y[k] / self.volumes[s];
        }

        dy.fill(0.0);
        for (r, rate) in self.model.rate_laws().iter().enumerate() {
            let v = rate.eval(&slots);
            for &(s, coefficient) in self.model.net_stoichiometry(r) {
                if let Some(k) = self.state_index[s] {
                    dy[k] += coefficient * v;
                }
            }
        }
    }
}

impl Integrator for Dopri5Integrator {
    fn integrate(&self, model: &Model, config: &IntegrationConfig) -> Option<RawTrajectory> {
        let rhs = NetworkRhs::new(model);
        let y0 = rhs.initial_amounts();
        let samples = config.samples();
        let rtol = config.rtol.unwrap_or(self.rtol);
        let atol = config.atol.unwrap_or(self.atol);
        debug!(?config.method, rtol, atol, samples, "dopri5 time course");

        let states: Vec<State> = if y0.is_empty() {
            vec![y0; samples]
        } else {
            let mut dy0 = State::zeros(y0.len());
            rhs.system(0.0, &y0, &mut dy0);
            if dy0.iter().chain(y0.iter()).any(|v| !v.is_finite()) {
                debug!("initial state or rates are not finite");
                return None;
            }

            // Integrate half an interval past the horizon so the last sample is always
            // strictly inside the dense-output range.
            let x_end = config.duration + 0.5 * config.print_interval;
            let mut states = Vec::with_capacity(samples);
            states.push(y0.clone());
            let max_steps = u32::try_from(samples.saturating_mul(10))
                .unwrap_or(u32::MAX)
                .max(MIN_STEPS);
            // Stiffness detection off; steps never exceed one print interval.
            let mut stepper = Dopri5::from_param(
                NetworkRhs::new(model),
                0.0,
                x_end,
                config.print_interval,
                y0,
                rtol,
                atol,
                SAFETY_FACTOR,
                BETA,
                FACMIN,
                config.facmax.unwrap_or(DEFAULT_FACMAX),
                config.print_interval,
                0.0,
                max_steps,
                u32::MAX,
                OutputType::Dense,
            );
            if let Err(err) = stepper.integrate() {
                return Some(RawTrajectory::failed(err.to_string()));
            }

            let mut outputs = stepper.x_out().iter().zip(stepper.y_out().iter());
            let tolerance = 1.0e-6 * config.print_interval;
            for index in 1..samples {
                let target = config.sample_time(index);
                match outputs.find(|(x, _)| (**x - target).abs() <= tolerance) {
                    Some((_, y)) => states.push(y.clone()),
                    None => {
                        return Some(RawTrajectory::failed(format!(
                            "no dense output at t = {target}"
                        )))
                    }
                }
            }
            states
        };

        if states.iter().any(|y| y.iter().any(|v| !v.is_finite())) {
            debug!("state diverged");
            return None;
        }

        let species_rows: Vec<Vec<f64>> = states
            .iter()
            .map(|y| rhs.species_row(y, config.report_amounts))
            .collect();
        let parameter_row: Vec<f64> = model.parameters().iter().map(|p| p.value).collect();
        let compartment_row: Vec<f64> = model.compartments().iter().map(|c| c.size).collect();

        Some(RawTrajectory::new(
            (0..samples).map(|i| config.sample_time(i)).collect(),
            self.layout,
            RawBlock::from_rows(
                model.species().iter().map(|s| s.id.clone()).collect(),
                &species_rows,
                self.layout,
            ),
            RawBlock::from_rows(
                model.parameters().iter().map(|p| p.id.clone()).collect(),
                &vec![parameter_row; samples],
                self.layout,
            ),
            RawBlock::from_rows(
                model.compartments().iter().map(|c| c.id.clone()).collect(),
                &vec![compartment_row; samples],
                self.layout,
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentParser, JsonDocumentParser};
    use crate::table::build_table;
    use approx::assert_relative_eq;

    const CHAIN: &str = include_str!("../demos/chain.json");

    fn chain() -> Result<Model, Box<dyn std::error::Error>> {
        Ok(JsonDocumentParser
            .parse(CHAIN)
            .model
            .ok_or("chain model did not parse")?)
    }

    #[test]
    fn test_first_order_decay_matches_analytic() -> Result<(), Box<dyn std::error::Error>> {
        let model = chain()?;
        let config = IntegrationConfig::time_course(10.0, 10)?;
        let raw = Dopri5Integrator::new()
            .integrate(&model, &config)
            .ok_or("no result")?;
        let table = build_table(raw)?;

        assert_eq!(table.rows(), 11);
        assert_eq!(table.time()[0], 0.0);
        assert_eq!(table.time()[10], 10.0);

        let a = &table.column("A").ok_or("A missing")?.values;
        for (t, value) in table.time().iter().zip(a) {
            assert_relative_eq!(*value, 10.0 * (-0.35 * t).exp(), max_relative = 1e-4);
        }

        // mass is conserved along the chain
        let b = &table.column("B").ok_or("B missing")?.values;
        let c = &table.column("C").ok_or("C missing")?.values;
        for i in 0..table.rows() {
            assert_relative_eq!(a[i] + b[i] + c[i], 10.0, max_relative = 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_layouts_agree() -> Result<(), Box<dyn std::error::Error>> {
        let model = chain()?;
        let config = IntegrationConfig::time_course(5.0, 20)?;
        let col = Dopri5Integrator::new()
            .with_layout(Layout::ColumnMajor)
            .integrate(&model, &config)
            .ok_or("no result")?;
        let row = Dopri5Integrator::new()
            .with_layout(Layout::RowMajor)
            .integrate(&model, &config)
            .ok_or("no result")?;
        assert_ne!(col.species.values, row.species.values);
        assert_eq!(build_table(col)?, build_table(row)?);
        Ok(())
    }

    #[test]
    fn test_amounts_scale_with_volume() -> Result<(), Box<dyn std::error::Error>> {
        let model = Model::new(
            None,
            vec![crate::model::Compartment::new("big", 4.0)],
            vec![crate::model::Species::new("X", "big", 2.0, true)],
            vec![],
            vec![],
        )
        .map_err(|e| format!("{e:?}"))?;

        let mut config = IntegrationConfig::time_course(1.0, 2)?;
        let raw = Dopri5Integrator::new()
            .integrate(&model, &config)
            .ok_or("no result")?;
        assert_eq!(build_table(raw)?.column("X").map(|c| c.values.clone()), Some(vec![8.0; 3]));

        config.report_amounts = false;
        let raw = Dopri5Integrator::new()
            .integrate(&model, &config)
            .ok_or("no result")?;
        assert_eq!(build_table(raw)?.column("X").map(|c| c.values.clone()), Some(vec![2.0; 3]));
        Ok(())
    }

    #[test]
    fn test_divergence_yields_no_result() -> Result<(), Box<dyn std::error::Error>> {
        let model = Model::new(
            None,
            vec![crate::model::Compartment::new("c", 1.0)],
            vec![crate::model::Species::new("X", "c", 1.0, false)],
            vec![],
            vec![crate::model::Reaction::new("R", "1 / 0").product("X", 1.0)],
        )
        .map_err(|e| format!("{e:?}"))?;

        let config = IntegrationConfig::time_course(1.0, 1)?;
        assert!(Dopri5Integrator::new().integrate(&model, &config).is_none());
        Ok(())
    }

    #[test]
    fn test_long_horizon_reaches_steady_state() -> Result<(), Box<dyn std::error::Error>> {
        let model = crate::testing::scenario_model()?;
        for (duration, points) in [(1.0e5, 1000), (1.0e9, 10)] {
            let config = IntegrationConfig::time_course(duration, points)?;
            let raw = Dopri5Integrator::new()
                .integrate(&model, &config)
                .ok_or("no result")?;
            assert_eq!(raw.error_message(), None);
            let table = build_table(raw)?;
            assert_eq!(table.rows(), points + 1);
            let a = &table.column("A").ok_or("A missing")?.values;
            assert_eq!(a[0], 1.0);
            assert!(a[points].abs() < 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_finite_time_blow_up_is_flagged() -> Result<(), Box<dyn std::error::Error>> {
        let model = Model::new(
            None,
            vec![crate::model::Compartment::new("c", 1.0)],
            vec![crate::model::Species::new("X", "c", 1.0, false)],
            vec![],
            vec![crate::model::Reaction::new("R", "X^2").product("X", 1.0)],
        )
        .map_err(|e| format!("{e:?}"))?;

        let config = IntegrationConfig::time_course(2.0, 4)?;
        let result = Dopri5Integrator::new().integrate(&model, &config);
        assert!(result.map_or(true, |raw| raw.is_error()));
        Ok(())
    }
}
