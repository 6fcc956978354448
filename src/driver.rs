//! Simulation driver.
//!
//! The driver turns a requested duration and point count into the fixed integration
//! policy, calls the integrator once against the live model and classifies what comes
//! back. The policy is not caller-tunable:
//!
//! - step and print interval are both `duration / points`
//! - species are reported as amounts
//! - the Dormand-Prince 5(4) method with lazy evaluation disabled
//! - tolerances and step-growth limit left to the integrator's defaults

use tracing::debug;

use crate::errors::SimulatorError;
use crate::integrator::Integrator;
use crate::model::Model;
use crate::raw::RawTrajectory;

/// Integration method requested from the integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Embedded Runge-Kutta 5(4) pair with adaptive step-size control
    #[default]
    DormandPrince5,
}

/// Configuration handed to an integrator for one time-course run.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationConfig {
    pub duration: f64,
    /// Number of intervals; the run yields `points + 1` samples including t = 0
    pub points: usize,
    pub step: f64,
    pub print_interval: f64,
    pub report_amounts: bool,
    pub method: Method,
    pub lazy: bool,
    /// Absolute tolerance, `None` for the integrator's default
    pub atol: Option<f64>,
    /// Relative tolerance, `None` for the integrator's default
    pub rtol: Option<f64>,
    /// Maximum step-growth factor, `None` for the integrator's default
    pub facmax: Option<f64>,
}

impl IntegrationConfig {
    /// The fixed policy for a run of `duration` sampled at `points` intervals.
    ///
    /// # Errors
    /// Returns `SimulatorError::InvalidHorizon` unless `duration` is finite and positive
    /// and `points >= 1`.
    pub fn time_course(duration: f64, points: usize) -> Result<Self, SimulatorError> {
        if !(duration.is_finite() && duration > 0.0) || points == 0 {
            return Err(SimulatorError::InvalidHorizon { duration, points });
        }
        let step = duration / points as f64;
        Ok(Self {
            duration,
            points,
            step,
            print_interval: step,
            report_amounts: true,
            method: Method::DormandPrince5,
            lazy: false,
            atol: None,
            rtol: None,
            facmax: None,
        })
    }

    /// Time of sample `index`.
    pub fn sample_time(&self, index: usize) -> f64 {
        index as f64 * self.print_interval
    }

    /// Number of samples the run yields.
    pub fn samples(&self) -> usize {
        self.points + 1
    }
}

/// Runs one time course of `model` and returns the integrator's raw buffer.
///
/// # Errors
/// - `InvalidHorizon` if the duration or point count violate the preconditions
/// - `SimulationFailed` without message if the integrator returned nothing
/// - `SimulationFailed` with the integrator's text if the result is error-flagged
pub fn simulate_time_course<I: Integrator + ?Sized>(
    integrator: &I,
    model: &Model,
    duration: f64,
    points: usize,
) -> Result<RawTrajectory, SimulatorError> {
    let config = IntegrationConfig::time_course(duration, points)?;
    debug!(?config, "starting time course");

    let raw = integrator
        .integrate(model, &config)
        .ok_or(SimulatorError::SimulationFailed { message: None })?;

    if let Some(message) = raw.error_message() {
        return Err(SimulatorError::SimulationFailed {
            message: Some(message.to_string()),
        });
    }
    Ok(raw)
}
