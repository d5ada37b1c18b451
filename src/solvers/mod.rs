//! Numerical integration backends
//!
//! Explicit Runge-Kutta solvers in a buffer/step/revert style: the
//! engine calls [`Solver::buffer`] once per attempted step, then
//! [`ExplicitSolver::step`] once per stage. The final stage of an
//! adaptive method returns the embedded error norm and a clamped
//! timestep scale factor; on rejection the engine calls
//! [`Solver::revert`] and retries with the scaled timestep.

mod rk4;
mod rkbs32;

pub use rk4::RK4;
pub use rkbs32::RKBS32;

use nalgebra::DVector;
use thiserror::Error;

use crate::settings::SolverKind;

/// Solver-related errors
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("timestep {dt} smaller than minimum {dt_min}")]
    TimestepTooSmall { dt: f64, dt_min: f64 },

    #[error("history buffer is empty")]
    EmptyHistory,

    #[error("maximum number of steps ({0}) exceeded")]
    TooManySteps(usize),
}

/// Result of a solver stage
#[derive(Debug, Clone, Copy)]
pub struct SolverStepResult {
    pub success: bool,
    pub error_norm: f64,
    pub scale: Option<f64>,
}

impl Default for SolverStepResult {
    fn default() -> Self {
        Self {
            success: true,
            error_norm: 0.0,
            scale: None,
        }
    }
}

/// Core solver trait for numerical integration
pub trait Solver: Send + Sync {
    /// Current state vector
    fn state(&self) -> &DVector<f64>;

    /// Overwrite the state vector
    fn set_state(&mut self, state: DVector<f64>);

    /// Buffer the current state as the anchor of the next attempted step
    fn buffer(&mut self);

    /// Revert to the buffered anchor state
    fn revert(&mut self) -> Result<(), SolverError>;

    /// Reset solver to its initial state
    fn reset(&mut self);

    /// Order of the method
    fn order(&self) -> usize;

    /// Number of stages per step
    fn stages(&self) -> usize;

    /// Is this an adaptive solver?
    fn is_adaptive(&self) -> bool;
}

/// Explicit solver trait
///
/// `step` advances one stage per call. `f` receives the stage state and
/// the absolute stage time; piecewise-constant forcing makes absolute
/// time meaningful, so no relative offsets are used anywhere.
pub trait ExplicitSolver: Solver {
    fn step<F>(&mut self, f: F, t: f64, dt: f64) -> SolverStepResult
    where
        F: FnMut(&DVector<f64>, f64) -> DVector<f64>;
}

/// Type-erased solver selection for the engine
#[derive(Debug, Clone)]
pub enum AnySolver {
    RK4(RK4),
    RKBS32(RKBS32),
}

impl AnySolver {
    /// Construct the backend selected by `kind`
    pub fn new(kind: SolverKind, initial: DVector<f64>, tol_abs: f64, tol_rel: f64) -> Self {
        match kind {
            SolverKind::RK4 => AnySolver::RK4(RK4::new(initial)),
            SolverKind::RKBS32 => {
                AnySolver::RKBS32(RKBS32::with_tolerances(initial, tol_abs, tol_rel))
            }
        }
    }

    /// Attempt one full step: buffer the anchor, then run every stage
    pub fn attempt<F>(&mut self, mut f: F, t: f64, dt: f64) -> SolverStepResult
    where
        F: FnMut(&DVector<f64>, f64) -> DVector<f64>,
    {
        match self {
            AnySolver::RK4(s) => {
                s.buffer();
                let mut result = SolverStepResult::default();
                for _ in 0..s.stages() {
                    result = s.step(&mut f, t, dt);
                }
                result
            }
            AnySolver::RKBS32(s) => {
                s.buffer();
                let mut result = SolverStepResult::default();
                for _ in 0..s.stages() {
                    result = s.step(&mut f, t, dt);
                }
                result
            }
        }
    }

    pub fn revert(&mut self) -> Result<(), SolverError> {
        match self {
            AnySolver::RK4(s) => s.revert(),
            AnySolver::RKBS32(s) => s.revert(),
        }
    }

    pub fn state(&self) -> &DVector<f64> {
        match self {
            AnySolver::RK4(s) => s.state(),
            AnySolver::RKBS32(s) => s.state(),
        }
    }

    pub fn set_state(&mut self, state: DVector<f64>) {
        match self {
            AnySolver::RK4(s) => s.set_state(state),
            AnySolver::RKBS32(s) => s.set_state(state),
        }
    }

    pub fn stages(&self) -> usize {
        match self {
            AnySolver::RK4(s) => s.stages(),
            AnySolver::RKBS32(s) => s.stages(),
        }
    }

    pub fn is_adaptive(&self) -> bool {
        match self {
            AnySolver::RK4(s) => s.is_adaptive(),
            AnySolver::RKBS32(s) => s.is_adaptive(),
        }
    }
}
