//! Run settings types

use serde::{Deserialize, Serialize};

use crate::utils::constants::{
    SIM_STEPS_MAX, SIM_TIMESTEP, SIM_TIMESTEP_MAX, SIM_TIMESTEP_MIN, SOL_TOLERANCE_LTE_ABS,
    SOL_TOLERANCE_LTE_REL,
};

/// Available ODE solvers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverKind {
    /// Classical RK4 (4th order, fixed step)
    RK4,
    /// Bogacki-Shampine 3(2) adaptive pair
    RKBS32,
}

impl Default for SolverKind {
    fn default() -> Self {
        SolverKind::RKBS32
    }
}

impl SolverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolverKind::RK4 => "RK4",
            SolverKind::RKBS32 => "RKBS32",
        }
    }
}

/// Run settings
///
/// `dt` is the initial step proposal; adaptive solvers rescale it
/// between `dt_min` and `dt_max`, and any solver shrinks the final
/// step of an advance to land exactly on the requested stop time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Initial (and, for fixed-step solvers, nominal) timestep
    pub dt: f64,

    /// Minimum timestep before the run fails
    pub dt_min: f64,

    /// Maximum timestep
    pub dt_max: f64,

    /// Absolute tolerance for local truncation error
    pub atol: f64,

    /// Relative tolerance for local truncation error
    pub rtol: f64,

    /// Maximum number of attempted steps per run
    pub max_steps: usize,

    /// ODE solver selection
    pub solver: SolverKind,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dt: SIM_TIMESTEP,
            dt_min: SIM_TIMESTEP_MIN,
            dt_max: SIM_TIMESTEP_MAX,
            atol: SOL_TOLERANCE_LTE_ABS,
            rtol: SOL_TOLERANCE_LTE_REL,
            max_steps: SIM_STEPS_MAX,
            solver: SolverKind::default(),
        }
    }
}
