//! Simulation constants and defaults

/// Default simulation timestep
pub const SIM_TIMESTEP: f64 = 0.01;

/// Minimum timestep for adaptive stepping
pub const SIM_TIMESTEP_MIN: f64 = 1e-12;

/// Maximum timestep for adaptive stepping
pub const SIM_TIMESTEP_MAX: f64 = 1.0;

/// Maximum number of attempted steps per run
pub const SIM_STEPS_MAX: usize = 1_000_000;

/// Minimum scale factor for timestep adjustment
pub const SOL_SCALE_MIN: f64 = 0.1;

/// Maximum scale factor for timestep adjustment
pub const SOL_SCALE_MAX: f64 = 10.0;

/// Safety factor for adaptive error control
pub const SOL_BETA: f64 = 0.9;

/// Default absolute tolerance for local truncation error
pub const SOL_TOLERANCE_LTE_ABS: f64 = 1e-8;

/// Default relative tolerance for local truncation error
pub const SOL_TOLERANCE_LTE_REL: f64 = 1e-6;
