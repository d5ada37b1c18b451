//! Bogacki-Shampine 3(2) adaptive solver

use nalgebra::DVector;

use super::{ExplicitSolver, Solver, SolverError, SolverStepResult};
use crate::utils::constants::{
    SOL_BETA, SOL_SCALE_MAX, SOL_SCALE_MIN, SOL_TOLERANCE_LTE_ABS, SOL_TOLERANCE_LTE_REL,
};

/// Bogacki-Shampine 3(2) pair adaptive solver
///
/// Four-stage, 3rd order method with an embedded 2nd order error
/// estimate; the underlying method of MATLAB's `ode23`.
///
/// # Characteristics
/// - Order: 3 (propagating) / 2 (embedded)
/// - Stages: 4
/// - Explicit, adaptive timestep
///
/// # Note
/// A good default for piecewise-forced systems: step size between
/// discontinuities is governed by smooth local error, while the hard
/// jumps themselves are handled by forced stops rather than error
/// control, so a moderate-order pair is usually the cheapest choice.
///
/// # References
/// - Bogacki, P., & Shampine, L. F. (1989). "A 3(2) pair of
///   Runge-Kutta formulas". Applied Mathematics Letters, 2(4),
///   321-325.
/// - Shampine, L. F., & Reichelt, M. W. (1997). "The MATLAB ODE
///   Suite". SIAM Journal on Scientific Computing, 18(1), 1-22.
#[derive(Debug, Clone)]
pub struct RKBS32 {
    state: DVector<f64>,
    initial: DVector<f64>,
    anchor: Option<DVector<f64>>,
    slopes: Vec<DVector<f64>>,
    stage: usize,
    tol_abs: f64,
    tol_rel: f64,
    beta: f64,
}

impl RKBS32 {
    /// Create a new RKBS32 solver with default tolerances
    ///
    /// # Arguments
    /// * `initial` - Initial state vector
    pub fn new(initial: DVector<f64>) -> Self {
        Self::with_tolerances(initial, SOL_TOLERANCE_LTE_ABS, SOL_TOLERANCE_LTE_REL)
    }

    /// Create a new RKBS32 solver with custom tolerances
    ///
    /// # Arguments
    /// * `initial` - Initial state vector
    /// * `tol_abs` - Absolute error tolerance
    /// * `tol_rel` - Relative error tolerance
    pub fn with_tolerances(initial: DVector<f64>, tol_abs: f64, tol_rel: f64) -> Self {
        let n = initial.len();
        Self {
            state: initial.clone(),
            initial,
            anchor: None,
            slopes: vec![DVector::zeros(n); 4],
            stage: 0,
            tol_abs,
            tol_rel,
            beta: SOL_BETA,
        }
    }

    /// Compute error norm and timestep scale factor
    fn error_controller(&self, dt: f64) -> (bool, f64, f64) {
        // Coefficients for local truncation error estimate
        // TR = [-5/72, 1/12, 1/9, -1/8]
        let tr = [-5.0 / 72.0, 1.0 / 12.0, 1.0 / 9.0, -1.0 / 8.0];

        // Compute truncation error slope
        let mut error_slope = DVector::zeros(self.state.len());
        for (i, &coef) in tr.iter().enumerate() {
            error_slope += coef * &self.slopes[i];
        }

        // Compute scaling factors (avoid division by zero)
        let scale = self.state.map(|x| self.tol_abs + self.tol_rel * x.abs());

        // Compute scaled error (element-wise)
        let scaled_error = (dt * &error_slope).component_div(&scale).map(|e| e.abs());

        // Error norm (max norm) with lower bound; an empty state vector
        // has zero truncation error
        let error_norm = scaled_error
            .iter()
            .fold(0.0_f64, |acc, &e| acc.max(e))
            .max(1e-16);

        // Determine if error is acceptable
        let success = error_norm <= 1.0;

        // Compute timestep scale factor using the embedded order
        let order = 2;
        let mut timestep_scale = self.beta / error_norm.powf(1.0 / (order as f64 + 1.0));

        // Clip rescale factor to reasonable range
        timestep_scale = timestep_scale.clamp(SOL_SCALE_MIN, SOL_SCALE_MAX);

        (success, error_norm, timestep_scale)
    }
}

impl Solver for RKBS32 {
    fn state(&self) -> &DVector<f64> {
        &self.state
    }

    fn set_state(&mut self, state: DVector<f64>) {
        self.state = state;
    }

    fn buffer(&mut self) {
        self.anchor = Some(self.state.clone());
        self.stage = 0;
    }

    fn revert(&mut self) -> Result<(), SolverError> {
        self.state = self.anchor.take().ok_or(SolverError::EmptyHistory)?;
        self.stage = 0;
        Ok(())
    }

    fn reset(&mut self) {
        self.state = self.initial.clone();
        self.anchor = None;
        self.stage = 0;
    }

    fn order(&self) -> usize {
        3
    }

    fn stages(&self) -> usize {
        4
    }

    fn is_adaptive(&self) -> bool {
        true
    }
}

impl ExplicitSolver for RKBS32 {
    fn step<F>(&mut self, mut f: F, t: f64, dt: f64) -> SolverStepResult
    where
        F: FnMut(&DVector<f64>, f64) -> DVector<f64>,
    {
        let x0 = self
            .anchor
            .as_ref()
            .expect("Must call buffer() before step()");

        // RKBS32 Butcher tableau
        // c (evaluation times) = [0, 1/2, 3/4, 1]
        let c = [0.0, 1.0 / 2.0, 3.0 / 4.0, 1.0];

        // Butcher tableau coefficients (a_ij)
        #[rustfmt::skip]
        let a: [&[f64]; 4] = [
            &[1.0 / 2.0],
            &[0.0, 3.0 / 4.0],
            &[2.0 / 9.0, 1.0 / 3.0, 4.0 / 9.0],
            &[2.0 / 9.0, 1.0 / 3.0, 4.0 / 9.0],
        ];

        // Evaluate slope at current stage
        self.slopes[self.stage] = f(&self.state, t + c[self.stage] * dt);

        if self.stage < 3 {
            // Intermediate stages (the stage-2 row already yields the
            // 3rd order solution; stage 3 evaluates its slope for the
            // embedded error estimate)
            let mut slope_sum = DVector::zeros(x0.len());
            for (i, &coef) in a[self.stage].iter().enumerate() {
                slope_sum += coef * &self.slopes[i];
            }
            self.state = x0 + dt * slope_sum;
            self.stage += 1;

            SolverStepResult::default()
        } else {
            // Final stage - compute error estimate and timestep scale
            let (success, error_norm, scale) = self.error_controller(dt);
            self.stage = 0;

            SolverStepResult {
                success,
                error_norm,
                scale: Some(scale),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rkbs32_properties() {
        let solver = RKBS32::new(DVector::from_vec(vec![1.0]));
        assert_eq!(solver.order(), 3);
        assert_eq!(solver.stages(), 4);
        assert!(solver.is_adaptive());
    }

    #[test]
    fn test_rkbs32_exponential_decay() {
        // dx/dt = -x, x(0) = 1, exact x(t) = exp(-t)
        let mut solver = RKBS32::new(DVector::from_vec(vec![1.0]));
        let dt = 0.05;
        let mut t = 0.0;
        for _ in 0..20 {
            solver.buffer();
            let mut result = SolverStepResult::default();
            for _ in 0..solver.stages() {
                result = solver.step(|x, _t| -x, t, dt);
            }
            assert!(result.success);
            t += dt;
        }
        assert_relative_eq!(solver.state()[0], (-1.0f64).exp(), epsilon = 1e-5);
    }

    #[test]
    fn test_rkbs32_error_scale_is_clamped() {
        let mut solver = RKBS32::with_tolerances(DVector::from_vec(vec![1.0]), 1e-12, 1e-12);
        solver.buffer();
        let mut result = SolverStepResult::default();
        for _ in 0..solver.stages() {
            // Stiff-looking dynamics to force a large error estimate
            result = solver.step(|x, _t| -1e6 * x, 0.0, 0.1);
        }
        assert!(!result.success);
        let scale = result.scale.unwrap();
        assert!((SOL_SCALE_MIN..=SOL_SCALE_MAX).contains(&scale));
    }
}
