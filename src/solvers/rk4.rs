//! Classical fixed-step Runge-Kutta 4 solver

use nalgebra::DVector;

use super::{ExplicitSolver, Solver, SolverError, SolverStepResult};

/// Classical Runge-Kutta 4th order solver
///
/// Four-stage explicit method with fixed timestep and no embedded
/// error estimate; every step is accepted.
///
/// # Characteristics
/// - Order: 4
/// - Stages: 4
/// - Explicit, fixed timestep
///
/// # References
/// - Hairer, E., Nørsett, S. P., & Wanner, G. (1993). "Solving
///   Ordinary Differential Equations I: Nonstiff Problems". Springer
///   Series in Computational Mathematics, Vol. 8.
#[derive(Debug, Clone)]
pub struct RK4 {
    state: DVector<f64>,
    initial: DVector<f64>,
    anchor: Option<DVector<f64>>,
    slopes: Vec<DVector<f64>>,
    stage: usize,
}

impl RK4 {
    /// Create a new RK4 solver with the given initial state
    ///
    /// # Arguments
    /// * `initial` - Initial state vector
    pub fn new(initial: DVector<f64>) -> Self {
        let n = initial.len();
        Self {
            state: initial.clone(),
            initial,
            anchor: None,
            slopes: vec![DVector::zeros(n); 4],
            stage: 0,
        }
    }
}

impl Solver for RK4 {
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
        4
    }

    fn stages(&self) -> usize {
        4
    }

    fn is_adaptive(&self) -> bool {
        false
    }
}

impl ExplicitSolver for RK4 {
    fn step<F>(&mut self, mut f: F, t: f64, dt: f64) -> SolverStepResult
    where
        F: FnMut(&DVector<f64>, f64) -> DVector<f64>,
    {
        let x0 = self
            .anchor
            .as_ref()
            .expect("Must call buffer() before step()");

        // RK4 Butcher tableau
        // c (evaluation times) = [0, 1/2, 1/2, 1]
        let c = [0.0, 1.0 / 2.0, 1.0 / 2.0, 1.0];

        // Butcher tableau coefficients (a_ij), final row is b
        #[rustfmt::skip]
        let a: [&[f64]; 4] = [
            &[1.0 / 2.0],
            &[0.0, 1.0 / 2.0],
            &[0.0, 0.0, 1.0],
            &[1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
        ];

        // Evaluate slope at current stage
        self.slopes[self.stage] = f(&self.state, t + c[self.stage] * dt);

        // Compute next intermediate state or final state
        let mut slope_sum = DVector::zeros(x0.len());
        for (i, &coef) in a[self.stage].iter().enumerate() {
            slope_sum += coef * &self.slopes[i];
        }
        self.state = x0 + dt * slope_sum;

        if self.stage < 3 {
            self.stage += 1;
        } else {
            self.stage = 0;
        }

        SolverStepResult::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rk4_properties() {
        let solver = RK4::new(DVector::from_vec(vec![1.0]));
        assert_eq!(solver.order(), 4);
        assert_eq!(solver.stages(), 4);
        assert!(!solver.is_adaptive());
    }

    #[test]
    fn test_rk4_exponential_decay() {
        // dx/dt = -x, x(0) = 1, exact x(t) = exp(-t)
        let mut solver = RK4::new(DVector::from_vec(vec![1.0]));
        let dt = 0.1;
        let mut t = 0.0;
        for _ in 0..10 {
            solver.buffer();
            for _ in 0..solver.stages() {
                solver.step(|x, _t| -x, t, dt);
            }
            t += dt;
        }
        assert_relative_eq!(solver.state()[0], (-1.0f64).exp(), epsilon = 1e-6);
    }

    #[test]
    fn test_rk4_revert_restores_anchor() {
        let mut solver = RK4::new(DVector::from_vec(vec![2.0]));
        solver.buffer();
        for _ in 0..solver.stages() {
            solver.step(|x, _t| -x, 0.0, 0.5);
        }
        assert!(solver.state()[0] != 2.0);
        solver.revert().unwrap();
        assert_eq!(solver.state()[0], 2.0);
        assert!(solver.revert().is_err());
    }
}
