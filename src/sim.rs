//! Live integration runs
//!
//! A [`Simulation`] owns all per-run mutable state: the solver, the
//! live parameter vector, the recorded trace, and the discrete event
//! histories. The compiled system and its input bundle are shared
//! read-only; concurrent runs (a parameter sweep, say) each construct
//! their own `Simulation` from the same [`Problem`](crate::Problem);
//! never share one live run across threads.

use std::sync::Arc;

use nalgebra::DVector;

use crate::error::Error;
use crate::events::{EventHistory, EventId};
use crate::inputs::InputFunctions;
use crate::problem::Problem;
use crate::settings::Settings;
use crate::solution::{Solution, Stats, Status};
use crate::solvers::{AnySolver, SolverError};
use crate::system::System;
use crate::utils::constants::SOL_SCALE_MIN;
use crate::variable::Variable;

/// A live integration run
pub struct Simulation {
    system: Arc<System>,
    functions: Option<Arc<InputFunctions>>,
    solver: AnySolver,
    t: f64,
    span: (f64, f64),
    params: DVector<f64>,
    dt_next: f64,
    settings: Settings,
    trace_t: Vec<f64>,
    trace_y: Vec<DVector<f64>>,
    trace_dy: Vec<DVector<f64>>,
    histories: Vec<EventHistory>,
    stats: Stats,
}

impl Simulation {
    /// Initialize a run from a problem
    ///
    /// The initial sample (t0, y0, slope) is recorded immediately, so
    /// an injection at t0 lands before any stepping and corrects the
    /// initial slope.
    pub fn new(problem: &Problem) -> Self {
        let system = Arc::clone(problem.system());
        let settings = problem.settings().clone();
        let params = problem.initial_params().clone();
        let y0 = problem.initial_state().clone();
        let (t0, _) = problem.span();

        let solver = AnySolver::new(settings.solver, y0.clone(), settings.atol, settings.rtol);
        let dy0 = system.eval_rhs(t0, &y0, &params);
        let histories = vec![EventHistory::new(); system.events().len()];

        Self {
            functions: problem.input_functions().cloned(),
            solver,
            t: t0,
            span: problem.span(),
            params,
            dt_next: settings.dt,
            settings,
            trace_t: vec![t0],
            trace_y: vec![y0],
            trace_dy: vec![dy0],
            histories,
            stats: Stats {
                nfev: 1,
                ..Stats::default()
            },
            system,
        }
    }

    /// Advance the run to exactly `target`
    ///
    /// The final step is shrunk so the solver lands on `target` with no
    /// roundoff drift; this is the forced-stop primitive the batch
    /// driver relies on for exact trigger times. Adaptive solvers
    /// revert and retry rejected steps with a rescaled timestep.
    ///
    /// # Errors
    /// [`SolverError::TimestepTooSmall`] if error control pushes the
    /// step below the minimum, [`SolverError::TooManySteps`] if the
    /// step budget is exhausted.
    pub fn advance_to(&mut self, target: f64) -> Result<(), Error> {
        while self.t < target {
            let remaining = target - self.t;
            let mut dt = self.dt_next.min(self.settings.dt_max).min(remaining);

            loop {
                if dt < self.settings.dt_min {
                    return Err(SolverError::TimestepTooSmall {
                        dt,
                        dt_min: self.settings.dt_min,
                    }
                    .into());
                }
                if self.stats.nsteps >= self.settings.max_steps {
                    return Err(SolverError::TooManySteps(self.settings.max_steps).into());
                }
                self.stats.nsteps += 1;

                let (system, params, solver) = (&self.system, &self.params, &mut self.solver);
                let f = |y: &DVector<f64>, t: f64| system.eval_rhs(t, y, params);
                let result = solver.attempt(f, self.t, dt);
                self.stats.nfev += self.solver.stages();

                if result.success || !self.solver.is_adaptive() {
                    self.stats.naccpt += 1;
                    // Land exactly on the target when the step reaches it
                    self.t = if self.t + dt >= target {
                        target
                    } else {
                        self.t + dt
                    };
                    let y = self.solver.state().clone();
                    let dy = self.system.eval_rhs(self.t, &y, &self.params);
                    self.stats.nfev += 1;
                    self.trace_t.push(self.t);
                    self.trace_y.push(y);
                    self.trace_dy.push(dy);
                    if let Some(scale) = result.scale {
                        self.dt_next = (dt * scale).clamp(self.settings.dt_min, self.settings.dt_max);
                    }
                    break;
                }

                // Rejected: revert to the anchor and retry smaller
                self.solver.revert()?;
                self.stats.nrejct += 1;
                dt *= result.scale.unwrap_or(SOL_SCALE_MIN);
            }
        }
        Ok(())
    }

    /// Advance to the end of the run span
    pub fn run_to_end(&mut self) -> Result<(), Error> {
        let end = self.span.1;
        self.advance_to(end)
    }

    /// Inject a new value for an input variable at the current instant
    ///
    /// Writes the value into the live parameter vector through the
    /// bundle's setter, records that the variable's placeholder event
    /// fired now, and marks the state externally modified so the stored
    /// slope at the current sample is recomputed from the new value,
    /// so dense output right of the jump uses the post-jump slope.
    /// Takes effect for all subsequent stepping; does not advance time.
    ///
    /// # Errors
    /// [`Error::NoInputs`] if the system declared no inputs,
    /// [`Error::UnregisteredInput`] if `var` was not declared as one.
    pub fn set_input(&mut self, var: &Variable, value: f64) -> Result<(), Error> {
        let functions = self.functions.clone().ok_or(Error::NoInputs)?;
        let i = functions
            .index_of(var)
            .ok_or_else(|| Error::UnregisteredInput {
                name: var.name().to_string(),
            })?;
        functions.setter(i).apply(&mut self.params, value);
        let EventId(event) = functions.event(i);
        self.histories[event].record(self.t, value);
        self.refresh_modified();
        Ok(())
    }

    /// Flush the step history of every input at the current instant
    ///
    /// Must be called once after the last step of an indeterminate run,
    /// before querying input values from the solution; the value set by
    /// the last injection is otherwise missing from the final segment.
    /// Calling it again changes nothing. The batch driver calls this
    /// automatically.
    ///
    /// # Errors
    /// [`Error::NoInputs`] if the system declared no inputs.
    pub fn finalize_inputs(&mut self) -> Result<(), Error> {
        let functions = self.functions.clone().ok_or(Error::NoInputs)?;
        for i in 0..functions.len() {
            let value = self.params[functions.setter(i).slot()];
            let EventId(event) = functions.event(i);
            self.histories[event].record(self.t, value);
        }
        Ok(())
    }

    // The integration state was modified from outside the solver:
    // recompute the slope stored for the current sample from the live
    // parameter values.
    fn refresh_modified(&mut self) {
        if self.trace_t.last() != Some(&self.t) {
            return;
        }
        let Some(y) = self.trace_y.last() else {
            return;
        };
        let dy = self.system.eval_rhs(self.t, y, &self.params);
        self.stats.nfev += 1;
        if let Some(slot) = self.trace_dy.last_mut() {
            *slot = dy;
        }
    }

    /// Current time
    pub fn t(&self) -> f64 {
        self.t
    }

    /// Integration span (start, end)
    pub fn span(&self) -> (f64, f64) {
        self.span
    }

    /// Current state vector
    pub fn state(&self) -> &DVector<f64> {
        self.solver.state()
    }

    /// Current value of a state variable
    pub fn state_of(&self, var: &Variable) -> Option<f64> {
        self.system
            .state_layout()
            .slot_of(var)
            .map(|slot| self.solver.state()[slot])
    }

    /// Current value of a parameter (including inputs)
    pub fn param_of(&self, var: &Variable) -> Option<f64> {
        self.system
            .param_layout()
            .slot_of(var)
            .map(|slot| self.params[slot])
    }

    /// The input-function bundle carried by this run
    pub fn input_functions(&self) -> Option<&Arc<InputFunctions>> {
        self.functions.as_ref()
    }

    /// Statistics so far
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Consume the run and produce its solution trace
    pub fn into_solution(self) -> Solution {
        let status = if self.t >= self.span.1 {
            Status::Completed
        } else {
            Status::Partial
        };
        let inputs = match &self.functions {
            Some(functions) => functions
                .variables()
                .iter()
                .cloned()
                .zip(
                    functions
                        .events()
                        .iter()
                        .map(|&EventId(event)| self.histories[event].clone()),
                )
                .collect(),
            None => Vec::new(),
        };
        Solution::new(
            self.trace_t,
            self.trace_y,
            self.trace_dy,
            inputs,
            self.system.state_layout().clone(),
            self.stats,
            status,
        )
    }
}
