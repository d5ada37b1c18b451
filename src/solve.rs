//! Determinate batch driver
//!
//! Converts a batch of time-stamped input records into forced solver
//! stops plus injections, drives one integration across the whole
//! batch, and finalizes the input histories. Forcing a stop at every
//! injection time is what keeps the discontinuities exact: an adaptive
//! solver allowed to step across a jump would blend the before/after
//! values through its interpolation.

use crate::error::Error;
use crate::inputs::Input;
use crate::problem::Problem;
use crate::sim::Simulation;
use crate::solution::Solution;
use crate::variable::Variable;

/// Solve a problem, driving its inputs from the given records
///
/// Every injection time after the span start becomes a forced stop; at
/// each stop the pending injections for that instant are applied before
/// stepping resumes, so the post-jump values propagate forward. Times
/// equal to the span start are written into the initial parameter
/// vector before the run begins (the event mechanism cannot fire at the
/// initial instant). Times beyond the span end can never be reached and
/// are ignored. The trigger comparison is between two copies of the
/// same `f64`: the forced-stop mechanism guarantees exact equality, no
/// epsilon is involved.
///
/// An empty record list on a bundle-free problem is a plain integration
/// run.
///
/// # Errors
/// [`Error::NoInputs`] if records are supplied but the system declared
/// no inputs, [`Error::UnregisteredInput`] for a record targeting an
/// undeclared variable, [`Error::TimeBeforeSpan`] for a record starting
/// before the run, and any solver failure from stepping.
pub fn solve(problem: &Problem, inputs: &[Input]) -> Result<Solution, Error> {
    let functions = problem.input_functions();
    if functions.is_none() && !inputs.is_empty() {
        return Err(Error::NoInputs);
    }
    if let Some(functions) = functions {
        for record in inputs {
            if functions.index_of(record.variable()).is_none() {
                return Err(Error::UnregisteredInput {
                    name: record.variable().name().to_string(),
                });
            }
        }
    }

    let (t0, t_end) = problem.span();
    for record in inputs {
        if let Some(&first) = record.times().first() {
            if first < t0 {
                return Err(Error::TimeBeforeSpan {
                    name: record.variable().name().to_string(),
                    time: first,
                    start: t0,
                });
            }
        }
    }

    let mut sim = Simulation::new(problem);

    // Injections at exactly t0 are applied before any stepping; the
    // rest become (time, variable, value) triples pending on a stop.
    let mut pending: Vec<(f64, &Variable, f64)> = Vec::new();
    for record in inputs {
        for (time, value) in record.iter() {
            if time == t0 {
                sim.set_input(record.variable(), value)?;
            } else if time <= t_end {
                pending.push((time, record.variable(), value));
            }
        }
    }
    // Stable sort: records later in the batch win at a shared instant
    pending.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut stops: Vec<f64> = pending.iter().map(|p| p.0).collect();
    stops.dedup();

    let mut next = 0;
    for &stop in &stops {
        sim.advance_to(stop)?;
        // Injections at this instant complete before it is resolved
        while next < pending.len() && pending[next].0 == stop {
            let (_, var, value) = pending[next];
            sim.set_input(var, value)?;
            next += 1;
        }
    }

    sim.advance_to(t_end)?;
    if functions.is_some() {
        sim.finalize_inputs()?;
    }
    Ok(sim.into_solution())
}
