//! Forcing - piecewise-constant external inputs for ODE simulation
//!
//! This crate lets a continuous-time ODE simulation receive externally
//! supplied, piecewise-constant input values without rebuilding the
//! equation system for each new dataset. Declaring input variables at
//! compile time produces a reusable [`InputFunctions`] bundle (one
//! placeholder discrete event and one parameter setter per input) that
//! travels with the system through problem construction and run
//! initialization. Values are then driven in two ways:
//!
//! - **determinate**: all injection times and values are known up
//!   front; [`solve`] turns a batch of [`Input`] records into forced
//!   solver stops plus injections and runs the whole span at once;
//! - **indeterminate**: values are pushed one at a time into a running
//!   [`Simulation`] with [`set_input`](Simulation::set_input), and the
//!   histories are closed off with
//!   [`finalize_inputs`](Simulation::finalize_inputs) at the end.
//!
//! In both modes the solver is forced to land exactly on every
//! injection instant, so the recorded trajectory keeps the jumps sharp
//! instead of smearing them through interpolation.
//!
//! # Example
//!
//! ```
//! use forcing::prelude::*;
//!
//! # fn main() -> Result<(), forcing::Error> {
//! // dy/dt = x, with x driven externally
//! let mut sys = System::new("driven_integrator");
//! let y = sys.unknown("y");
//! let x = sys.unknown("x");
//! {
//!     let (y, x) = (y.clone(), x.clone());
//!     sys.set_rhs(move |_t, _s, p, d| {
//!         d.set(&y, p.get(&x));
//!     });
//! }
//!
//! // Compiling with `x` declared as input reclassifies it as a
//! // parameter and attaches the injection bundle.
//! let sys = sys.compile(std::slice::from_ref(&x))?;
//! let problem = Problem::new(sys, (0.0, 3.0))?;
//!
//! let data = Input::new(x.clone(), vec![1.0, 2.0, 3.0], vec![0.0, 1.0, 2.0])?;
//! let solution = solve(&problem, &[data])?;
//!
//! // x integrated exactly: y(3) = 1 + 2 + 3
//! assert!((solution.value_at(&y, 3.0).unwrap() - 6.0).abs() < 1e-6);
//! assert_eq!(solution.value_at(&x, 1.5), Some(2.0));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod events;
pub mod inputs;
pub mod problem;
pub mod settings;
pub mod sim;
pub mod solution;
pub mod solve;
pub mod solvers;
pub mod system;
pub mod utils;
pub mod variable;

pub use error::Error;
pub use events::{DiscreteEvent, EventHistory, EventId};
pub use inputs::{Input, InputFunctions, Setter};
pub use problem::Problem;
pub use settings::{Settings, SolverKind};
pub use sim::Simulation;
pub use solution::{Solution, Stats, Status};
pub use solve::solve;
pub use system::{Derivs, Params, States, System};
pub use variable::Variable;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::inputs::{Input, InputFunctions};
    pub use crate::problem::Problem;
    pub use crate::settings::{Settings, SolverKind};
    pub use crate::sim::Simulation;
    pub use crate::solution::{Solution, Status};
    pub use crate::solve::solve;
    pub use crate::solvers::*;
    pub use crate::system::System;
    pub use crate::variable::Variable;
}
