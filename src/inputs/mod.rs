//! Input-function bundles
//!
//! An [`InputFunctions`] bundle is the compile-time product of declaring
//! input variables on a [`System`](crate::System): three parallel
//! sequences (placeholder events, variables, parameter setters) with
//! identical index correspondence. The bundle holds no per-run state,
//! so one `Arc<InputFunctions>` serves any number of concurrent runs.

mod record;

pub use record::Input;

use crate::events::EventId;
use crate::variable::Variable;

use nalgebra::DVector;

/// Parameter setter bound to a stable slot of the compiled layout
#[derive(Debug, Clone, Copy)]
pub struct Setter {
    slot: usize,
}

impl Setter {
    pub(crate) fn new(slot: usize) -> Self {
        Self { slot }
    }

    /// Write `value` into this setter's slot of a live parameter vector
    pub fn apply(&self, params: &mut DVector<f64>, value: f64) {
        params[self.slot] = value;
    }

    /// The parameter-vector slot this setter writes
    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// Immutable bundle of (event, variable, setter) triples for the
/// declared inputs of one compiled system
///
/// Index `i` refers to the same input variable in all three sequences.
/// Created once by [`System::compile`](crate::System::compile) and
/// shared read-only across runs.
#[derive(Debug, Clone)]
pub struct InputFunctions {
    events: Vec<EventId>,
    variables: Vec<Variable>,
    setters: Vec<Setter>,
}

impl InputFunctions {
    pub(crate) fn new(events: Vec<EventId>, variables: Vec<Variable>, setters: Vec<Setter>) -> Self {
        debug_assert!(events.len() == variables.len() && variables.len() == setters.len());
        Self {
            events,
            variables,
            setters,
        }
    }

    /// Index of `var` among the declared inputs
    ///
    /// Linear scan by symbolic equality; the input list has one entry
    /// per declared input, so it stays small.
    pub fn index_of(&self, var: &Variable) -> Option<usize> {
        self.variables.iter().position(|v| v == var)
    }

    /// Placeholder event of input `i`
    pub fn event(&self, i: usize) -> EventId {
        self.events[i]
    }

    /// Variable of input `i`
    pub fn variable(&self, i: usize) -> &Variable {
        &self.variables[i]
    }

    /// Setter of input `i`
    pub fn setter(&self, i: usize) -> Setter {
        self.setters[i]
    }

    /// All placeholder events, in declaration order
    pub fn events(&self) -> &[EventId] {
        &self.events
    }

    /// All input variables, in declaration order
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// All setters, in declaration order
    pub fn setters(&self) -> &[Setter] {
        &self.setters
    }

    /// Number of declared inputs
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
