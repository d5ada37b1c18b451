//! Event slots registered against a system

use crate::variable::Variable;

/// Index of a discrete event in its system's event list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(pub usize);

/// A discrete event registered against a compiled system
///
/// Events created for input variables are placeholders: their schedule
/// is a single fire time of `f64::INFINITY`, so they never fire on
/// their own. They exist purely as slots the injection primitive can
/// record against, which is how a parameter change at an instant ends
/// up in the solution trace.
#[derive(Debug, Clone)]
pub struct DiscreteEvent {
    variable: Variable,
    fire_at: f64,
}

impl DiscreteEvent {
    /// Create a placeholder event bound to `variable`, scheduled at +inf
    pub fn placeholder(variable: Variable) -> Self {
        Self {
            variable,
            fire_at: f64::INFINITY,
        }
    }

    /// The parameter this event records changes of
    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    /// Scheduled fire time (+inf for placeholder events)
    pub fn fire_at(&self) -> f64 {
        self.fire_at
    }

    /// True if this event never fires on its own schedule
    pub fn is_placeholder(&self) -> bool {
        self.fire_at.is_infinite()
    }
}
