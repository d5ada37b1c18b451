//! System description and the input-function compiler
//!
//! A [`System`] collects variable declarations, default values, discrete
//! events, and a dynamics function, then [`System::compile`] freezes it:
//! declared inputs are reclassified as parameters, placeholder events
//! are appended for them, and the state and parameter index layouts are
//! built once. Slots are stable integer offsets from then on; nothing
//! about the compiled description mutates afterwards, which is what
//! makes it cheap to reuse across arbitrarily many runs and datasets.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use nalgebra::DVector;

use crate::error::Error;
use crate::events::{DiscreteEvent, EventId};
use crate::inputs::{InputFunctions, Setter};
use crate::variable::Variable;

/// Dynamics function: f(t, states, params, derivs)
pub type Rhs = Arc<dyn Fn(f64, &States<'_>, &Params<'_>, &mut Derivs<'_>) + Send + Sync>;

/// Index layout mapping variable ids to stable vector slots
///
/// Built once at compile time (arena pattern); lookups are binary
/// searches over an id-sorted table.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    slots: Vec<(u64, usize)>,
}

impl Layout {
    fn build(vars: &[Variable]) -> Self {
        let mut slots: Vec<(u64, usize)> = vars
            .iter()
            .enumerate()
            .map(|(slot, var)| (var.id(), slot))
            .collect();
        slots.sort_unstable_by_key(|&(id, _)| id);
        Self { slots }
    }

    /// Slot of `var`, if it belongs to this layout
    pub fn slot_of(&self, var: &Variable) -> Option<usize> {
        self.slots
            .binary_search_by_key(&var.id(), |&(id, _)| id)
            .ok()
            .map(|i| self.slots[i].1)
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Read-only view of the state vector, indexed by variable handle
pub struct States<'a> {
    layout: &'a Layout,
    values: &'a DVector<f64>,
}

impl States<'_> {
    /// Value of `var`, or `None` if it is not a state of this system
    pub fn try_get(&self, var: &Variable) -> Option<f64> {
        self.layout.slot_of(var).map(|slot| self.values[slot])
    }

    /// Value of `var`
    ///
    /// # Panics
    /// Panics if `var` is not a state of this system.
    pub fn get(&self, var: &Variable) -> f64 {
        match self.try_get(var) {
            Some(v) => v,
            None => panic!("variable `{}` is not a state of this system", var),
        }
    }
}

/// Read-only view of the parameter vector, indexed by variable handle
pub struct Params<'a> {
    layout: &'a Layout,
    values: &'a DVector<f64>,
}

impl Params<'_> {
    /// Value of `var`, or `None` if it is not a parameter of this system
    pub fn try_get(&self, var: &Variable) -> Option<f64> {
        self.layout.slot_of(var).map(|slot| self.values[slot])
    }

    /// Value of `var`
    ///
    /// # Panics
    /// Panics if `var` is not a parameter of this system.
    pub fn get(&self, var: &Variable) -> f64 {
        match self.try_get(var) {
            Some(v) => v,
            None => panic!("variable `{}` is not a parameter of this system", var),
        }
    }
}

/// Write-only view of the derivative vector, indexed by variable handle
pub struct Derivs<'a> {
    layout: &'a Layout,
    values: &'a mut DVector<f64>,
}

impl Derivs<'_> {
    /// Set the derivative of state `var`
    ///
    /// # Panics
    /// Panics if `var` is not a state of this system.
    pub fn set(&mut self, var: &Variable, value: f64) {
        match self.layout.slot_of(var) {
            Some(slot) => self.values[slot] = value,
            None => panic!("variable `{}` is not a state of this system", var),
        }
    }
}

/// A dynamical system description
///
/// Declare unknowns and parameters, provide the dynamics via
/// [`set_rhs`](Self::set_rhs), then call [`compile`](Self::compile)
/// with the list of externally driven inputs. The compiled system
/// carries the resulting [`InputFunctions`] bundle alongside itself,
/// and later stages ([`Problem`](crate::Problem),
/// [`Simulation`](crate::Simulation)) pick the bundle up automatically.
#[derive(Clone)]
pub struct System {
    name: String,
    unknowns: Vec<Variable>,
    parameters: Vec<Variable>,
    defaults: HashMap<Variable, f64>,
    events: Vec<DiscreteEvent>,
    rhs: Option<Rhs>,
    state_layout: Layout,
    param_layout: Layout,
    functions: Option<Arc<InputFunctions>>,
    compiled: bool,
}

impl fmt::Debug for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("System")
            .field("name", &self.name)
            .field("unknowns", &self.unknowns)
            .field("parameters", &self.parameters)
            .field("events", &self.events.len())
            .field("compiled", &self.compiled)
            .finish()
    }
}

impl System {
    /// Create an empty system description
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            unknowns: Vec::new(),
            parameters: Vec::new(),
            defaults: HashMap::new(),
            events: Vec::new(),
            rhs: None,
            state_layout: Layout::default(),
            param_layout: Layout::default(),
            functions: None,
            compiled: false,
        }
    }

    /// Declare an unknown (a state integrated by the solver)
    pub fn unknown(&mut self, name: &str) -> Variable {
        let var = Variable::new(name);
        self.unknowns.push(var.clone());
        var
    }

    /// Declare a parameter
    pub fn parameter(&mut self, name: &str) -> Variable {
        let var = Variable::new(name);
        self.parameters.push(var.clone());
        var
    }

    /// Set the default value of a variable
    pub fn set_default(&mut self, var: &Variable, value: f64) {
        self.defaults.insert(var.clone(), value);
    }

    /// Register a discrete event bound to `var`, returning its id
    ///
    /// Events registered before [`compile`](Self::compile) keep their
    /// ids; input placeholder events are appended after them.
    pub fn add_event(&mut self, var: &Variable) -> EventId {
        let id = EventId(self.events.len());
        self.events.push(DiscreteEvent::placeholder(var.clone()));
        id
    }

    /// Provide the dynamics function f(t, states, params, derivs)
    pub fn set_rhs<F>(&mut self, rhs: F)
    where
        F: Fn(f64, &States<'_>, &Params<'_>, &mut Derivs<'_>) + Send + Sync + 'static,
    {
        self.rhs = Some(Arc::new(rhs));
    }

    fn owns(&self, var: &Variable) -> bool {
        self.unknowns.contains(var) || self.parameters.contains(var)
    }

    /// Compile the system with the given input variables
    ///
    /// Each input that is still an unknown is reclassified as a
    /// parameter (appended after the pre-existing parameters, whose
    /// slots are preserved); inputs without a default get 0.0; one
    /// placeholder event is appended per input; the state and parameter
    /// layouts are rebuilt once. An empty input list compiles the
    /// system unchanged with no bundle attached. Duplicate handles in
    /// the input list are collapsed to their first occurrence.
    ///
    /// # Errors
    /// [`Error::NoDynamics`] if no dynamics function was set, and
    /// [`Error::UnknownVariable`] if an input does not belong to this
    /// system.
    pub fn compile(mut self, inputs: &[Variable]) -> Result<Self, Error> {
        if self.rhs.is_none() {
            return Err(Error::NoDynamics {
                name: self.name.clone(),
            });
        }

        let mut declared: Vec<Variable> = Vec::with_capacity(inputs.len());
        for var in inputs {
            if !self.owns(var) {
                return Err(Error::UnknownVariable {
                    name: var.name().to_string(),
                    system: self.name.clone(),
                });
            }
            if declared.contains(var) {
                continue;
            }
            if let Some(pos) = self.unknowns.iter().position(|u| u == var) {
                // Reclassify: the input is driven externally, not integrated
                self.unknowns.remove(pos);
                self.parameters.push(var.clone());
            }
            self.defaults.entry(var.clone()).or_insert(0.0);
            declared.push(var.clone());
        }

        // Layouts are rebuilt exactly once; slots are stable afterwards
        self.state_layout = Layout::build(&self.unknowns);
        self.param_layout = Layout::build(&self.parameters);

        if declared.is_empty() {
            self.functions = None;
        } else {
            let mut events = Vec::with_capacity(declared.len());
            let mut setters = Vec::with_capacity(declared.len());
            for var in &declared {
                events.push(self.add_event(var));
                let slot = self
                    .param_layout
                    .slot_of(var)
                    .expect("declared input was classified as a parameter");
                setters.push(Setter::new(slot));
            }
            self.functions = Some(Arc::new(InputFunctions::new(events, declared, setters)));
        }

        self.compiled = true;
        Ok(self)
    }

    /// Evaluate the dynamics at (t, y, p)
    pub(crate) fn eval_rhs(&self, t: f64, y: &DVector<f64>, p: &DVector<f64>) -> DVector<f64> {
        let rhs = self
            .rhs
            .as_ref()
            .expect("compiled system must have a dynamics function");
        let mut dydt = DVector::zeros(self.state_layout.len());
        let states = States {
            layout: &self.state_layout,
            values: y,
        };
        let params = Params {
            layout: &self.param_layout,
            values: p,
        };
        let mut derivs = Derivs {
            layout: &self.state_layout,
            values: &mut dydt,
        };
        (**rhs)(t, &states, &params, &mut derivs);
        dydt
    }

    /// Assemble the initial state vector from defaults
    pub(crate) fn initial_state(&self) -> DVector<f64> {
        DVector::from_iterator(
            self.unknowns.len(),
            self.unknowns
                .iter()
                .map(|var| self.defaults.get(var).copied().unwrap_or(0.0)),
        )
    }

    /// Assemble the initial parameter vector from defaults
    pub(crate) fn initial_params(&self) -> DVector<f64> {
        DVector::from_iterator(
            self.parameters.len(),
            self.parameters
                .iter()
                .map(|var| self.defaults.get(var).copied().unwrap_or(0.0)),
        )
    }

    /// System name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unknowns, in state-vector order
    pub fn unknowns(&self) -> &[Variable] {
        &self.unknowns
    }

    /// Parameters, in parameter-vector order
    pub fn parameters(&self) -> &[Variable] {
        &self.parameters
    }

    /// Registered discrete events, in registration order
    pub fn events(&self) -> &[DiscreteEvent] {
        &self.events
    }

    /// Default value of `var`, if one was set or inserted
    pub fn default_of(&self, var: &Variable) -> Option<f64> {
        self.defaults.get(var).copied()
    }

    /// The input-function bundle, if inputs were declared at compile time
    pub fn input_functions(&self) -> Option<&Arc<InputFunctions>> {
        self.functions.as_ref()
    }

    /// State index layout (empty before compilation)
    pub fn state_layout(&self) -> &Layout {
        &self.state_layout
    }

    /// Parameter index layout (empty before compilation)
    pub fn param_layout(&self) -> &Layout {
        &self.param_layout
    }

    pub(crate) fn is_compiled(&self) -> bool {
        self.compiled
    }
}
