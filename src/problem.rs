//! Numeric problem construction

use std::sync::Arc;

use nalgebra::DVector;

use crate::error::Error;
use crate::inputs::InputFunctions;
use crate::settings::Settings;
use crate::system::System;
use crate::variable::Variable;

/// A numeric problem: a compiled system plus initial values, the
/// integration span, and run settings
///
/// Construction picks up the system's [`InputFunctions`] bundle
/// automatically when one is present; systems that never declared
/// inputs flow through with no bundle and no extra cost. A `Problem`
/// holds no live state and may be used to start any number of runs.
#[derive(Debug, Clone)]
pub struct Problem {
    system: Arc<System>,
    functions: Option<Arc<InputFunctions>>,
    y0: DVector<f64>,
    p0: DVector<f64>,
    span: (f64, f64),
    settings: Settings,
}

impl Problem {
    /// Build a problem over `span` from a compiled system
    ///
    /// Initial state and parameter vectors are assembled from the
    /// system's defaults; override individual values with
    /// [`with_initial`](Self::with_initial).
    ///
    /// # Errors
    /// [`Error::NotCompiled`] if the system was not compiled, and
    /// [`Error::BadSpan`] if the span is empty, reversed, or not
    /// finite.
    pub fn new(system: impl Into<Arc<System>>, span: (f64, f64)) -> Result<Self, Error> {
        let system = system.into();
        if !system.is_compiled() {
            return Err(Error::NotCompiled {
                name: system.name().to_string(),
            });
        }
        if !(span.1 > span.0) || !span.0.is_finite() || !span.1.is_finite() {
            return Err(Error::BadSpan {
                start: span.0,
                end: span.1,
            });
        }
        let y0 = system.initial_state();
        let p0 = system.initial_params();
        let functions = system.input_functions().cloned();
        Ok(Self {
            system,
            functions,
            y0,
            p0,
            span,
            settings: Settings::default(),
        })
    }

    /// Override the initial value of a state or parameter
    ///
    /// # Errors
    /// [`Error::UnknownVariable`] if `var` belongs to neither layout.
    pub fn with_initial(mut self, var: &Variable, value: f64) -> Result<Self, Error> {
        if let Some(slot) = self.system.state_layout().slot_of(var) {
            self.y0[slot] = value;
        } else if let Some(slot) = self.system.param_layout().slot_of(var) {
            self.p0[slot] = value;
        } else {
            return Err(Error::UnknownVariable {
                name: var.name().to_string(),
                system: self.system.name().to_string(),
            });
        }
        Ok(self)
    }

    /// Replace the run settings
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// The compiled system
    pub fn system(&self) -> &Arc<System> {
        &self.system
    }

    /// The input-function bundle, if the system declared inputs
    pub fn input_functions(&self) -> Option<&Arc<InputFunctions>> {
        self.functions.as_ref()
    }

    /// Integration span (start, end)
    pub fn span(&self) -> (f64, f64) {
        self.span
    }

    /// Run settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Initial state vector
    pub fn initial_state(&self) -> &DVector<f64> {
        &self.y0
    }

    /// Initial parameter vector
    pub fn initial_params(&self) -> &DVector<f64> {
        &self.p0
    }
}
