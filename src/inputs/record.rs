//! Determinate-mode input records

use crate::error::Error;
use crate::variable::Variable;

/// One determinate-mode data series: a variable, its values, and the
/// injection times, validated and immutable once constructed
///
/// Times must be non-decreasing; a repeated time is allowed and the
/// later value wins at that instant. Several records may target the
/// same run: different variables, or the same variable across
/// disjoint time windows.
#[derive(Debug, Clone)]
pub struct Input {
    variable: Variable,
    values: Vec<f64>,
    times: Vec<f64>,
}

impl Input {
    /// Create a record from parallel value/time sequences
    ///
    /// # Errors
    /// [`Error::RecordLengthMismatch`] if the sequences differ in
    /// length, [`Error::DecreasingTimes`] if the times go backwards.
    pub fn new(variable: Variable, values: Vec<f64>, times: Vec<f64>) -> Result<Self, Error> {
        if values.len() != times.len() {
            return Err(Error::RecordLengthMismatch {
                name: variable.name().to_string(),
                values: values.len(),
                times: times.len(),
            });
        }
        for (i, &time) in times.iter().enumerate() {
            if !time.is_finite() {
                return Err(Error::NonFiniteTime {
                    name: variable.name().to_string(),
                    index: i,
                });
            }
            if i > 0 && time < times[i - 1] {
                return Err(Error::DecreasingTimes {
                    name: variable.name().to_string(),
                    index: i,
                    time,
                });
            }
        }
        Ok(Self {
            variable,
            values,
            times,
        })
    }

    /// The driven variable
    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    /// Injection values, in time order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Injection times, non-decreasing
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Iterate over (time, value) pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    /// Number of (time, value) pairs
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}
