//! Recorded solution of a run

use nalgebra::DVector;

use crate::events::EventHistory;
use crate::system::Layout;
use crate::variable::Variable;

/// Run statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct Stats {
    /// Dynamics function evaluations
    pub nfev: usize,
    /// Attempted steps
    pub nsteps: usize,
    /// Accepted steps
    pub naccpt: usize,
    /// Rejected steps
    pub nrejct: usize,
}

/// Terminal status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The run reached the end of its span
    Completed,
    /// The solution was taken before the span end was reached
    Partial,
}

/// Solution trace of one run
///
/// Holds every accepted step endpoint (time, state, slope), one
/// discrete step series per declared input, run statistics, and the
/// terminal status. States between step endpoints are evaluated by
/// cubic Hermite interpolation; input values are piecewise-constant
/// lookups into the recorded event histories.
#[derive(Debug, Clone)]
pub struct Solution {
    t: Vec<f64>,
    y: Vec<DVector<f64>>,
    dy: Vec<DVector<f64>>,
    inputs: Vec<(Variable, EventHistory)>,
    state_layout: Layout,
    stats: Stats,
    status: Status,
}

impl Solution {
    pub(crate) fn new(
        t: Vec<f64>,
        y: Vec<DVector<f64>>,
        dy: Vec<DVector<f64>>,
        inputs: Vec<(Variable, EventHistory)>,
        state_layout: Layout,
        stats: Stats,
        status: Status,
    ) -> Self {
        Self {
            t,
            y,
            dy,
            inputs,
            state_layout,
            stats,
            status,
        }
    }

    /// Recorded step times
    pub fn times(&self) -> &[f64] {
        &self.t
    }

    /// Recorded states, one per step time
    pub fn states(&self) -> &[DVector<f64>] {
        &self.y
    }

    /// Evaluate the full state at `t`
    ///
    /// Exact at recorded step times; cubic Hermite interpolation inside
    /// a step. Returns `None` outside the recorded range.
    pub fn state_at(&self, t: f64) -> Option<DVector<f64>> {
        let (&first, &last) = (self.t.first()?, self.t.last()?);
        if t < first || t > last {
            return None;
        }
        let i = self.t.partition_point(|&x| x < t);
        if self.t[i] == t {
            return Some(self.y[i].clone());
        }
        let (t0, t1) = (self.t[i - 1], self.t[i]);
        Some(hermite(
            t,
            t0,
            t1 - t0,
            &self.y[i - 1],
            &self.y[i],
            &self.dy[i - 1],
            &self.dy[i],
        ))
    }

    /// Value of one variable at `t`
    ///
    /// For an input variable this is the piecewise-constant lookup into
    /// its recorded step history (post-jump value at a jump instant,
    /// `None` before its first record or after its last; an
    /// unfinalized history ends at its last explicit injection). For a
    /// state it interpolates like [`state_at`](Self::state_at).
    pub fn value_at(&self, var: &Variable, t: f64) -> Option<f64> {
        if let Some((_, history)) = self.inputs.iter().find(|(v, _)| v == var) {
            return history.value_at(t);
        }
        let slot = self.state_layout.slot_of(var)?;
        self.state_at(t).map(|y| y[slot])
    }

    /// The recorded (time, value) step series of an input variable
    pub fn input_series(&self, var: &Variable) -> Option<&[(f64, f64)]> {
        self.inputs
            .iter()
            .find(|(v, _)| v == var)
            .map(|(_, history)| history.records())
    }

    /// Iterate over recorded (t, y) samples
    pub fn iter(&self) -> impl Iterator<Item = (f64, &DVector<f64>)> + '_ {
        self.t.iter().copied().zip(self.y.iter())
    }

    /// Run statistics
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Terminal status
    pub fn status(&self) -> Status {
        self.status
    }
}

/// Cubic Hermite interpolation between two step endpoints
fn hermite(
    t: f64,
    t0: f64,
    h: f64,
    y0: &DVector<f64>,
    y1: &DVector<f64>,
    d0: &DVector<f64>,
    d1: &DVector<f64>,
) -> DVector<f64> {
    let s = (t - t0) / h;
    let s2 = s * s;
    let s3 = s2 * s;

    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;

    h00 * y0 + (h10 * h) * d0 + h01 * y1 + (h11 * h) * d1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hermite_reproduces_line() {
        // y = 2t over [0, 1]: endpoints and slopes of a straight line
        let y0 = DVector::from_vec(vec![0.0]);
        let y1 = DVector::from_vec(vec![2.0]);
        let d = DVector::from_vec(vec![2.0]);
        let mid = hermite(0.5, 0.0, 1.0, &y0, &y1, &d, &d);
        assert!((mid[0] - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_hermite_reproduces_cubic() {
        // y = t^3 on [1, 2], slopes 3t^2
        let y0 = DVector::from_vec(vec![1.0]);
        let y1 = DVector::from_vec(vec![8.0]);
        let d0 = DVector::from_vec(vec![3.0]);
        let d1 = DVector::from_vec(vec![12.0]);
        let v = hermite(1.5, 1.0, 1.0, &y0, &y1, &d0, &d1);
        assert!((v[0] - 3.375).abs() < 1e-12);
    }
}
