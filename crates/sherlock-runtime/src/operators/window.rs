//! Time-series operators over trailing windows
//!
//! Entry `i` depends only on rows `<= i`. Rows before the operator's
//! warm-up (1 for `diff`, `N - 1` for `rolling(N)`) are undefined, as is any
//! window that contains an undefined value.

use crate::error::{EvalError, Result};
use crate::series::defined;
use sherlock_core::ast::TimeSeriesOp;

pub(crate) fn execute_time_series(
    op: TimeSeriesOp,
    values: &[Option<f64>],
) -> Result<Vec<Option<f64>>> {
    match op {
        TimeSeriesOp::Diff => Ok(diff(values)),
        TimeSeriesOp::RollingMean { window } => rolling(values, window, WindowState::mean),
        TimeSeriesOp::RollingStd { window } => rolling(values, window, WindowState::sample_std),
    }
}

/// `value[i] - value[i - 1]`
fn diff(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let entry = match i.checked_sub(1).map(|prev| (values[prev], values[i])) {
            Some((Some(prev), Some(current))) => defined(current - prev),
            _ => None,
        };
        out.push(entry);
    }
    out
}

/// Single pass over the series, independent of the window length
///
/// The state holds the trailing run of defined values, capped at `window`.
/// An undefined value empties it, so an entry is defined only once the run
/// fills the whole window again. The state is recomputed from the window
/// after every `window` removals, which bounds rounding drift at O(1)
/// amortized cost.
fn rolling(
    values: &[Option<f64>],
    window: usize,
    stat: fn(&WindowState) -> Option<f64>,
) -> Result<Vec<Option<f64>>> {
    if window == 0 {
        return Err(EvalError::InvalidWindow(window));
    }

    let mut state = WindowState::default();
    let mut out = Vec::with_capacity(values.len());
    for (i, value) in values.iter().enumerate() {
        match value.and_then(defined) {
            Some(x) => {
                if state.count == window {
                    // the run spans rows i - window ..= i - 1
                    if let Some(leaving) = values[i - window] {
                        state.remove(leaving);
                    }
                }
                state.add(x);
                if state.count == window && state.removals >= window {
                    state.rebuild(&values[i + 1 - window..=i]);
                }
            }
            None => state.clear(),
        }

        let entry = if state.count == window {
            stat(&state).and_then(defined)
        } else {
            None
        };
        out.push(entry);
    }
    Ok(out)
}

/// Welford accumulator with removal
#[derive(Debug, Default)]
struct WindowState {
    count: usize,
    mean: f64,
    m2: f64,
    removals: usize,
    /// Trailing run of values equal to `last`
    repeats: usize,
    last: f64,
}

impl WindowState {
    fn add(&mut self, x: f64) {
        self.repeats = if self.count > 0 && x == self.last {
            self.repeats + 1
        } else {
            1
        };
        self.last = x;

        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    fn remove(&mut self, x: f64) {
        if self.count <= 1 {
            self.clear();
            return;
        }
        self.count -= 1;
        self.removals += 1;
        let delta = x - self.mean;
        self.mean -= delta / self.count as f64;
        self.m2 -= delta * (x - self.mean);
        if self.count == 1 {
            self.m2 = 0.0;
        }
    }

    fn rebuild(&mut self, window: &[Option<f64>]) {
        self.clear();
        for x in window.iter().flatten() {
            self.add(*x);
        }
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    /// The whole window holds one repeated value
    fn is_flat(&self) -> bool {
        self.repeats >= self.count
    }

    fn mean(&self) -> Option<f64> {
        match self.count {
            0 => None,
            _ if self.is_flat() => Some(self.last),
            _ => Some(self.mean),
        }
    }

    /// Standard deviation with `n - 1` degrees of freedom
    fn sample_std(&self) -> Option<f64> {
        if self.count < 2 {
            return None;
        }
        if self.is_flat() {
            return Some(0.0);
        }
        Some((self.m2.max(0.0) / (self.count - 1) as f64).sqrt())
    }
}
