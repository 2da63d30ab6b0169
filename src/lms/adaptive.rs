use log::debug;
use ndarray::{s, Array3, ArrayView2, Axis};

use super::kernel::{UpdateKernel, UpdateRule};
use crate::common::FilterLayout;
use crate::error::FilterError;

/// State and sample loop shared by the LMS filter variants.
#[derive(Debug, Clone)]
pub(crate) struct AdaptiveCore<K> {
    pub layout: FilterLayout,
    pub rule: UpdateRule,
    /// `order × n_channel × n_filter`
    pub state: Array3<f64>,
    kernel: K,
}

impl<K: UpdateKernel> AdaptiveCore<K> {
    pub fn new(layout: FilterLayout, rule: UpdateRule, order: usize, kernel: K) -> Self {
        AdaptiveCore {
            state: Array3::zeros((order, layout.n_channel(), layout.n_filter())),
            layout,
            rule,
            kernel,
        }
    }

    pub fn order(&self) -> usize {
        self.state.len_of(Axis(0))
    }

    pub fn reset(&mut self) {
        self.state.fill(0.0);
    }

    /// Runs the filter over every window of `witness`, which must already be
    /// validated against the layout and `target`.
    ///
    /// Works on a copy of the state. The copy is only kept when `update_state`
    /// is set and every sample was processed.
    pub fn run(
        &mut self,
        witness: ArrayView2<f64>,
        target: &[f64],
        pad: bool,
        update_state: bool,
    ) -> Result<Vec<f64>, FilterError> {
        let mut state = self.state.clone();
        let prediction = process(
            &mut self.kernel,
            &self.rule,
            &self.layout,
            &mut state,
            witness,
            target,
        )?;
        debug!(
            "adaptive filter: {} windows, order {}, state {}",
            prediction.len(),
            self.order(),
            if update_state { "updated" } else { "kept" }
        );

        if update_state {
            self.state = state;
        }
        Ok(self.layout.finish_prediction(prediction, witness.ncols(), pad))
    }
}

impl<K: UpdateKernel + Clone> AdaptiveCore<K> {
    /// Same as `run()` without `update_state`, on private copies of the
    /// state and the kernel's scratch space.
    pub fn predict(
        &self,
        witness: ArrayView2<f64>,
        target: &[f64],
        pad: bool,
    ) -> Result<Vec<f64>, FilterError> {
        let mut kernel = self.kernel.clone();
        let mut state = self.state.clone();
        let prediction =
            process(&mut kernel, &self.rule, &self.layout, &mut state, witness, target)?;
        Ok(self.layout.finish_prediction(prediction, witness.ncols(), pad))
    }
}

/// Steps `kernel` over every window, adapting `state` as it goes.
fn process<K: UpdateKernel>(
    kernel: &mut K,
    rule: &UpdateRule,
    layout: &FilterLayout,
    state: &mut Array3<f64>,
    witness: ArrayView2<f64>,
    target: &[f64],
) -> Result<Vec<f64>, FilterError> {
    let n_filter = layout.n_filter();
    let target_offset = layout.target_offset();
    let n_windows = layout.prediction_len(witness.ncols());

    let mut prediction = Vec::with_capacity(n_windows);
    for idx in 0..n_windows {
        let window = witness.slice(s![.., idx..idx + n_filter]);
        prediction.push(kernel.step(state, window, target[idx + target_offset], rule)?);
    }
    Ok(prediction)
}
