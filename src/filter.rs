//! The interface shared by all prediction filters.

use ndarray::{AsArray, Dimension};

use crate::common::FilterLayout;
use crate::error::{FilterError, Outcome};

/// A FIR prediction filter that estimates a target signal from witness signals.
///
/// Witness data may be any 1D (single channel) or 2D (`channel × sample`)
/// array or slice of `f64`.
pub trait PredictionFilter {
    /// Short name used in logs and benchmarks.
    const NAME: &'static str;

    /// What `condition()` produces in addition to updating the filter.
    type Conditioned;

    fn layout(&self) -> &FilterLayout;

    /// Uses a dataset with known target to fit the filter.
    fn condition<'a, W, D>(
        &mut self,
        witness: W,
        target: &[f64],
    ) -> Result<Outcome<Self::Conditioned>, FilterError>
    where
        W: AsArray<'a, f64, D>,
        D: Dimension;

    /// Predicts the target from the witness data.
    ///
    /// # Arguments
    ///
    /// * `witness` - Witness sensor data.
    /// * `target` - Target sensor data. Required by filters that adapt to the prediction error.
    /// * `pad` - Zero pad the prediction so that it is aligned with and as long as the target.
    /// * `update_state` - Keep the adaptation that happened during this call. If false,
    ///   the filter coefficients are left exactly as they were.
    ///
    /// Takes `&mut self` because adaptive filters reuse their scratch buffers.
    /// For dry runs on a filter shared between threads, the filters provide a
    /// `predict()` method that only borrows them.
    fn apply<'a, W, D>(
        &mut self,
        witness: W,
        target: Option<&[f64]>,
        pad: bool,
        update_state: bool,
    ) -> Result<Outcome<Vec<f64>>, FilterError>
    where
        W: AsArray<'a, f64, D>,
        D: Dimension;
}
