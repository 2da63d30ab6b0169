use log::debug;
use ndarray::{s, Array2, ArrayView1, ArrayView2, AsArray, Dimension};

use super::solve::{wiener_apply, wiener_solve};
use crate::common::FilterLayout;
use crate::error::{FilterError, FilterWarning, Outcome};
use crate::filter::PredictionFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpdatingWienerOptions {
    /// Additional samples before each block used to fit its filter.
    pub context_pre: usize,
    /// Additional samples after each block used to fit its filter.
    pub context_post: usize,
    /// Don't warn when `condition()` is called.
    pub hide_condition_warning: bool,
}

/// A Wiener filter that is refitted for every block of `n_filter` samples.
///
/// Each block is conditioned on the block itself plus `context_pre` samples
/// before and `context_post` samples after it, so `apply()` needs the target.
/// A `context_post` above zero makes the filter acausal.
#[derive(Debug, Clone)]
pub struct UpdatingWienerFilter {
    layout: FilterLayout,
    options: UpdatingWienerOptions,
    /// Coefficients of the last block of the last stateful `apply()`
    coefficients: Option<Array2<f64>>,
}

impl UpdatingWienerFilter {
    pub fn new(n_filter: usize, idx_target: usize, n_channel: usize) -> Result<Self, FilterError> {
        UpdatingWienerFilter::from_options(n_filter, idx_target, n_channel, Default::default())
    }

    pub fn from_options(
        n_filter: usize,
        idx_target: usize,
        n_channel: usize,
        options: UpdatingWienerOptions,
    ) -> Result<Self, FilterError> {
        Ok(UpdatingWienerFilter {
            layout: FilterLayout::new(n_filter, idx_target, n_channel)?,
            options,
            coefficients: None,
        })
    }

    pub fn options(&self) -> &UpdatingWienerOptions {
        &self.options
    }

    pub fn coefficients(&self) -> Option<ArrayView2<'_, f64>> {
        self.coefficients.as_ref().map(|c| c.view())
    }

    /// Like `apply()` without `update_state`, but only borrows the filter,
    /// so one instance can serve several threads.
    pub fn predict<'a, W, D>(
        &self,
        witness: W,
        target: &[f64],
        pad: bool,
    ) -> Result<Outcome<Vec<f64>>, FilterError>
    where
        W: AsArray<'a, f64, D>,
        D: Dimension,
    {
        let witness = self.layout.check_data_dimensions(witness.into(), Some(target))?;
        self.fit_blocks(witness, target, pad)
            .map(|(outcome, _)| outcome)
    }

    /// Fits and applies one filter per block. Returns the prediction and the
    /// coefficients of the last block.
    fn fit_blocks(
        &self,
        witness: ArrayView2<f64>,
        target: &[f64],
        pad: bool,
    ) -> Result<(Outcome<Vec<f64>>, Option<Array2<f64>>), FilterError> {
        let n_filter = self.layout.n_filter();
        let n_samples = witness.ncols();
        let mut prediction = Vec::with_capacity(self.layout.prediction_len(n_samples));
        let mut last_coefficients = None;
        let mut total = 0;
        let mut deficient = 0;

        let mut idx = n_filter - 1;
        while idx < n_samples {
            let start = idx.saturating_sub(self.options.context_pre);
            let end = idx
                .saturating_add(n_filter)
                .saturating_add(self.options.context_post)
                .min(n_samples);
            if end - start < n_filter {
                break;
            }

            let solution = wiener_solve(
                witness.slice(s![.., start..end]),
                ArrayView1::from(&target[start..end]),
                n_filter,
                self.layout.idx_target(),
            )?;
            total += 1;
            if !solution.full_rank {
                deficient += 1;
            }

            let apply_end = (idx + n_filter).min(n_samples);
            prediction.extend(wiener_apply(
                solution.coefficients.view(),
                witness.slice(s![.., idx + 1 - n_filter..apply_end]),
            ));
            last_coefficients = Some(solution.coefficients);

            idx += n_filter;
        }
        debug!("{}: fitted {} blocks over {} samples", Self::NAME, total, n_samples);

        let outcome = Outcome::new(self.layout.finish_prediction(prediction, n_samples, pad));
        let outcome = if deficient > 0 {
            outcome.with_warning(FilterWarning::BlocksNotFullRank { deficient, total })
        } else {
            outcome
        };
        Ok((outcome, last_coefficients))
    }
}

impl PredictionFilter for UpdatingWienerFilter {
    const NAME: &'static str = "UWF";
    type Conditioned = ();

    fn layout(&self) -> &FilterLayout {
        &self.layout
    }

    /// Does nothing, the filter is fitted during `apply()`.
    fn condition<'a, W, D>(&mut self, _witness: W, _target: &[f64]) -> Result<Outcome<()>, FilterError>
    where
        W: AsArray<'a, f64, D>,
        D: Dimension,
    {
        let outcome = Outcome::new(());
        Ok(if self.options.hide_condition_warning {
            outcome
        } else {
            outcome.with_warning(FilterWarning::ConditionHasNoEffect)
        })
    }

    fn apply<'a, W, D>(
        &mut self,
        witness: W,
        target: Option<&[f64]>,
        pad: bool,
        update_state: bool,
    ) -> Result<Outcome<Vec<f64>>, FilterError>
    where
        W: AsArray<'a, f64, D>,
        D: Dimension,
    {
        let target = target.ok_or(FilterError::MissingTarget)?;
        let witness = self.layout.check_data_dimensions(witness.into(), Some(target))?;

        let (outcome, last_coefficients) = self.fit_blocks(witness, target, pad)?;
        if update_state {
            if let Some(coefficients) = last_coefficients {
                self.coefficients = Some(coefficients);
            }
        }
        Ok(outcome)
    }
}
