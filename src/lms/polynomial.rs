use ndarray::{ArrayView3, AsArray, Dimension};

use super::adaptive::AdaptiveCore;
use super::kernel::{FusedKernel, UpdateKernel, UpdateRule};
use crate::common::FilterLayout;
use crate::error::{FilterError, Outcome};
use crate::filter::PredictionFilter;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolynomialLmsOptions {
    pub normalized: bool,
    pub step_scale: f64,
    pub coefficient_clipping: Option<f64>,
    /// Highest power of the witness samples.
    pub order: usize,
}

impl Default for PolynomialLmsOptions {
    fn default() -> Self {
        PolynomialLmsOptions {
            normalized: true,
            step_scale: 0.5,
            coefficient_clipping: None,
            order: 1,
        }
    }
}

/// An LMS filter on powers of the witness signals, able to follow
/// non-linear (polynomial) couplings.
///
/// The prediction for a window `W` is `Σ_p Σ state[p - 1] ⊙ W^p` for
/// `p = 1..=order`. With `normalized`, the update of degree `p` is divided by
/// `E^((p + 1) / 2)`, where `E` is the energy of the window.
#[derive(Debug, Clone)]
pub struct PolynomialLmsFilter<K = FusedKernel> {
    core: AdaptiveCore<K>,
}

impl PolynomialLmsFilter<FusedKernel> {
    pub fn new(n_filter: usize, idx_target: usize, n_channel: usize) -> Result<Self, FilterError> {
        PolynomialLmsFilter::from_options(n_filter, idx_target, n_channel, Default::default())
    }

    pub fn from_options(
        n_filter: usize,
        idx_target: usize,
        n_channel: usize,
        options: PolynomialLmsOptions,
    ) -> Result<Self, FilterError> {
        PolynomialLmsFilter::with_kernel(n_filter, idx_target, n_channel, options, FusedKernel::default())
    }
}

impl<K: UpdateKernel> PolynomialLmsFilter<K> {
    pub fn with_kernel(
        n_filter: usize,
        idx_target: usize,
        n_channel: usize,
        options: PolynomialLmsOptions,
        kernel: K,
    ) -> Result<Self, FilterError> {
        let layout = FilterLayout::new(n_filter, idx_target, n_channel)?;
        if options.order == 0 {
            return Err(FilterError::ZeroOrder);
        }
        let rule = UpdateRule::new(
            options.step_scale,
            options.normalized,
            options.coefficient_clipping,
        )?;
        Ok(PolynomialLmsFilter {
            core: AdaptiveCore::new(layout, rule, options.order, kernel),
        })
    }

    pub fn order(&self) -> usize {
        self.core.order()
    }

    pub fn rule(&self) -> &UpdateRule {
        &self.core.rule
    }

    /// Coefficients, `order × n_channel × n_filter`.
    pub fn coefficients(&self) -> ArrayView3<'_, f64> {
        self.core.state.view()
    }

    pub fn reset(&mut self) {
        self.core.reset();
    }
}

impl<K: UpdateKernel + Clone> PolynomialLmsFilter<K> {
    /// `apply()` without `update_state` through a shared borrow.
    pub fn predict<'a, W, D>(&self, witness: W, target: &[f64], pad: bool) -> Result<Outcome<Vec<f64>>, FilterError>
    where
        W: AsArray<'a, f64, D>,
        D: Dimension,
    {
        let witness = self.core.layout.check_data_dimensions(witness.into(), Some(target))?;
        self.core.predict(witness, target, pad).map(Outcome::new)
    }
}

impl<K: UpdateKernel> PredictionFilter for PolynomialLmsFilter<K> {
    const NAME: &'static str = "PolyLMS";
    type Conditioned = ();

    fn layout(&self) -> &FilterLayout {
        &self.core.layout
    }

    fn condition<'a, W, D>(&mut self, witness: W, target: &[f64]) -> Result<Outcome<()>, FilterError>
    where
        W: AsArray<'a, f64, D>,
        D: Dimension,
    {
        self.apply(witness, Some(target), false, true)
            .map(|outcome| outcome.map(|_| ()))
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
        let witness = self.core.layout.check_data_dimensions(witness.into(), Some(target))?;
        self.core
            .run(witness, target, pad, update_state)
            .map(Outcome::new)
    }
}
