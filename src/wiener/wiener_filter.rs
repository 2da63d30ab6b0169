use ndarray::{Array2, ArrayView1, ArrayView2, AsArray, Dimension};

use super::solve::{wiener_apply, wiener_solve, WienerSolution};
use crate::common::FilterLayout;
use crate::error::{FilterError, FilterWarning, Outcome};
use crate::filter::PredictionFilter;

/// A static Wiener filter. `condition()` fits the FIR coefficients,
/// `apply()` only reads them.
#[derive(Debug, Clone)]
pub struct WienerFilter {
    layout: FilterLayout,
    /// `n_channel × n_filter`, set by the first successful `condition()`
    coefficients: Option<Array2<f64>>,
}

impl WienerFilter {
    pub fn new(n_filter: usize, idx_target: usize, n_channel: usize) -> Result<Self, FilterError> {
        Ok(WienerFilter {
            layout: FilterLayout::new(n_filter, idx_target, n_channel)?,
            coefficients: None,
        })
    }

    pub fn coefficients(&self) -> Option<ArrayView2<'_, f64>> {
        self.coefficients.as_ref().map(|c| c.view())
    }

    /// Same as `apply()`, but only borrows the filter, so a conditioned
    /// filter can be shared between threads.
    pub fn predict<'a, W, D>(&self, witness: W, pad: bool) -> Result<Vec<f64>, FilterError>
    where
        W: AsArray<'a, f64, D>,
        D: Dimension,
    {
        let witness = self.layout.check_data_dimensions(witness.into(), None)?;
        let coefficients = self.coefficients.as_ref().ok_or(FilterError::NotConditioned)?;

        let prediction = wiener_apply(coefficients.view(), witness);
        Ok(self.layout.finish_prediction(prediction, witness.ncols(), pad))
    }

    pub fn is_conditioned(&self) -> bool {
        self.coefficients.is_some()
    }
}

impl PredictionFilter for WienerFilter {
    const NAME: &'static str = "WF";
    type Conditioned = WienerSolution;

    fn layout(&self) -> &FilterLayout {
        &self.layout
    }

    fn condition<'a, W, D>(
        &mut self,
        witness: W,
        target: &[f64],
    ) -> Result<Outcome<WienerSolution>, FilterError>
    where
        W: AsArray<'a, f64, D>,
        D: Dimension,
    {
        let witness = self.layout.check_data_dimensions(witness.into(), Some(target))?;
        let solution = wiener_solve(
            witness,
            ArrayView1::from(target),
            self.layout.n_filter(),
            self.layout.idx_target(),
        )?;
        self.coefficients = Some(solution.coefficients.clone());

        let full_rank = solution.full_rank;
        let outcome = Outcome::new(solution);
        Ok(if full_rank {
            outcome
        } else {
            outcome.with_warning(FilterWarning::NotFullRank)
        })
    }

    /// The target is not used and its length is not checked.
    fn apply<'a, W, D>(
        &mut self,
        witness: W,
        _target: Option<&[f64]>,
        pad: bool,
        _update_state: bool,
    ) -> Result<Outcome<Vec<f64>>, FilterError>
    where
        W: AsArray<'a, f64, D>,
        D: Dimension,
    {
        self.predict(witness, pad).map(Outcome::new)
    }
}
