use ndarray::{ArrayView2, AsArray, Axis, Dimension};

use super::adaptive::AdaptiveCore;
use super::kernel::{FusedKernel, UpdateKernel, UpdateRule};
use crate::common::FilterLayout;
use crate::error::{FilterError, Outcome};
use crate::filter::PredictionFilter;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LmsOptions {
    /// Divide the update step by the energy of the witness window (NLMS).
    pub normalized: bool,
    /// Learning rate.
    pub step_scale: f64,
    /// Keep all coefficients within `[-clipping, clipping]`.
    pub coefficient_clipping: Option<f64>,
}

impl Default for LmsOptions {
    fn default() -> Self {
        LmsOptions {
            normalized: true,
            step_scale: 0.1,
            coefficient_clipping: None,
        }
    }
}

/// A (normalized) least mean squares filter with multiple witness channels.
///
/// The coefficients adapt to the prediction error after every sample, so
/// `apply()` needs the target. `condition()` runs the filter and keeps the
/// adapted coefficients.
#[derive(Debug, Clone)]
pub struct LmsFilter<K = FusedKernel> {
    core: AdaptiveCore<K>,
}

impl LmsFilter<FusedKernel> {
    pub fn new(n_filter: usize, idx_target: usize, n_channel: usize) -> Result<Self, FilterError> {
        LmsFilter::from_options(n_filter, idx_target, n_channel, LmsOptions::default())
    }

    pub fn from_options(
        n_filter: usize,
        idx_target: usize,
        n_channel: usize,
        options: LmsOptions,
    ) -> Result<Self, FilterError> {
        LmsFilter::with_kernel(n_filter, idx_target, n_channel, options, FusedKernel::default())
    }
}

impl<K: UpdateKernel> LmsFilter<K> {
    pub fn with_kernel(
        n_filter: usize,
        idx_target: usize,
        n_channel: usize,
        options: LmsOptions,
        kernel: K,
    ) -> Result<Self, FilterError> {
        let layout = FilterLayout::new(n_filter, idx_target, n_channel)?;
        let rule = UpdateRule::new(
            options.step_scale,
            options.normalized,
            options.coefficient_clipping,
        )?;
        Ok(LmsFilter {
            core: AdaptiveCore::new(layout, rule, 1, kernel),
        })
    }

    pub fn rule(&self) -> &UpdateRule {
        &self.core.rule
    }

    /// FIR coefficients, `n_channel × n_filter`.
    pub fn coefficients(&self) -> ArrayView2<'_, f64> {
        self.core.state.index_axis(Axis(0), 0)
    }

    /// Sets all coefficients to zero.
    pub fn reset(&mut self) {
        self.core.reset();
    }
}

impl<K: UpdateKernel + Clone> LmsFilter<K> {
    /// Runs the filter without keeping the adaptation, like `apply()` with
    /// `update_state` off. Only borrows the filter, so one instance can serve
    /// several threads.
    pub fn predict<'a, W, D>(&self, witness: W, target: &[f64], pad: bool) -> Result<Outcome<Vec<f64>>, FilterError>
    where
        W: AsArray<'a, f64, D>,
        D: Dimension,
    {
        let witness = self.core.layout.check_data_dimensions(witness.into(), Some(target))?;
        self.core.predict(witness, target, pad).map(Outcome::new)
    }
}

impl<K: UpdateKernel> PredictionFilter for LmsFilter<K> {
    const NAME: &'static str = "LMS";
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

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::filter::contract;
    use crate::lms::ReferenceKernel;

    const N_FILTER: usize = 32;

    fn configurations() -> Vec<LmsOptions> {
        vec![
            LmsOptions::default(),
            LmsOptions {
                coefficient_clipping: Some(2.0),
                ..Default::default()
            },
            LmsOptions {
                normalized: false,
                step_scale: 0.001,
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_exception_on_misshaped_input() {
        for options in configurations() {
            contract::exception_on_misshaped_input(LmsFilter::from_options(N_FILTER, 0, 1, options).unwrap());
        }
    }

    #[test]
    fn test_minimum_input_length() {
        for options in configurations() {
            contract::minimum_input_length(LmsFilter::from_options(N_FILTER, 0, 1, options).unwrap());
        }
    }

    #[test]
    fn test_output_shapes() {
        for options in configurations() {
            contract::output_shapes(LmsFilter::from_options(N_FILTER, 7, 1, options).unwrap());
        }
    }

    #[test]
    fn test_performance() {
        for options in configurations() {
            contract::performance(
                |idx_target| LmsFilter::from_options(N_FILTER, idx_target, 2, options).unwrap(),
                N_FILTER,
            );
        }
        contract::performance(
            |idx_target| {
                LmsFilter::with_kernel(N_FILTER, idx_target, 2, LmsOptions::default(), ReferenceKernel)
                    .unwrap()
            },
            N_FILTER,
        );
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(
            LmsFilter::new(0, 0, 1).unwrap_err(),
            FilterError::ZeroFilterLength
        );
        let options = LmsOptions {
            step_scale: -0.1,
            ..Default::default()
        };
        assert_eq!(
            LmsFilter::from_options(4, 0, 1, options).unwrap_err(),
            FilterError::InvalidStepScale(-0.1)
        );
        let options = LmsOptions {
            coefficient_clipping: Some(0.0),
            ..Default::default()
        };
        assert_eq!(
            LmsFilter::from_options(4, 0, 1, options).unwrap_err(),
            FilterError::InvalidClipping(0.0)
        );
    }

    #[test]
    fn test_update_state_contract() {
        for options in configurations() {
            contract::update_state(LmsFilter::from_options(N_FILTER, 3, 1, options).unwrap(), |f| {
                f.coefficients().to_owned().into_dyn()
            });
        }
        contract::update_state(
            LmsFilter::with_kernel(N_FILTER, 3, 1, LmsOptions::default(), ReferenceKernel).unwrap(),
            |f| f.coefficients().to_owned().into_dyn(),
        );
    }

    #[test]
    fn test_shared_prediction() {
        let (witness, target) = contract::test_data(vec![0.1], 1_000);
        let mut filter = LmsFilter::new(N_FILTER, 0, 1).unwrap();
        filter.condition(&witness, &target).unwrap();
        let coefficients = filter.coefficients().to_owned();
        let expected = filter.apply(&witness, Some(&target[..]), true, false).unwrap();

        let filter = &filter;
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..2)
                .map(|_| scope.spawn(|| filter.predict(&witness, &target, true).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
        assert_eq!(filter.coefficients(), coefficients);
    }

    #[test]
    fn test_unnormalized_accepts_unbounded_energy() {
        let (witness, target) = contract::test_data(vec![0.1], 200);
        let options = LmsOptions {
            normalized: false,
            step_scale: 0.001,
            ..Default::default()
        };
        let mut filter = LmsFilter::from_options(8, 0, 1, options).unwrap();

        let mut loud = witness.clone();
        loud[[0, 150]] = 1e300;
        assert!(filter.apply(&loud, Some(&target[..]), true, false).is_ok());
        assert!(filter.coefficients().iter().all(|c| *c == 0.0));
    }

    #[test]
    fn test_update_state() {
        let (witness, target) = contract::test_data(vec![0.1], 1_000);
        let mut filter = LmsFilter::new(N_FILTER, 0, 1).unwrap();

        filter.apply(&witness, Some(&target[..]), true, false).unwrap();
        assert!(filter.coefficients().iter().all(|c| *c == 0.0));

        filter.condition(&witness, &target).unwrap();
        let conditioned = filter.coefficients().to_owned();
        assert!(conditioned.iter().any(|c| *c != 0.0));

        // A dry run leaves the coefficients bit for bit identical
        filter.apply(&witness, Some(&target[..]), true, false).unwrap();
        assert_eq!(filter.coefficients(), conditioned);

        filter.reset();
        assert!(filter.coefficients().iter().all(|c| *c == 0.0));
    }

    #[test]
    fn test_sequential_processing() {
        // Processing in one call or in two consecutive calls gives the same coefficients
        // as long as the windows line up
        let (witness, target) = contract::test_data(vec![0.1], 1_000);
        let mut single = LmsFilter::new(N_FILTER, 0, 1).unwrap();
        single.condition(&witness, &target).unwrap();

        let mut split = LmsFilter::new(N_FILTER, 0, 1).unwrap();
        let first = 500 + N_FILTER - 1;
        split
            .condition(witness.slice(ndarray::s![.., ..first]), &target[..first])
            .unwrap();
        split
            .condition(witness.slice(ndarray::s![.., 500..]), &target[500..])
            .unwrap();
        assert_eq!(single.coefficients(), split.coefficients());
    }

    #[test]
    fn test_clipping_bounds_coefficients() {
        let (witness, target) = contract::test_data(vec![0.0], 2_000);
        let options = LmsOptions {
            normalized: false,
            step_scale: 0.5,
            coefficient_clipping: Some(0.05),
        };
        let mut filter = LmsFilter::from_options(8, 0, 1, options).unwrap();
        filter.condition(&witness, &target).unwrap();
        assert!(filter.coefficients().iter().all(|c| c.abs() <= 0.05));
    }

    #[test]
    fn test_energy_overflow_keeps_state() {
        let (witness, target) = contract::test_data(vec![0.1], 200);
        let mut filter = LmsFilter::new(8, 0, 1).unwrap();
        filter.condition(&witness, &target).unwrap();
        let coefficients = filter.coefficients().to_owned();

        let mut overflowing = witness.clone();
        overflowing[[0, 150]] = 1e300;
        assert!(matches!(
            filter.apply(&overflowing, Some(&target[..]), true, true),
            Err(FilterError::EnergyOverflow(_))
        ));
        assert_eq!(filter.coefficients(), coefficients);
    }

    #[test]
    fn test_requires_target() {
        let witness = Array2::<f64>::zeros((1, 100));
        let mut filter = LmsFilter::new(8, 0, 1).unwrap();
        assert_eq!(
            filter.apply(&witness, None, true, true).unwrap_err(),
            FilterError::MissingTarget
        );
    }
}
