use ndarray::{Array2, Array3, ArrayView2, Axis};

use crate::error::FilterError;

/// Step size, normalization and clipping of an LMS coefficient update.
///
/// A normalized update divides by the window energy, so a window whose energy
/// overflows to `+∞` is rejected with `EnergyOverflow`. Unnormalized updates
/// never look at the energy.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpdateRule {
    step_scale: f64,
    normalized: bool,
    clipping: Option<f64>,
}

impl UpdateRule {
    pub fn new(step_scale: f64, normalized: bool, clipping: Option<f64>) -> Result<Self, FilterError> {
        if !(step_scale > 0.0) || !step_scale.is_finite() {
            return Err(FilterError::InvalidStepScale(step_scale));
        }
        if let Some(clip) = clipping {
            if !(clip > 0.0) {
                return Err(FilterError::InvalidClipping(clip));
            }
        }
        Ok(UpdateRule {
            step_scale,
            normalized,
            clipping,
        })
    }

    pub fn step_scale(&self) -> f64 {
        self.step_scale
    }

    pub fn normalized(&self) -> bool {
        self.normalized
    }

    pub fn clipping(&self) -> Option<f64> {
        self.clipping
    }

    /// Update gain for coefficients of the given degree (starting at 1),
    /// given the prediction error and the window energy.
    fn gain(&self, degree: usize, error: f64, energy: f64) -> f64 {
        let norm = if self.normalized {
            energy.powf((degree + 1) as f64 / 2.0)
        } else {
            1.0
        };
        2.0 * self.step_scale * error / norm
    }
}

fn check_energy(energy: f64, rule: &UpdateRule) -> Result<(), FilterError> {
    if rule.normalized && (energy < 0.0 || energy == f64::INFINITY) {
        Err(FilterError::EnergyOverflow(energy))
    } else {
        Ok(())
    }
}

/// One sample of an (polynomial) LMS filter.
///
/// `state` is `order × n_channel × n_filter`, where `state[p]` weights the
/// witness window raised to the power `p + 1`. The kernel predicts the target
/// from `window`, updates `state` with the prediction error and returns the
/// prediction. On error, `state` is left unchanged.
pub trait UpdateKernel {
    fn step(
        &mut self,
        state: &mut Array3<f64>,
        window: ArrayView2<f64>,
        target: f64,
        rule: &UpdateRule,
    ) -> Result<f64, FilterError>;
}

/// Straightforward array arithmetic, one temporary array per degree.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceKernel;

impl UpdateKernel for ReferenceKernel {
    fn step(
        &mut self,
        state: &mut Array3<f64>,
        window: ArrayView2<f64>,
        target: f64,
        rule: &UpdateRule,
    ) -> Result<f64, FilterError> {
        let energy = (&window * &window).sum();
        check_energy(energy, rule)?;

        let powers: Vec<Array2<f64>> = (1..=state.len_of(Axis(0)))
            .map(|degree| window.mapv(|w| w.powi(degree as i32)))
            .collect();
        let prediction: f64 = state
            .outer_iter()
            .zip(powers.iter())
            .map(|(coefficients, power)| (&coefficients * power).sum())
            .sum();

        let error = target - prediction;
        if energy > 0.0 {
            for (index, (mut coefficients, power)) in
                state.outer_iter_mut().zip(powers.iter()).enumerate()
            {
                coefficients.scaled_add(rule.gain(index + 1, error, energy), power);
            }
        }
        if let Some(clip) = rule.clipping {
            state.mapv_inplace(|c| c.clamp(-clip, clip));
        }

        Ok(prediction)
    }
}

/// Computes prediction and energy in a single pass over the window and
/// updates and clips the coefficients in a second one. Powers are built by
/// repeated multiplication. Does not allocate once the first sample is processed.
#[derive(Debug, Clone, Default)]
pub struct FusedKernel {
    gains: Vec<f64>,
}

impl UpdateKernel for FusedKernel {
    fn step(
        &mut self,
        state: &mut Array3<f64>,
        window: ArrayView2<f64>,
        target: f64,
        rule: &UpdateRule,
    ) -> Result<f64, FilterError> {
        let order = state.len_of(Axis(0));

        let mut prediction = 0.0;
        let mut energy = 0.0;
        for ((channel, tap), &w) in window.indexed_iter() {
            energy += w * w;
            let mut power = 1.0;
            for degree in 0..order {
                power *= w;
                prediction += state[[degree, channel, tap]] * power;
            }
        }
        check_energy(energy, rule)?;

        let error = target - prediction;
        self.gains.clear();
        if energy > 0.0 {
            self.gains
                .extend((1..=order).map(|degree| rule.gain(degree, error, energy)));
        } else {
            self.gains.resize(order, 0.0);
        }

        for ((channel, tap), &w) in window.indexed_iter() {
            let mut power = 1.0;
            for (degree, gain) in self.gains.iter().enumerate() {
                power *= w;
                let coefficient = &mut state[[degree, channel, tap]];
                *coefficient += gain * power;
                if let Some(clip) = rule.clipping {
                    *coefficient = coefficient.clamp(-clip, clip);
                }
            }
        }

        Ok(prediction)
    }
}
