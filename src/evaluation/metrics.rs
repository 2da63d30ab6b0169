use core::ops::Range;

use crate::common::F64ArrayExt;
use crate::error::FilterError;

/// Power of the residual `target - prediction` relative to the power of the target.
///
/// # Arguments
///
/// * `target` - The target signal.
/// * `prediction` - The prediction, aligned with the target (i.e padded).
/// * `range` - Only evaluate these samples. Useful to skip the settling phase of adaptive filters.
/// * `remove_dc` - Subtract the mean from the target and the residual before comparing them.
pub fn residual_power_ratio(
    target: &[f64],
    prediction: &[f64],
    range: Option<Range<usize>>,
    remove_dc: bool,
) -> Result<f64, FilterError> {
    if target.len() != prediction.len() {
        return Err(FilterError::LengthMismatch {
            witness: prediction.len(),
            target: target.len(),
        });
    }
    let range = range.unwrap_or(0..target.len());
    let (target, prediction) = match (target.get(range.clone()), prediction.get(range.clone())) {
        (Some(target), Some(prediction)) => (target, prediction),
        _ => {
            return Err(FilterError::InvalidRange {
                start: range.start,
                end: range.end,
                len: target.len(),
            })
        }
    };

    let mut target = target.to_vec();
    let mut residual: Vec<f64> = target.iter().zip(prediction).map(|(t, p)| t - p).collect();
    if remove_dc {
        for signal in [&mut target, &mut residual] {
            let mean = signal.mean_level();
            signal.iter_mut().for_each(|value| *value -= mean);
        }
    }

    Ok(residual.total_power() / target.total_power())
}

/// Square root of [`residual_power_ratio`], i.e the residual RMS relative to the target RMS.
///
/// ```
/// use witness_fir::evaluation::residual_amplitude_ratio;
///
/// let target = [3.0, 4.0];
/// let prediction = [3.0 + 0.5f64.sqrt(), 4.0 - 0.5f64.sqrt()];
/// let ratio = residual_amplitude_ratio(&target, &prediction, None, false).unwrap();
/// assert!((ratio - 0.2).abs() < 1e-12);
/// ```
pub fn residual_amplitude_ratio(
    target: &[f64],
    prediction: &[f64],
    range: Option<Range<usize>>,
    remove_dc: bool,
) -> Result<f64, FilterError> {
    residual_power_ratio(target, prediction, range, remove_dc).map(f64::sqrt)
}
