use ndarray::{ArrayView, ArrayView2, Axis, Dimension, Ix2};

use crate::error::FilterError;

/// Adds a channel dimension to 1D arrays and leaves 2D arrays as they are.
/// This allows passing a single witness channel without wrapping it.
///
/// ```
/// use ndarray::{arr0, arr1, arr2};
/// use witness_fir::common::make_2d_array;
///
/// let single = arr1(&[1.0, 2.0]);
/// assert_eq!(make_2d_array(single.view()).unwrap(), arr2(&[[1.0, 2.0]]));
///
/// let scalar = arr0(1.0);
/// assert!(make_2d_array(scalar.view()).is_err());
/// ```
pub fn make_2d_array<'a, D: Dimension>(
    array: ArrayView<'a, f64, D>,
) -> Result<ArrayView2<'a, f64>, FilterError> {
    let array = array.into_dyn();
    let ndim = array.ndim();
    let array = match ndim {
        1 => array.insert_axis(Axis(0)),
        2 => array,
        _ => return Err(FilterError::WitnessDimensions(ndim)),
    };
    array
        .into_dimensionality::<Ix2>()
        .map_err(|_| FilterError::WitnessDimensions(ndim))
}

/// The data shape shared by all filters: FIR length, prediction position
/// and witness channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterLayout {
    /// Length of the FIR filter, i.e the number of witness samples per predicted sample.
    n_filter: usize,
    /// Position of the predicted sample within each filter window.
    idx_target: usize,
    /// Number of witness channels.
    n_channel: usize,
}

impl FilterLayout {
    pub fn new(n_filter: usize, idx_target: usize, n_channel: usize) -> Result<Self, FilterError> {
        if n_filter == 0 {
            return Err(FilterError::ZeroFilterLength);
        }
        if n_channel == 0 {
            return Err(FilterError::ZeroChannelCount);
        }
        if idx_target >= n_filter {
            return Err(FilterError::TargetIndexOutOfRange {
                idx_target,
                n_filter,
            });
        }
        Ok(FilterLayout {
            n_filter,
            idx_target,
            n_channel,
        })
    }

    pub fn n_filter(&self) -> usize {
        self.n_filter
    }

    pub fn idx_target(&self) -> usize {
        self.idx_target
    }

    pub fn n_channel(&self) -> usize {
        self.n_channel
    }

    /// Offset between the start of a filter window and the target sample it predicts.
    pub fn target_offset(&self) -> usize {
        self.n_filter - self.idx_target - 1
    }

    /// The shortest input accepted by `apply()` and `condition()`: two filter lengths.
    pub fn minimum_len(&self) -> usize {
        2 * self.n_filter
    }

    /// The number of valid (unpadded) predictions for an input of `n_samples`.
    pub fn prediction_len(&self, n_samples: usize) -> usize {
        (n_samples + 1).saturating_sub(self.n_filter)
    }

    /// Normalizes the witness to `channel × sample` and validates it against
    /// the layout and, if given, the target.
    pub fn check_data_dimensions<'a, D: Dimension>(
        &self,
        witness: ArrayView<'a, f64, D>,
        target: Option<&[f64]>,
    ) -> Result<ArrayView2<'a, f64>, FilterError> {
        let witness = make_2d_array(witness)?;
        if witness.nrows() != self.n_channel {
            return Err(FilterError::ChannelMismatch {
                expected: self.n_channel,
                found: witness.nrows(),
            });
        }
        if let Some(target) = target {
            if target.len() != witness.ncols() {
                return Err(FilterError::LengthMismatch {
                    witness: witness.ncols(),
                    target: target.len(),
                });
            }
        }
        if witness.ncols() < self.minimum_len() {
            return Err(FilterError::InputTooShort {
                n_samples: witness.ncols(),
                minimum: self.minimum_len(),
            });
        }
        Ok(witness)
    }

    /// Brings a prediction to its final length. Windows without a prediction
    /// are zero filled. With `pad`, the result is aligned with the target by
    /// adding `target_offset()` leading zeros and trailing zeros up to `n_samples`.
    pub fn finish_prediction(&self, mut prediction: Vec<f64>, n_samples: usize, pad: bool) -> Vec<f64> {
        prediction.resize(self.prediction_len(n_samples), 0.0);
        if !pad {
            return prediction;
        }
        let mut padded = Vec::with_capacity(n_samples);
        padded.resize(self.target_offset(), 0.0);
        padded.extend(prediction);
        padded.resize(n_samples, 0.0);
        padded
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{arr2, Array3};

    use super::*;

    #[test]
    fn test_construction_errors() {
        assert_eq!(FilterLayout::new(0, 0, 1), Err(FilterError::ZeroFilterLength));
        assert_eq!(FilterLayout::new(4, 0, 0), Err(FilterError::ZeroChannelCount));
        assert_eq!(
            FilterLayout::new(4, 4, 1),
            Err(FilterError::TargetIndexOutOfRange {
                idx_target: 4,
                n_filter: 4
            })
        );
        assert!(FilterLayout::new(4, 3, 1).is_ok());
    }

    #[test]
    fn test_make_2d_array() {
        let two_d = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(make_2d_array(two_d.view()).unwrap(), two_d);

        let single = [1.0, 2.0, 3.0];
        let result = make_2d_array(ArrayView::from(&single[..])).unwrap();
        assert_eq!(result.dim(), (1, 3));

        let three_d = Array3::<f64>::zeros((1, 2, 2));
        assert_eq!(
            make_2d_array(three_d.view()),
            Err(FilterError::WitnessDimensions(3))
        );
    }

    #[test]
    fn test_check_data_dimensions() {
        let layout = FilterLayout::new(2, 0, 2).unwrap();
        let witness = arr2(&[[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]]);
        assert!(layout.check_data_dimensions(witness.view(), Some(&[0.0; 4][..])).is_ok());
        assert!(layout.check_data_dimensions(witness.view(), None).is_ok());
        assert_eq!(
            layout.check_data_dimensions(witness.view(), Some(&[0.0; 3][..])),
            Err(FilterError::LengthMismatch {
                witness: 4,
                target: 3
            })
        );

        let single = [1.0; 4];
        assert_eq!(
            layout.check_data_dimensions(ArrayView::from(&single[..]), None),
            Err(FilterError::ChannelMismatch {
                expected: 2,
                found: 1
            })
        );

        let short = witness.slice(ndarray::s![.., ..3]);
        assert_eq!(
            layout.check_data_dimensions(short, None),
            Err(FilterError::InputTooShort {
                n_samples: 3,
                minimum: 4
            })
        );
    }

    #[test]
    fn test_finish_prediction() {
        let layout = FilterLayout::new(3, 1, 1).unwrap();
        assert_eq!(layout.target_offset(), 1);
        assert_eq!(layout.prediction_len(6), 4);

        let prediction = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(
            layout.finish_prediction(prediction.clone(), 6, true),
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 0.0]
        );
        assert_eq!(layout.finish_prediction(prediction, 6, false).len(), 4);

        // Uncovered windows are zero filled
        assert_eq!(
            layout.finish_prediction(vec![1.0, 2.0], 6, true),
            vec![0.0, 1.0, 2.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(
            layout.finish_prediction(vec![1.0, 2.0], 6, false),
            vec![1.0, 2.0, 0.0, 0.0]
        );
    }
}
