use log::debug;
use nalgebra::{DMatrix, DVector, SymmetricEigen};
use ndarray::{s, Array2, ArrayView1, ArrayView2};

use crate::common::{cross_correlation_valid, multichannel_correlation};
use crate::error::FilterError;

/// Relative cutoff below which eigenvalues are treated as zero by the pseudo-inverse.
const PSEUDO_INVERSE_RCOND: f64 = 1e-15;

/// The result of a Wiener filter calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct WienerSolution {
    /// FIR coefficients in time order, `n_channel × n_filter`.
    pub coefficients: Array2<f64>,
    /// Whether the witness correlation matrix had full rank.
    pub full_rank: bool,
}

/// Correlation between the target and a witness channel for lags `0..n_filter`,
/// with the witness shifted by `offset`.
fn target_correlation(
    target: ArrayView1<f64>,
    channel: ArrayView1<f64>,
    n_filter: usize,
    offset: usize,
) -> Vec<f64> {
    let overlap = target.len() - n_filter + 1;
    let mut lags = vec![0.0; n_filter];
    cross_correlation_valid(target, channel.slice(s![offset..offset + overlap]), &mut lags);
    lags
}

/// One sided correlation estimate for lags `0..n_filter`. Works down to a single filter length.
fn lag_correlation(a: ArrayView1<f64>, b: ArrayView1<f64>, n_filter: usize) -> Vec<f64> {
    let overlap = a.len() - n_filter + 1;
    let mut lags = vec![0.0; n_filter];
    cross_correlation_valid(a, b.slice(s![..overlap]), &mut lags);
    lags
}

/// Correlation estimate for lags `0..n_filter` that averages the positive and
/// negative lag. Requires at least three filter lengths of data.
fn symmetric_lag_correlation(a: ArrayView1<f64>, b: ArrayView1<f64>, n_filter: usize) -> Vec<f64> {
    let len = a.len();
    let mut raw = vec![0.0; 2 * n_filter + 1];
    cross_correlation_valid(a, b.slice(s![n_filter..len - n_filter]), &mut raw);

    let center = n_filter;
    (0..n_filter)
        .map(|lag| {
            if lag == 0 {
                raw[center]
            } else {
                (raw[center + lag] + raw[center - lag]) / 2.0
            }
        })
        .collect()
}

/// Calculates the FIR coefficients of a Wiener filter.
///
/// # Arguments
///
/// * `witness` - Witness data, `channel × sample`.
/// * `target` - Target data, as long as the witness rows.
/// * `n_filter` - Length of the FIR filter.
/// * `idx_target` - Position of the predicted sample within each filter window.
pub fn wiener_solve(
    witness: ArrayView2<f64>,
    target: ArrayView1<f64>,
    n_filter: usize,
    idx_target: usize,
) -> Result<WienerSolution, FilterError> {
    let n_samples = target.len();
    if witness.ncols() != n_samples {
        return Err(FilterError::LengthMismatch {
            witness: witness.ncols(),
            target: n_samples,
        });
    }
    if n_samples < n_filter {
        return Err(FilterError::InputTooShort {
            n_samples,
            minimum: n_filter,
        });
    }

    let n_channel = witness.nrows();
    let size = n_channel * n_filter;

    let r_ws: Vec<f64> = witness
        .outer_iter()
        .flat_map(|channel| target_correlation(target, channel, n_filter, idx_target))
        .collect();
    let r_ws = DVector::from_vec(r_ws);

    // Averaging both lag directions is only possible with enough data
    let symmetric = n_samples >= 3 * n_filter;
    let mut r_ww = DMatrix::zeros(size, size);
    for (a_index, a) in witness.outer_iter().enumerate() {
        for (b_index, b) in witness.outer_iter().enumerate() {
            let lags = if symmetric {
                symmetric_lag_correlation(a, b, n_filter)
            } else {
                lag_correlation(a, b, n_filter)
            };
            for i in 0..n_filter {
                for j in 0..n_filter {
                    r_ww[(a_index * n_filter + i, b_index * n_filter + j)] = lags[i.abs_diff(j)];
                }
            }
        }
    }

    if !r_ws.iter().chain(r_ww.iter()).all(|value| value.is_finite()) {
        return Err(FilterError::NonFiniteData);
    }

    // Pseudo-inverse through the eigendecomposition, the matrix may be singular
    // (e.g. for linearly dependent witness channels).
    let eigen = SymmetricEigen::new(r_ww);
    let max_eigenvalue = eigen.eigenvalues.amax();
    let rank_tolerance = max_eigenvalue * (size as f64) * f64::EPSILON;
    let rank = eigen
        .eigenvalues
        .iter()
        .filter(|eigenvalue| eigenvalue.abs() > rank_tolerance)
        .count();
    let full_rank = rank == size;

    let cutoff = PSEUDO_INVERSE_RCOND * max_eigenvalue;
    let mut projection = eigen.eigenvectors.tr_mul(&r_ws);
    for (value, eigenvalue) in projection.iter_mut().zip(eigen.eigenvalues.iter()) {
        *value = if eigenvalue.abs() > cutoff {
            *value / eigenvalue
        } else {
            0.0
        };
    }
    let solution = &eigen.eigenvectors * projection;

    debug!(
        "Wiener solve: {} channels, {} taps, {} samples, {} estimator, rank {}/{}",
        n_channel,
        n_filter,
        n_samples,
        if symmetric { "symmetric" } else { "one sided" },
        rank,
        size
    );

    // Correlation lags run opposite to the FIR time order
    let coefficients = Array2::from_shape_fn((n_channel, n_filter), |(channel, tap)| {
        solution[channel * n_filter + n_filter - 1 - tap]
    });

    Ok(WienerSolution {
        coefficients,
        full_rank,
    })
}

/// Applies Wiener filter coefficients to witness data.
///
/// Returns `witness.ncols() - n_filter + 1` predictions, computed in extended precision.
pub fn wiener_apply(coefficients: ArrayView2<f64>, witness: ArrayView2<f64>) -> Vec<f64> {
    multichannel_correlation(witness, coefficients)
}

#[cfg(test)]
mod tests {
    use ndarray::{arr2, stack, Array1, Axis};

    use super::*;
    use crate::evaluation::CorrelatedNoiseGenerator;

    fn white_noise(n_samples: usize, seed: u64) -> Array1<f64> {
        let (witness, _) = CorrelatedNoiseGenerator::new(vec![0.0])
            .unwrap()
            .generate_seeded(n_samples, seed);
        witness.row(0).to_owned()
    }

    #[test]
    fn test_recovers_known_fir() {
        let n_filter = 4;
        let taps = [0.5, 0.0, 0.0, 1.0];
        let witness = white_noise(20_000, 5);

        // target(n) = 0.5 w(n - 3) + w(n), i.e the newest sample of each window is the target
        let target: Array1<f64> = Array1::from_shape_fn(witness.len(), |i| {
            if i < 3 {
                witness[i]
            } else {
                0.5 * witness[i - 3] + witness[i]
            }
        });

        let witness = witness.insert_axis(Axis(0));
        let solution = wiener_solve(witness.view(), target.view(), n_filter, 0).unwrap();
        assert!(solution.full_rank);
        assert_eq!(solution.coefficients.dim(), (1, n_filter));
        for (coefficient, expected) in solution.coefficients.iter().zip(taps.iter()) {
            assert!(
                (coefficient - expected).abs() < 0.02,
                "{} != {}",
                coefficient,
                expected
            );
        }

        // Predictions line up with target[n + n_filter - 1]
        let prediction = wiener_apply(solution.coefficients.view(), witness.view());
        assert_eq!(prediction.len(), target.len() - n_filter + 1);
        for (k, p) in prediction.iter().enumerate().skip(10).take(100) {
            assert!((p - target[k + n_filter - 1]).abs() < 0.2);
        }
    }

    #[test]
    fn test_duplicate_channels_are_rank_deficient() {
        let channel = white_noise(4_000, 6);
        let target = white_noise(4_000, 7);
        let witness = stack![Axis(0), channel, channel];
        let solution = wiener_solve(witness.view(), target.view(), 32, 0).unwrap();
        assert!(!solution.full_rank);
        assert_eq!(solution.coefficients.dim(), (2, 32));
        assert!(solution.coefficients.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_short_input_uses_one_sided_estimate() {
        let n_filter = 8;
        // Shorter than three filter lengths
        let witness = white_noise(2 * n_filter, 8).insert_axis(Axis(0));
        let target = white_noise(2 * n_filter, 9);
        let solution = wiener_solve(witness.view(), target.view(), n_filter, 3).unwrap();
        assert_eq!(solution.coefficients.dim(), (1, n_filter));
        assert!(solution.coefficients.iter().all(|c| c.is_finite()));

        let too_short = witness.slice(s![.., ..n_filter - 1]);
        assert_eq!(
            wiener_solve(too_short, target.slice(s![..n_filter - 1]), n_filter, 3),
            Err(FilterError::InputTooShort {
                n_samples: n_filter - 1,
                minimum: n_filter
            })
        );
    }

    #[test]
    fn test_zero_witness() {
        let witness = Array2::<f64>::zeros((1, 64));
        let target = white_noise(64, 10);
        let solution = wiener_solve(witness.view(), target.view(), 4, 0).unwrap();
        assert!(!solution.full_rank);
        assert!(solution.coefficients.iter().all(|c| *c == 0.0));
    }

    #[test]
    fn test_non_finite_data() {
        let target = white_noise(256, 11);
        for bad in [f64::NAN, f64::INFINITY, 1e300] {
            let mut witness = white_noise(256, 12).insert_axis(Axis(0));
            witness[[0, 100]] = bad;
            assert_eq!(
                wiener_solve(witness.view(), target.view(), 8, 0),
                Err(FilterError::NonFiniteData)
            );
        }

        let witness = white_noise(256, 12).insert_axis(Axis(0));
        let mut target = target;
        target[50] = f64::NAN;
        assert_eq!(
            wiener_solve(witness.view(), target.view(), 8, 0),
            Err(FilterError::NonFiniteData)
        );
    }

    #[test]
    fn test_symmetric_lag_correlation() {
        let a = Array1::from_vec((0..12).map(|i| i as f64).collect());
        let lags = symmetric_lag_correlation(a.view(), a.view(), 3);
        let raw = |lag: i64| -> f64 {
            (3..9).map(|m| ((m as i64 + lag) as f64) * (m as f64)).sum()
        };
        assert_eq!(lags, vec![raw(0), (raw(1) + raw(-1)) / 2.0, (raw(2) + raw(-2)) / 2.0]);
    }

    #[test]
    fn test_wiener_apply() {
        let coefficients = arr2(&[[1.0, -1.0]]);
        let witness = arr2(&[[1.0, 3.0, 6.0, 10.0]]);
        assert_eq!(
            wiener_apply(coefficients.view(), witness.view()),
            vec![-2.0, -3.0, -4.0]
        );
    }
}
