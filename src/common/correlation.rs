use ndarray::{s, ArrayView1, ArrayView2};

/// Computes the valid part of the [cross-correlation](https://en.wikipedia.org/wiki/Cross-correlation)
/// of `a` and `v`, i.e `result[k] = Σ_n a[n + k] · v[n]`.
///
/// # Arguments
///
/// * `a` - The longer input signal.
/// * `v` - The shorter input signal.
/// * `result` - A buffer to write the result to. Must not be longer than `a.len() - v.len() + 1`.
pub fn cross_correlation_valid(a: ArrayView1<f64>, v: ArrayView1<f64>, result: &mut [f64]) {
    if v.len() > a.len() {
        panic!("The second correlation input must not be longer than the first.");
    }
    let lag_count = a.len() - v.len() + 1;
    if result.len() > lag_count {
        panic!(
            "Got cross-correlation buffer of length {}, at most {} lags are valid.",
            result.len(),
            lag_count
        )
    }

    let n = v.len();
    for (lag, value) in result.iter_mut().enumerate() {
        *value = a.slice(s![lag..lag + n]).dot(&v);
    }
}

/// Returns `(s, e)` with `s = fl(a + b)` and `a + b = s + e` exactly.
#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bb = s - a;
    (s, (a - (s - bb)) + (b - bb))
}

/// Returns `(p, e)` with `p = fl(a · b)` and `a · b = p + e` exactly.
#[inline]
fn two_product(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    (p, a.mul_add(b, -p))
}

/// Accumulator that tracks the rounding error of every addition and product,
/// giving roughly twice the working precision of plain `f64` summation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    pub fn add(&mut self, value: f64) {
        let (sum, error) = two_sum(self.sum, value);
        self.sum = sum;
        self.compensation += error;
    }

    pub fn add_product(&mut self, a: f64, b: f64) {
        let (product, product_error) = two_product(a, b);
        self.add(product);
        self.compensation += product_error;
    }

    pub fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Sums the valid cross-correlations of every row of `signals` with the
/// matching row of `taps`, in extended precision.
///
/// Returns `signals.ncols() - taps.ncols() + 1` values.
pub fn multichannel_correlation(signals: ArrayView2<f64>, taps: ArrayView2<f64>) -> Vec<f64> {
    assert_eq!(signals.nrows(), taps.nrows());
    assert!(taps.ncols() <= signals.ncols());

    let n_taps = taps.ncols();
    let output_len = signals.ncols() - n_taps + 1;
    let mut accumulators = vec![CompensatedSum::default(); output_len];
    for (signal, channel_taps) in signals.outer_iter().zip(taps.outer_iter()) {
        for (k, accumulator) in accumulators.iter_mut().enumerate() {
            let window = signal.slice(s![k..k + n_taps]);
            for (x, h) in window.iter().zip(channel_taps.iter()) {
                accumulator.add_product(*x, *h);
            }
        }
    }
    accumulators.iter().map(CompensatedSum::value).collect()
}
