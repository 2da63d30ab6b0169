//! `[f64]` extensions.

/// `[f64]` extensions.
pub trait F64ArrayExt {
    /// Returns the maximum absolute value.
    fn peak_level(&self) -> f64;
    /// Returns the mean square value, i.e the total power of the signal.
    fn total_power(&self) -> f64;
    /// Returns the [root mean square](https://en.wikipedia.org/wiki/Root_mean_square)
    /// level.
    fn rms_level(&self) -> f64;
    /// Returns the arithmetic mean.
    fn mean_level(&self) -> f64;
}

impl F64ArrayExt for [f64] {
    fn peak_level(&self) -> f64 {
        self.iter().fold(0.0, |max, sample| max.max(sample.abs()))
    }

    fn total_power(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        };
        self.iter().map(|sample| sample * sample).sum::<f64>() / (self.len() as f64)
    }

    fn rms_level(&self) -> f64 {
        self.total_power().sqrt()
    }

    fn mean_level(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        };
        self.iter().sum::<f64>() / (self.len() as f64)
    }
}
