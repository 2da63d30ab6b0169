//! [Wiener filters](https://en.wikipedia.org/wiki/Wiener_filter) fitted from
//! witness/target correlations.
//!
//! [`WienerFilter`] is conditioned once on a dataset with known target and then
//! applied to new data. [`UpdatingWienerFilter`] fits a fresh filter for every
//! block of `n_filter` samples from the data surrounding the block.
//!
//! # Examples
//!
//! ```
//! use witness_fir::evaluation::{residual_amplitude_ratio, CorrelatedNoiseGenerator};
//! use witness_fir::wiener::WienerFilter;
//! use witness_fir::PredictionFilter;
//!
//! let generator = CorrelatedNoiseGenerator::new(vec![0.1]).unwrap();
//! let (witness, target) = generator.generate_seeded(5000, 1);
//!
//! let mut filter = WienerFilter::new(16, 0, 1).unwrap();
//! filter.condition(&witness, &target).unwrap();
//! let prediction = filter.apply(&witness, None, true, false).unwrap().into_value();
//!
//! let ratio = residual_amplitude_ratio(&target, &prediction, Some(100..5000), false).unwrap();
//! assert!(ratio < 0.15);
//! ```

mod solve;
mod updating;
mod wiener_filter;

pub use solve::{wiener_apply, wiener_solve, WienerSolution};
pub use updating::{UpdatingWienerFilter, UpdatingWienerOptions};
pub use wiener_filter::WienerFilter;
