//! FIR prediction filters for [correlated noise cancellation](https://en.wikipedia.org/wiki/Noise_cancellation)
//! with witness sensors.
//!
//! A set of witness sensors records signals that are correlated with the noise
//! in a target signal. The filters in this crate predict the target from the
//! witness signals, so that the prediction can be subtracted from the target.
//!
//! Filters
//! * [`WienerFilter`] - static filter conditioned on a dataset with known target.
//! * [`UpdatingWienerFilter`] - a Wiener filter refitted for every block of samples.
//! * [`LmsFilter`] - adaptive (normalized) least mean squares filter.
//! * [`PolynomialLmsFilter`] - LMS filter that also uses powers of the witness signals.
//!
//! All filters implement [`PredictionFilter`].
//!
//! # Examples
//!
//! ```
//! use witness_fir::evaluation::{residual_amplitude_ratio, CorrelatedNoiseGenerator};
//! use witness_fir::{PredictionFilter, WienerFilter};
//!
//! // Target noise with a single witness channel observing it
//! let generator = CorrelatedNoiseGenerator::new(vec![0.1]).unwrap();
//! let (witness, target) = generator.generate_seeded(10000, 1);
//!
//! let n_filter = 32;
//! let mut filter = WienerFilter::new(n_filter, 0, 1).unwrap();
//! let conditioned = filter.condition(&witness, &target).unwrap();
//! assert!(conditioned.value.full_rank);
//!
//! // The padded prediction is aligned with the target
//! let prediction = filter.apply(&witness, None, true, false).unwrap().into_value();
//! assert_eq!(prediction.len(), target.len());
//!
//! let ratio = residual_amplitude_ratio(&target, &prediction, Some(n_filter..10000), false).unwrap();
//! assert!(ratio < 0.15);
//! ```

pub mod common;
pub mod error;
pub mod evaluation;
mod filter;
pub mod lms;
pub mod wiener;

pub use error::{FilterError, FilterWarning, Outcome};
pub use filter::PredictionFilter;
pub use lms::{LmsFilter, PolynomialLmsFilter};
pub use wiener::{UpdatingWienerFilter, WienerFilter};
