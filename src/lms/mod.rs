//! [Least mean squares](https://en.wikipedia.org/wiki/Least_mean_squares_filter)
//! adaptive filters, optionally normalized (NLMS) and with polynomial terms.
//!
//! The coefficient update itself is done by an [`UpdateKernel`]. The default
//! [`FusedKernel`] avoids temporaries, [`ReferenceKernel`] is a plain array
//! implementation of the same update.
//!
//! # Examples
//! ## Noise cancellation
//!
//! Two witness sensors observe the same noise as the target, each with a bit of
//! sensor noise of its own. After a short settling phase the filter subtracts
//! almost all of the common noise.
//!
//! ```
//! use witness_fir::common::F64ArrayExt;
//! use witness_fir::evaluation::CorrelatedNoiseGenerator;
//! use witness_fir::lms::LmsFilter;
//! use witness_fir::PredictionFilter;
//!
//! let generator = CorrelatedNoiseGenerator::new(vec![0.1, 0.1]).unwrap();
//! let (witness, target) = generator.generate_seeded(10000, 123);
//!
//! let mut filter = LmsFilter::new(16, 0, 2).unwrap();
//! let prediction = filter
//!     .apply(&witness, Some(&target[..]), true, true)
//!     .unwrap()
//!     .into_value();
//!
//! // Give the filter time to converge
//! let residual: Vec<f64> = target[2000..]
//!     .iter()
//!     .zip(prediction[2000..].iter())
//!     .map(|(t, p)| t - p)
//!     .collect();
//! assert!(residual.rms_level() < 0.15);
//! ```

mod adaptive;
mod kernel;
mod lms_filter;
mod polynomial;

pub use kernel::{FusedKernel, ReferenceKernel, UpdateKernel, UpdateRule};
pub use lms_filter::{LmsFilter, LmsOptions};
pub use polynomial::{PolynomialLmsFilter, PolynomialLmsOptions};
