//! Common algorithms and utilities.

mod correlation;
mod f64_array_ext;
mod layout;

pub use correlation::{cross_correlation_valid, multichannel_correlation, CompensatedSum};
pub use f64_array_ext::F64ArrayExt;
pub use layout::{make_2d_array, FilterLayout};
