//! Tools for evaluating and testing filters: synthetic correlated noise and
//! residual quality metrics. The filters themselves do not depend on this module.

mod generator;
mod metrics;

pub use generator::CorrelatedNoiseGenerator;
pub use metrics::{residual_amplitude_ratio, residual_power_ratio};
