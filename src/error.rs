//! Errors and non-fatal diagnostics returned by the filters.

use core::fmt;

use thiserror::Error;

/// Fatal errors. A call returning one of these has not modified the filter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("n_filter must be a positive integer")]
    ZeroFilterLength,
    #[error("n_channel must be a positive integer")]
    ZeroChannelCount,
    #[error("idx_target ({idx_target}) must be smaller than n_filter ({n_filter})")]
    TargetIndexOutOfRange { idx_target: usize, n_filter: usize },
    #[error("step_scale must be positive, got {0}")]
    InvalidStepScale(f64),
    #[error("coefficient_clipping must be positive, got {0}")]
    InvalidClipping(f64),
    #[error("polynomial order must be a positive integer")]
    ZeroOrder,

    #[error("witness must be a 1D or 2D array, got {0} dimensions")]
    WitnessDimensions(usize),
    #[error("witness has {found} channels, the filter is configured for {expected}")]
    ChannelMismatch { expected: usize, found: usize },
    #[error("target has {target} samples, witness has {witness}")]
    LengthMismatch { witness: usize, target: usize },
    #[error("got {n_samples} samples, at least {minimum} are required")]
    InputTooShort { n_samples: usize, minimum: usize },
    #[error("target data must be supplied")]
    MissingTarget,

    #[error("signal energy overflowed ({0}), the input precision is insufficient")]
    EnergyOverflow(f64),
    #[error("correlation estimates are not finite, the input contains NaN or infinite values")]
    NonFiniteData,

    #[error("the filter must be conditioned before apply() can be used")]
    NotConditioned,

    #[error("invalid test signal configuration: {0}")]
    InvalidGenerator(&'static str),
    #[error("sample range {start}..{end} is out of bounds for {len} samples")]
    InvalidRange { start: usize, end: usize, len: usize },
}

/// Quality problems that do not stop the computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterWarning {
    /// The correlation matrix of a Wiener solve is rank deficient.
    NotFullRank,
    /// Some blocks of an updating Wiener filter had rank deficient correlation matrices.
    BlocksNotFullRank { deficient: usize, total: usize },
    /// `condition()` was called on a filter that fits itself during `apply()`.
    ConditionHasNoEffect,
}

impl fmt::Display for FilterWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterWarning::NotFullRank => write!(f, "filter is not of full rank"),
            FilterWarning::BlocksNotFullRank { deficient, total } => write!(
                f,
                "{} of {} updating Wiener filter blocks were not of full rank",
                deficient, total
            ),
            FilterWarning::ConditionHasNoEffect => {
                write!(f, "condition() is a placeholder for this filter, it has no effect")
            }
        }
    }
}

/// A result value together with the warnings raised while computing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<FilterWarning>,
}

impl<T> Outcome<T> {
    pub fn new(value: T) -> Self {
        Outcome {
            value,
            warnings: Vec::new(),
        }
    }

    /// Attaches a warning and forwards it to the `log` facade.
    pub fn with_warning(mut self, warning: FilterWarning) -> Self {
        log::warn!("{}", warning);
        self.warnings.push(warning);
        self
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}
