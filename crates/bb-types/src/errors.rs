use thiserror::Error;

use crate::arm::MetricChannel;

/// Main error type for the BanditBench system
#[derive(Error, Debug)]
pub enum BanditError {
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Allocation error: {0}")]
    Allocation(#[from] AllocationError),

    #[error("Arm error: {0}")]
    Arm(#[from] ArmError),

    #[error("Bookkeeping error: {0}")]
    Bookkeeping(#[from] BookkeepingError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Precondition and numeric failures raised by a search strategy
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("{strategy} search requires at least one arm")]
    EmptyArmSet { strategy: String },

    #[error("{strategy} search requires a positive budget")]
    ZeroBudget { strategy: String },

    #[error("{strategy} search needs a budget of at least {required} pulls, got {budget}")]
    BudgetTooSmall {
        strategy: String,
        budget: usize,
        required: usize,
    },

    #[error("{strategy} search needs at least {required} arms, got {num_arms}")]
    TooFewArms {
        strategy: String,
        num_arms: usize,
        required: usize,
    },

    #[error("Arm {key} has no {channel} metric yet")]
    MissingMetric { key: String, channel: MetricChannel },

    #[error("Numeric degeneracy: {message}")]
    NumericDegeneracy { message: String },
}

/// Arm pool allocation errors
#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("Requested {requested} arms but the pool only holds {available}")]
    ExceedsUniverse { requested: usize, available: usize },

    #[error("Allocation must request at least one arm")]
    ZeroRequest,
}

/// Failures reported by an arm implementation
#[derive(Error, Debug)]
pub enum ArmError {
    #[error("Pull failed: {message}")]
    PullFailed { message: String },
}

/// Episode bookkeeping errors
#[derive(Error, Debug)]
pub enum BookkeepingError {
    #[error("Episode already recorded for {info}")]
    DuplicateEpisode { info: String },
}

/// Result type alias for BanditBench operations
pub type BanditResult<T> = Result<T, BanditError>;

/// Macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::BanditError::Validation(format!($($arg)*))
    };
}

/// Macro for creating internal errors
#[macro_export]
macro_rules! internal_error {
    ($($arg:tt)*) => {
        $crate::BanditError::Internal(format!($($arg)*))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::BanditError::Config(format!($($arg)*))
    };
}
