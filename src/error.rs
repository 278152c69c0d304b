use std::fmt;

use thiserror::Error;

use crate::backend::ApiError;
use crate::models::{DeviceType, WizardStage};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("email address is invalid")]
    InvalidEmail,

    #[error("password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("asset name '{0}' is already used in this catalog")]
    DuplicateName(String),

    #[error("regular price must be a positive number")]
    RegularPriceNotPositive,

    #[error("happy hour price cannot be negative")]
    HappyHourPriceNegative,

    #[error("specs are required for {0} assets")]
    SpecsRequired(DeviceType),

    #[error("at least one opening slot is required")]
    NoTimings,

    #[error("slot {index}: opening time {open} must be before closing time {close}")]
    TimingOrder {
        index: usize,
        open: String,
        close: String,
    },

    #[error("happy hour must start before it ends")]
    HappyHourWindow,

    #[error("happy hour discount must be between 0 and 100, got {0}")]
    DiscountOutOfRange(u32),

    #[error("add at least one asset before continuing")]
    NoAssets,

    #[error("game '{0}' is not available on this asset")]
    UnknownGame(String),
}

/// Rendered as a `; `-separated summary so callers can show every problem at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations(pub Vec<Violation>);

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join("; "))
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(Violations),

    #[error("Search for '{term}' failed: {cause}")]
    SearchFailed { term: String, cause: ApiError },

    #[error("{0}")]
    RemoteCommitFailed(String),

    #[error("Malformed server response: {0}")]
    MalformedServerResponse(String),

    #[error("Game {0} is already attached to this asset")]
    DuplicateItem(String),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("Order has no lines")]
    EmptyOrder,

    #[error("Action not available at stage {actual:?} (expected {expected:?})")]
    WrongStage {
        expected: WizardStage,
        actual: WizardStage,
    },

    #[error("A submission is already in progress")]
    SubmissionInFlight,

    #[error("Onboarding was abandoned")]
    Abandoned,

    #[error("Onboarding is closed")]
    WizardClosed,

    #[error("Request failed: {0}")]
    Api(#[from] ApiError),
}

impl AppError {
    pub fn validation(violations: Vec<Violation>) -> Self {
        AppError::Validation(Violations(violations))
    }

    /// Violations carried by a `Validation` error, empty for every other variant.
    pub fn violations(&self) -> &[Violation] {
        match self {
            AppError::Validation(v) => &v.0,
            _ => &[],
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
