// Quiz wizard: step navigation, answer collection, tag scoring and the offline
// recommender. Apart from the registry and the handlers, nothing here does I/O.

pub mod collector;
pub mod fallback;
pub mod handlers;
pub mod navigator;
pub mod questions;
pub mod scoring;
pub mod wizard;

use thiserror::Error;

pub use navigator::WizardStepState;
pub use questions::QuestionBank;
pub use wizard::{WizardContext, WizardRegistry};

#[derive(Debug, Error, PartialEq)]
pub enum WizardError {
    #[error("a wizard needs at least one step")]
    NoSteps,

    #[error("please answer all questions (missing: {})", .0.join(", "))]
    MissingAnswers(Vec<String>),

    #[error("'{value}' is not an option for question '{question}'")]
    InvalidOption { question: String, value: String },

    #[error("field '{field}' must be a number")]
    InvalidNumber { field: String },

    #[error("finish all steps before submitting")]
    NotOnReviewStep,
}
