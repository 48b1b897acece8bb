use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GradingError {
    #[error("invalid weights {assignment}/{quiz}/{exam}: {reason}")]
    InvalidWeights {
        assignment: i32,
        quiz: i32,
        exam: i32,
        reason: &'static str,
    },

    #[error("invalid {component} score {value}: scores must be between 0 and 100")]
    InvalidScore { component: &'static str, value: i32 },

    #[error("no grade rows found for {0}")]
    EmptyInput(String),
}

pub type GradingResult<T> = Result<T, GradingError>;
