pub type HarnessResult<T> = Result<T, HarnessError>;

#[derive(thiserror::Error, Debug)]
pub enum HarnessError {
    #[error("allocation error: {0}")]
    Allocation(String),

    #[error("guard violation: {0}")]
    GuardViolation(String),

    #[error("output mismatch: {0}")]
    Mismatch(String),

    #[error("benchmark regression: {0}")]
    Regression(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HarnessError {
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation(msg.into())
    }

    pub fn guard_violation(msg: impl Into<String>) -> Self {
        Self::GuardViolation(msg.into())
    }

    pub fn mismatch(msg: impl Into<String>) -> Self {
        Self::Mismatch(msg.into())
    }

    pub fn regression(msg: impl Into<String>) -> Self {
        Self::Regression(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
