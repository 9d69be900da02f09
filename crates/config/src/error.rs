use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

impl Error {
    #[must_use]
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidVar {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
