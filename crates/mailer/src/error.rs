use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error(transparent)]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("invalid content type: {0}")]
    ContentType(#[from] lettre::message::header::ContentTypeErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
