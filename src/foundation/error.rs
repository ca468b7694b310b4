pub type AutoframeResult<T> = Result<T, AutoframeError>;

#[derive(thiserror::Error, Debug)]
pub enum AutoframeError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("clip is too long: {duration_sec:.1}s exceeds the {max_sec}s limit")]
    ClipTooLong { duration_sec: f64, max_sec: u32 },

    #[error("missing filename")]
    MissingFilename,

    #[error("media error: {0}")]
    Media(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AutoframeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    pub fn clip_too_long(duration_sec: f64, max_sec: u32) -> Self {
        Self::ClipTooLong {
            duration_sec,
            max_sec,
        }
    }

    /// Errors that describe a problem with the user's input rather than a processing failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::ClipTooLong { .. } | Self::MissingFilename)
    }
}

impl From<serde_json::Error> for AutoframeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
