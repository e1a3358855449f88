use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SpdError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("Archive Error: {0}")]
    Zip(#[from] Arc<zip::result::ZipError>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Tool bootstrap failed: {0}")]
    ToolBootstrap(String),

    #[error("{0}")]
    Acquisition(String),

    #[error("{0}")]
    Transcode(String),

    #[error("Failed to execute command: {0}")]
    CommandExec(String),

    #[error("Generic Error: {0}")]
    Generic(String),
}

impl SpdError {
    /// True for errors whose message is meant for the person who submitted the job.
    ///
    /// Everything else is internal and gets replaced by a generic message at the
    /// HTTP boundary.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            SpdError::InvalidInput(_)
                | SpdError::ToolBootstrap(_)
                | SpdError::Acquisition(_)
                | SpdError::Transcode(_)
        )
    }
}

impl From<std::io::Error> for SpdError {
    fn from(err: std::io::Error) -> Self {
        SpdError::Io(Arc::new(err))
    }
}

impl From<zip::result::ZipError> for SpdError {
    fn from(err: zip::result::ZipError) -> Self {
        SpdError::Zip(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, SpdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert_and_are_internal() {
        let err: SpdError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, SpdError::Io(_)));
        assert!(!err.is_user_facing());
    }

    #[test]
    fn acquisition_message_is_passed_through_verbatim() {
        let err = SpdError::Acquisition("All providers failed.\n\n[a] failed".into());
        assert!(err.is_user_facing());
        assert_eq!(err.to_string(), "All providers failed.\n\n[a] failed");
    }
}
