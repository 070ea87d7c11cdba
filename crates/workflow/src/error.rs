//! Workflow errors

use std::path::PathBuf;

use contracts::{ContractError, Stage};
use thiserror::Error;

/// Errors that abort a banner run
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: ContractError,
    },

    #[error("Stage '{stage}' returned no image")]
    NoImageReturned { stage: Stage },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WorkflowError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn stage(stage: Stage, source: ContractError) -> Self {
        Self::Stage { stage, source }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Stage the run was in when it failed, if known
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } | Self::NoImageReturned { stage } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_display() {
        let err = WorkflowError::stage(
            Stage::Synthesizing,
            ContractError::malformed("synthesizing", "no JSON object"),
        );
        let msg = err.to_string();
        assert!(msg.contains("synthesizing"));
        assert_eq!(err.failed_stage(), Some(Stage::Synthesizing));
    }

    #[test]
    fn test_io_has_no_stage() {
        let err = WorkflowError::io(
            "images/temp/temp.jpg",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("images/temp/temp.jpg"));
        assert_eq!(err.failed_stage(), None);
    }
}
