use std::fmt;

use thiserror::Error;

use crate::normalize::{EntityKind, NormalizeError};
use crate::remote_client::ClientError;

/// The four user-triggered workflow transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    UploadResume,
    SaveJob,
    FetchScore,
    Tailor,
}

impl Operation {
    /// Prefix of the single-line notification shown when this transition fails.
    pub fn failure_label(self) -> &'static str {
        match self {
            Operation::UploadResume => "Upload failed",
            Operation::SaveJob => "Save JD failed",
            Operation::FetchScore => "ATS failed",
            Operation::Tailor => "Tailor failed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::UploadResume => "upload resume",
            Operation::SaveJob => "save job description",
            Operation::FetchScore => "fetch ATS score",
            Operation::Tailor => "tailor resume",
        })
    }
}

/// Workflow-level error type.
/// Every variant is rendered into exactly one user-facing notification by the coordinator.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Transport failure, timeout, non-2xx status or rejected input. Never retried.
    #[error("{source}")]
    Network {
        operation: Operation,
        #[source]
        source: ClientError,
    },

    #[error("{kind} response missing id")]
    MissingIdentifier { kind: EntityKind },

    #[error("{operation} requires {missing}")]
    PreconditionFailed {
        operation: Operation,
        missing: &'static str,
    },
}

impl WorkflowError {
    pub fn network(operation: Operation, source: ClientError) -> Self {
        WorkflowError::Network { operation, source }
    }
}

impl From<NormalizeError> for WorkflowError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::MissingIdentifier { kind } => WorkflowError::MissingIdentifier { kind },
        }
    }
}
