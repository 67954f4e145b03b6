use thiserror::Error;

use crate::entity::ObjectKind;

/// Errors produced by the Scrumwise client.
///
/// Merge errors (`TypeMismatch`, `MissingId`, `MalformedFragment`) abort the
/// merge call that raised them. Transport errors (`Http`, `Network`,
/// `MissingDataVersion`) fail the API call that raised them, and a queued
/// batch reports them wrapped in `BatchAborted`.
#[derive(Debug, Error)]
pub enum ScrumwiseError {
    #[error("Type mismatch: expected {expected} fragment, found {}", found.as_deref().unwrap_or("<no objectType>"))]
    TypeMismatch {
        expected: ObjectKind,
        found: Option<String>,
    },

    #[error("{kind} fragment has no id")]
    MissingId { kind: ObjectKind },

    #[error("Malformed {kind} fragment: {source}")]
    MalformedFragment {
        kind: ObjectKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP {status} error from {endpoint}: {body}")]
    Http {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Network error calling {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    #[error("Response from {endpoint} carries no dataVersion")]
    MissingDataVersion { endpoint: String },

    #[error("Error to execute {call} (queued call #{index})")]
    BatchAborted {
        index: usize,
        call: String,
        #[source]
        source: Box<ScrumwiseError>,
    },

    #[error("{kind} {name} already exists")]
    AlreadyExists { kind: ObjectKind, name: String },

    #[error("{kind} {name} does not exist")]
    NotFound { kind: ObjectKind, name: String },

    #[error("{kind} is not initialised")]
    NotInitialised { kind: ObjectKind },

    #[error("Project {id} is not part of the current snapshot")]
    UnknownProject { id: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScrumwiseError>;

impl ScrumwiseError {
    /// True for errors raised by the remote call itself rather than by local state.
    pub fn is_transport_failure(&self) -> bool {
        match self {
            ScrumwiseError::Http { .. }
            | ScrumwiseError::Network { .. }
            | ScrumwiseError::MissingDataVersion { .. } => true,
            ScrumwiseError::BatchAborted { source, .. } => source.is_transport_failure(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_message() {
        let err = ScrumwiseError::TypeMismatch {
            expected: ObjectKind::Task,
            found: Some("Tag".to_string()),
        };
        assert_eq!(err.to_string(), "Type mismatch: expected Task fragment, found Tag");

        let err = ScrumwiseError::TypeMismatch {
            expected: ObjectKind::Project,
            found: None,
        };
        assert!(err.to_string().ends_with("<no objectType>"));
    }

    #[test]
    fn test_batch_aborted_is_transport_failure() {
        let err = ScrumwiseError::BatchAborted {
            index: 1,
            call: "addTask(name=T1)".to_string(),
            source: Box::new(ScrumwiseError::Http {
                endpoint: "addTask".to_string(),
                status: 500,
                body: String::new(),
            }),
        };
        assert!(err.is_transport_failure());
        assert!(err.to_string().contains("addTask(name=T1)"));

        let local = ScrumwiseError::NotFound {
            kind: ObjectKind::Task,
            name: "T1".to_string(),
        };
        assert!(!local.is_transport_failure());
    }
}
