//! Error types for text injection.

use std::time::Duration;

use ifw_core::error::IfwError;

/// Failure of an external injection backend.
#[derive(Debug, thiserror::Error)]
pub enum InjectionError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    Failed { program: String, status: String },
    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },
}

/// Errors from [`Dispatcher::inject`](crate::Dispatcher::inject).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Nothing to inject; rejected before any backend call.
    #[error("text is empty")]
    Empty,
    #[error(transparent)]
    Injection(#[from] InjectionError),
}

impl From<DispatchError> for IfwError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Empty => IfwError::Validation("empty".to_string()),
            DispatchError::Injection(e) => IfwError::Injection(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injection_error_display() {
        let err = InjectionError::Failed {
            program: "ydotool".into(),
            status: "exit status: 1".into(),
        };
        assert_eq!(err.to_string(), "ydotool exited with exit status: 1");

        let err = InjectionError::Timeout {
            program: "wl-copy".into(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "wl-copy timed out after 5s");
    }

    #[test]
    fn test_dispatch_error_into_ifw_error() {
        let err: IfwError = DispatchError::Empty.into();
        assert!(matches!(err, IfwError::Validation(_)));

        let err: IfwError = DispatchError::from(InjectionError::Spawn {
            program: "ydotool".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        })
        .into();
        match err {
            IfwError::Injection(msg) => assert!(msg.contains("ydotool")),
            other => panic!("Expected Injection variant, got {:?}", other),
        }
    }
}
