use thiserror::Error;

/// Failures raised by the transport layer before any domain context is attached.
#[derive(Debug, Error)]
pub enum TransportError {
    #[cfg(feature = "http")]
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Serialization error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

#[derive(Debug, Error)]
pub enum ActiniaError {
    /// A record decoded from the service is missing a field or has the wrong shape.
    #[error("Malformed {record}: {reason}")]
    MalformedDescriptor { record: String, reason: String },

    /// Transport failure, non-success status or unparsable response.
    #[error("Unable to {operation} for {target}: {source}")]
    RemoteUnavailable {
        operation: &'static str,
        target: String,
        #[source]
        source: TransportError,
    },

    #[error("Process chain needs one parameter map per module: got {modules} modules and {parameters} parameter maps")]
    ArityMismatch { modules: usize, parameters: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ActiniaError {
    pub(crate) fn malformed(record: impl Into<String>, reason: impl Into<String>) -> Self {
        ActiniaError::MalformedDescriptor {
            record: record.into(),
            reason: reason.into(),
        }
    }

    /// Wraps a transport failure with the attempted operation and its target, logging it.
    pub(crate) fn remote(
        operation: &'static str,
        target: impl Into<String>,
        source: TransportError,
    ) -> Self {
        let target = target.into();
        log::warn!("Unable to {} for {}: {}", operation, target, source);
        log::trace!("Error detail: {:?}", source);
        ActiniaError::RemoteUnavailable {
            operation,
            target,
            source,
        }
    }

    pub fn is_remote_unavailable(&self) -> bool {
        matches!(self, ActiniaError::RemoteUnavailable { .. })
    }
}

pub type Result<T, E = ActiniaError> = std::result::Result<T, E>;
