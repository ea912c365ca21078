/// Transport-layer errors produced by an outline source implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Connection or stream I/O failed.
    #[error("transport error: {message}")]
    Transport { message: String },
    /// The service answered with a non-success status.
    #[error("source request failed with status {status_code}: {message}")]
    Status { status_code: u16, message: String },
}

impl SourceError {
    /// Creates a transport-level error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a non-success status error.
    pub fn status(status_code: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status_code,
            message: message.into(),
        }
    }
}

/// Terminal stream failure surfaced through `OutlineUpdate::Failed`.
///
/// Cancellation is deliberately not a variant here: a cancelled session is
/// reported as `OutlineUpdate::Cancelled`, never as a failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum StreamFailure {
    /// The final args buffer still failed to decode at tool-call end.
    #[error("outline decode failed: {message}")]
    Decode { message: String },
    /// The producer reported an explicit error event.
    #[error("upstream error: {detail}")]
    Upstream { detail: String },
    /// The transport dropped or misbehaved mid-stream.
    #[error("transport failure: {message}")]
    Transport { message: String },
}

/// Top-level error type for the public streaming API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// Invalid streamer or source configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Terminal failure reported by a running session.
    #[error(transparent)]
    StreamFailed(StreamFailure),
    /// The session was cancelled by the caller before completing.
    #[error("stream cancelled")]
    Cancelled,
    /// Internal invariant violation.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<StreamFailure> for StreamError {
    fn from(value: StreamFailure) -> Self {
        StreamError::StreamFailed(value)
    }
}

pub(crate) fn failure_from_source_error(err: &SourceError) -> StreamFailure {
    match err {
        SourceError::Transport { message } => StreamFailure::Transport {
            message: message.clone(),
        },
        SourceError::Status {
            status_code,
            message,
        } => StreamFailure::Transport {
            message: format!("status {status_code}: {message}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_keep_their_code_in_the_failure_message() {
        let failure = failure_from_source_error(&SourceError::status(502, "bad gateway"));
        assert_eq!(
            failure,
            StreamFailure::Transport {
                message: "status 502: bad gateway".to_string()
            }
        );
    }
}
