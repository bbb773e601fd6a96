//! Server status vocabulary normalization.
//!
//! The backend reports job state under either a `status` or a `state`
//! key, with arbitrary casing and a drifting vocabulary. Everything is
//! normalized here, at the boundary, into a closed enum; unrecognized
//! values are read as "still working", never as errors.

use serde_json::Value;

/// Closed job status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Queued, or an unrecognized non-terminal server status.
    Pending,
    Processing,
    /// Terminal success.
    Completed,
    /// Terminal failure.
    Failed,
}

impl JobStatus {
    /// Normalize one raw status string.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PROCESSING" | "RUNNING" => Self::Processing,
            "COMPLETED" => Self::Completed,
            "FAILED" | "ERROR" => Self::Failed,
            "PENDING" => Self::Pending,
            // Tolerate vocabulary drift: unknown means still working.
            _ => Self::Pending,
        }
    }

    /// Extract and normalize the status from a raw status document.
    /// Accepts `status` or `state`; a document with neither is read as
    /// still processing.
    pub fn from_response(body: &Value) -> Self {
        let raw = body
            .get("status")
            .and_then(Value::as_str)
            .or_else(|| body.get("state").and_then(Value::as_str))
            .unwrap_or("PROCESSING");
        Self::parse(raw)
    }

    /// No further transitions happen from a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}
