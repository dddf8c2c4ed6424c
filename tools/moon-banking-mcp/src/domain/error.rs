use thiserror::Error;

/// Per-call failures. None of these are fatal; the adapter turns every variant
/// into an error-flagged tool result.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
    #[error("API request failed: {status} {status_text} - {body}")]
    Upstream {
        status: u16,
        status_text: String,
        body: String,
    },
    #[error("API request could not be completed: {0}")]
    Transport(String),
}

impl DispatchError {
    pub fn invalid(tool: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::UnknownTool(_) => "unknown_tool",
            DispatchError::InvalidArguments { .. } => "invalid_arguments",
            DispatchError::Upstream { .. } => "upstream",
            DispatchError::Transport(_) => "transport",
        }
    }
}
