use crate::format::DecodeError;
use crate::params::CoercionError;
use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for configuration and argument failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Environment variable or parameter path that caused the error (e.g., "EC2_URL", "Filter.1.Name")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected format, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "settings", "legacy_adapter")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the client.
///
/// Every failure that can happen between argument parsing and printing the
/// response ends up here; [`Error::exit_code`] maps it to a process status.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    InvalidArguments(String),

    #[error("Unknown client: '{0}' is not a registered program")]
    UnknownClient(String),

    #[error("Unknown action '{action}' for service '{service}'")]
    UnknownAction { service: String, action: String },

    #[error("Invalid parameters: {0}")]
    Coercion(#[from] CoercionError),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error("Malformed response: {0}")]
    Decode(#[from] DecodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Process exit status reported for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Io(_) => 1,
            Error::InvalidArguments(_) => 2,
            Error::UnknownClient(_) | Error::UnknownAction { .. } => 3,
            Error::Coercion(_) => 4,
            Error::Configuration { .. } => 5,
            Error::Transport(_) => 6,
            Error::Decode(_) => 7,
        }
    }
}
