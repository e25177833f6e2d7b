use thiserror::Error;

/// Device-facing error taxonomy. The API boundary downcasts these out of
/// `anyhow::Error` to pick a status code; nothing below the boundary
/// formats them for HTTP.
#[derive(Debug, Error)]
pub enum EapiError {
    /// Malformed input, rejected before any device call
    #[error("invalid input: {0}")]
    Validation(String),

    /// Network/timeout/TLS failure reaching the switch
    #[error("device unreachable: {0}")]
    Communication(String),

    /// The switch accepted the connection but rejected a command.
    /// The message is the device's own, verbatim; never retried.
    #[error("device rejected command: {message}")]
    Command {
        message: String,
        failed_command: Option<String>,
    },
}

impl EapiError {
    pub fn command(message: impl Into<String>) -> Self {
        Self::Command {
            message: message.into(),
            failed_command: None,
        }
    }
}
