use thiserror::Error;

use crate::client::armor;

/// Errors that can arise while talking to the builder port.
#[derive(Debug, Error)]
pub enum BuilderPortError {
    /// Operation attempted without a bound transport, or the peer closed
    /// the connection mid-read.
    #[error("not connected to the builder port")]
    NotConnected,

    /// The server answered with an `ERROR <code> <message_b64>` reply.
    /// Authentication failures surface here with code 401.
    #[error("protocol error {code}: {message}")]
    Protocol { code: u16, message: String },

    /// Wrapper around IO errors at any suspension point.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuilderPortError {
    /// Parse an `ERROR <code> <message_b64>` line into a typed error.
    /// Lines that do not fit the shape fold to `(500, "Unknown error")`.
    pub(crate) fn from_error_line(line: &str) -> Self {
        let mut tokens = line.split_whitespace();
        let _tag = tokens.next();
        let code = tokens.next().and_then(|t| t.parse::<u16>().ok());
        let message = tokens.next().map(armor::decode);
        match (code, message) {
            (Some(code), Some(message)) => BuilderPortError::Protocol { code, message },
            _ => BuilderPortError::Protocol {
                code: 500,
                message: "Unknown error".to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, BuilderPortError>;
