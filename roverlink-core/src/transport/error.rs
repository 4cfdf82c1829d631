use derive_more::Display;
use thiserror::Error;

#[derive(Error, Debug, Display, PartialEq, Eq, Clone)]
#[display("{}", msg)]
/// An error produced by the transport.
pub struct TransportError {
    msg: String,
}

impl TransportError {
    /// Creates a new [`TransportError`].
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }

    /// The error returned by operations on a closed transport.
    #[must_use]
    pub fn closed() -> Self {
        Self::new("transport is closed")
    }
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}
