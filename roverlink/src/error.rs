use roverlink_core::transport::TransportError;
use thiserror::Error;

/// An error returned by [`Session`] operations.
///
/// [`Session`]: crate::Session
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum SessionError {
    /// The underlying transport failed.
    #[error("{0}")]
    Transport(#[from] TransportError),
}
