use super::error::TransportError;

/// A trait that provides the duplex byte-stream interface with the remote
/// peripheral.
///
/// The receive side is exposed as a separate [`TransportReader`] handle so
/// that a background loop can block on reads while writes keep going through
/// the transport itself.
pub trait Transport: Send {
    /// Opens the transport.
    fn open(&mut self) -> Result<(), TransportError>;

    /// Closes the transport.
    ///
    /// Closing must also shut down the receive side so that a blocked
    /// [`TransportReader::read`] returns promptly. Closing an already-closed
    /// transport is a no-op.
    fn close(&mut self) -> Result<(), TransportError>;

    /// Writes one complete outgoing frame.
    fn write(&mut self, frame: &[u8]) -> Result<(), TransportError>;

    /// Returns a read handle sharing this transport's receive side.
    fn reader(&mut self) -> Result<Box<dyn TransportReader>, TransportError>;

    /// Checks if the transport is open.
    #[must_use]
    fn is_open(&self) -> bool;
}

/// Blocking read half of a [`Transport`].
pub trait TransportReader: Send {
    /// Reads into `buf`, blocking until data arrives.
    ///
    /// Returns `Ok(0)` when the stream has been closed; any error is likewise
    /// a terminal condition for the caller's read loop.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;
}

impl Transport for Box<dyn Transport> {
    fn open(&mut self) -> Result<(), TransportError> {
        self.as_mut().open()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.as_mut().close()
    }

    fn write(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.as_mut().write(frame)
    }

    fn reader(&mut self) -> Result<Box<dyn TransportReader>, TransportError> {
        self.as_mut().reader()
    }

    fn is_open(&self) -> bool {
        self.as_ref().is_open()
    }
}

impl TransportReader for Box<dyn TransportReader> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.as_mut().read(buf)
    }
}
