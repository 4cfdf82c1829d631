//! TCP byte-stream transport for roverlink.
//!
//! The rover's serial radio is exposed on the network by a serial-to-TCP
//! bridge; this transport connects to that bridge and relays the raw byte
//! stream in both directions.

use std::{
    io::{Read, Write},
    net::{Shutdown, SocketAddr, TcpStream},
    time::Duration,
};

use roverlink_core::transport::{Transport, TransportError, TransportReader};

/// Options for [`TcpLink`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpOption {
    /// Timeout for connecting and for write operations. The default is
    /// `None`, which means no timeout.
    pub timeout: Option<Duration>,
}

/// A [`Transport`] over a [`TcpStream`].
pub struct TcpLink {
    addr: SocketAddr,
    option: TcpOption,
    stream: Option<TcpStream>,
}

impl TcpLink {
    /// Creates a new [`TcpLink`]. The stream is not connected until
    /// [`Transport::open`].
    #[must_use]
    pub const fn new(addr: SocketAddr, option: TcpOption) -> Self {
        Self {
            addr,
            option,
            stream: None,
        }
    }
}

struct TcpReader {
    stream: TcpStream,
}

impl TransportReader for TcpReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        Ok(self.stream.read(buf)?)
    }
}

impl Transport for TcpLink {
    fn open(&mut self) -> Result<(), TransportError> {
        let stream = if let Some(timeout) = self.option.timeout {
            TcpStream::connect_timeout(&self.addr, timeout)
        } else {
            TcpStream::connect(self.addr)
        }?;
        stream.set_write_timeout(self.option.timeout)?;
        // Reads block without a timeout; shutting the socket down in `close`
        // is the designated wakeup signal for a blocked reader.
        tracing::info!("opened tcp transport to {}", self.addr);
        self.stream = Some(stream);
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if let Some(stream) = self.stream.take() {
            stream.shutdown(Shutdown::Both)?;
            tracing::info!("closed tcp transport to {}", self.addr);
        }
        Ok(())
    }

    fn write(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        match self.stream.as_mut() {
            Some(stream) => Ok(stream.write_all(frame)?),
            None => Err(TransportError::closed()),
        }
    }

    fn reader(&mut self) -> Result<Box<dyn TransportReader>, TransportError> {
        match self.stream.as_ref() {
            Some(stream) => Ok(Box::new(TcpReader {
                stream: stream.try_clone()?,
            })),
            None => Err(TransportError::closed()),
        }
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    fn bridge() -> (TcpListener, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        (listener, addr)
    }

    #[test]
    fn open_write_read_close() -> anyhow::Result<()> {
        let (listener, addr) = bridge();
        let server = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
            let (mut peer, _) = listener.accept()?;
            peer.write_all(b"42.0\n")?;
            let mut frame = [0u8; 16];
            let n = peer.read(&mut frame)?;
            Ok(frame[..n].to_vec())
        });

        let mut link = TcpLink::new(addr, TcpOption::default());
        assert!(!link.is_open());
        link.open()?;
        assert!(link.is_open());

        let mut reader = link.reader()?;
        let mut buf = [0u8; 256];
        let n = reader.read(&mut buf)?;
        assert_eq!(b"42.0\n", &buf[..n]);

        link.write(b"m238n238")?;
        assert_eq!(b"m238n238".to_vec(), server.join().unwrap()?);

        link.close()?;
        assert!(!link.is_open());
        Ok(())
    }

    #[test]
    fn close_unblocks_a_pending_read() -> anyhow::Result<()> {
        let (listener, addr) = bridge();
        let server = std::thread::spawn(move || listener.accept());

        let mut link = TcpLink::new(addr, TcpOption::default());
        link.open()?;
        let _peer = server.join().unwrap()?;

        let mut reader = link.reader()?;
        let pending = std::thread::spawn(move || {
            let mut buf = [0u8; 256];
            reader.read(&mut buf)
        });
        std::thread::sleep(Duration::from_millis(20));
        link.close()?;

        // a shut-down socket reports either EOF or an error; both terminate
        // the caller's read loop
        assert!(matches!(pending.join().unwrap(), Ok(0) | Err(_)));
        Ok(())
    }

    #[test]
    fn operations_on_a_closed_link_fail() {
        let (_listener, addr) = bridge();
        let mut link = TcpLink::new(addr, TcpOption::default());
        assert_eq!(Err(TransportError::closed()), link.write(b"m0n0"));
        assert!(link.reader().is_err());
        assert!(link.close().is_ok());
    }

    #[test]
    fn connect_failure() {
        // nothing listens on the listener's port once it is dropped
        let (listener, addr) = bridge();
        drop(listener);
        let mut link = TcpLink::new(
            addr,
            TcpOption {
                timeout: Some(Duration::from_millis(200)),
            },
        );
        assert!(link.open().is_err());
        assert!(!link.is_open());
    }
}
