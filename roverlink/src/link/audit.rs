use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc, Mutex,
    },
    time::Duration,
};

use roverlink_core::transport::{Transport, TransportError, TransportReader};

/// Options for [`Audit`].
#[derive(Clone, Copy, Debug, Default)]
pub struct AuditOption {
    /// Fail every `open` call.
    pub fail_open: bool,
    /// Start with writes failing.
    pub broken: bool,
}

#[derive(Default)]
struct Shared {
    open: AtomicBool,
    broken: AtomicBool,
    written: Mutex<Vec<Vec<u8>>>,
    feed: Mutex<Option<mpsc::Sender<Vec<u8>>>>,
}

/// A [`Transport`] that records written frames and replays scripted incoming
/// bytes.
///
/// The test-side [`AuditHandle`] stays usable after the transport itself has
/// been moved into a session.
pub struct Audit {
    option: AuditOption,
    shared: Arc<Shared>,
    reader_rx: Option<mpsc::Receiver<Vec<u8>>>,
}

impl Audit {
    /// Creates a new [`Audit`].
    #[must_use]
    pub fn new(option: AuditOption) -> Self {
        Self {
            option,
            shared: Arc::default(),
            reader_rx: None,
        }
    }

    /// Returns the test-side handle.
    #[must_use]
    pub fn handle(&self) -> AuditHandle {
        AuditHandle {
            shared: self.shared.clone(),
        }
    }
}

/// Test-side view of an [`Audit`] transport.
#[derive(Clone)]
pub struct AuditHandle {
    shared: Arc<Shared>,
}

impl AuditHandle {
    /// Frames written so far, in order.
    #[must_use]
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.shared.written.lock().unwrap().clone()
    }

    /// Delivers `bytes` as one read window to the receive side. Dropped if
    /// the transport is not open.
    pub fn feed(&self, bytes: &[u8]) {
        if let Some(tx) = self.shared.feed.lock().unwrap().as_ref() {
            let _ = tx.send(bytes.to_vec());
        }
    }

    /// Simulates an asynchronous stream loss: the receive side sees end of
    /// stream while the transport still believes it is open.
    pub fn lose_stream(&self) {
        self.shared.feed.lock().unwrap().take();
    }

    /// Makes subsequent writes fail.
    pub fn break_down(&self) {
        self.shared.broken.store(true, Ordering::Release);
    }

    /// Makes subsequent writes succeed again.
    pub fn repair(&self) {
        self.shared.broken.store(false, Ordering::Release);
    }

    /// Whether the transport is currently open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.shared.open.load(Ordering::Acquire)
    }
}

struct AuditReader {
    rx: mpsc::Receiver<Vec<u8>>,
    shared: Arc<Shared>,
}

impl TransportReader for AuditReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        loop {
            match self.rx.recv_timeout(Duration::from_millis(1)) {
                Ok(bytes) => {
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    return Ok(n);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if !self.shared.open.load(Ordering::Acquire) {
                        return Ok(0);
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(0),
            }
        }
    }
}

impl Transport for Audit {
    fn open(&mut self) -> Result<(), TransportError> {
        if self.option.fail_open {
            return Err(TransportError::new("could not create socket"));
        }
        let (tx, rx) = mpsc::channel();
        *self.shared.feed.lock().unwrap() = Some(tx);
        self.reader_rx = Some(rx);
        self.shared.broken.store(self.option.broken, Ordering::Release);
        self.shared.open.store(true, Ordering::Release);
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.shared.open.store(false, Ordering::Release);
        self.shared.feed.lock().unwrap().take();
        self.reader_rx = None;
        Ok(())
    }

    fn write(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::closed());
        }
        if self.shared.broken.load(Ordering::Acquire) {
            return Err(TransportError::new("broken"));
        }
        self.shared.written.lock().unwrap().push(frame.to_vec());
        Ok(())
    }

    fn reader(&mut self) -> Result<Box<dyn TransportReader>, TransportError> {
        match self.reader_rx.take() {
            Some(rx) => Ok(Box::new(AuditReader {
                rx,
                shared: self.shared.clone(),
            })),
            None => Err(TransportError::closed()),
        }
    }

    fn is_open(&self) -> bool {
        self.shared.open.load(Ordering::Acquire)
    }
}
