use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use roverlink_core::transport::{Transport, TransportError, TransportReader};

/// A [`Transport`] that goes nowhere and never produces telemetry.
///
/// Mainly used for examples.
#[derive(Default)]
pub struct Nop {
    open: Arc<AtomicBool>,
}

impl Nop {
    /// Creates a new [`Nop`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

struct NopReader {
    open: Arc<AtomicBool>,
}

impl TransportReader for NopReader {
    fn read(&mut self, _: &mut [u8]) -> Result<usize, TransportError> {
        // No data ever arrives; block until the transport is closed.
        while self.open.load(Ordering::Acquire) {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        Ok(0)
    }
}

impl Transport for Nop {
    fn open(&mut self) -> Result<(), TransportError> {
        self.open.store(true, Ordering::Release);
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.open.store(false, Ordering::Release);
        Ok(())
    }

    fn write(&mut self, _: &[u8]) -> Result<(), TransportError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(TransportError::closed())
        }
    }

    fn reader(&mut self) -> Result<Box<dyn TransportReader>, TransportError> {
        if !self.is_open() {
            return Err(TransportError::closed());
        }
        Ok(Box::new(NopReader {
            open: self.open.clone(),
        }))
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}
