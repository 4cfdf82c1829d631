use std::{sync::Arc, thread::JoinHandle};

use roverlink_core::{frame, transport::TransportReader};

use crate::{
    event::{StatusCallback, StatusEvent, TelemetryCallback},
    session::{ConnectionCell, ConnectionState},
};

/// Size of the receive window. A read never returns more than this per call.
const READ_BUFFER_SIZE: usize = 256;

/// Guard over the background receive loop; joins the thread on drop.
///
/// Dropping the guard only joins, it does not unblock: the owner must close
/// the transport's read end first.
pub(crate) struct Receiver {
    handle: Option<JoinHandle<()>>,
}

impl Receiver {
    /// Spawns the receive loop over `reader`.
    ///
    /// The loop is a pure byte-to-reading pipeline with no knowledge of the
    /// drive mode: every successful read's window goes through the frame
    /// codec and every decoded reading to the telemetry callback. The first
    /// read error or end-of-stream is the sole termination signal; the loop
    /// never times out and never retries. On termination it marks the link
    /// disconnected so the scheduler stops transmitting.
    pub(crate) fn spawn(
        mut reader: Box<dyn TransportReader>,
        connection: Arc<ConnectionCell>,
        on_telemetry: TelemetryCallback,
        on_status: StatusCallback,
    ) -> Self {
        let handle = std::thread::spawn(move || {
            let mut buf = [0u8; READ_BUFFER_SIZE];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => {
                        tracing::debug!("receive stream reached end of stream");
                        break;
                    }
                    Ok(n) => {
                        if let Some(reading) = frame::decode(&buf[..n]) {
                            tracing::trace!("telemetry: {}", reading);
                            on_telemetry(reading);
                        }
                    }
                    Err(e) => {
                        tracing::debug!("receive stream terminated: {}", e);
                        break;
                    }
                }
            }
            // Deliberate teardown stores Disconnected before closing the
            // stream; only an asynchronous loss is reported as an event.
            let lost = connection.load() == ConnectionState::Connected;
            connection.store(ConnectionState::Disconnected);
            if lost {
                tracing::warn!("link lost, marking session disconnected");
                on_status(StatusEvent::ReceiveStopped);
            }
        });
        Self {
            handle: Some(handle),
        }
    }
}

impl Drop for Receiver {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
    };

    use roverlink_core::transport::TransportError;

    use super::*;

    struct ScriptedReader {
        windows: VecDeque<Result<Vec<u8>, TransportError>>,
    }

    impl ScriptedReader {
        fn new(windows: impl IntoIterator<Item = Result<Vec<u8>, TransportError>>) -> Box<Self> {
            Box::new(Self {
                windows: windows.into_iter().collect(),
            })
        }
    }

    impl TransportReader for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
            match self.windows.pop_front() {
                Some(Ok(bytes)) => {
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    Ok(n)
                }
                Some(Err(e)) => Err(e),
                None => Ok(0),
            }
        }
    }

    fn run(
        windows: impl IntoIterator<Item = Result<Vec<u8>, TransportError>>,
        initial: ConnectionState,
    ) -> (Vec<i32>, Vec<StatusEvent>, ConnectionState) {
        let connection = Arc::new(ConnectionCell::default());
        connection.store(initial);
        let readings = Arc::new(Mutex::new(Vec::new()));
        let events = Arc::new(Mutex::new(Vec::new()));
        {
            let _receiver = Receiver::spawn(
                ScriptedReader::new(windows),
                connection.clone(),
                Arc::new({
                    let readings = readings.clone();
                    move |r| readings.lock().unwrap().push(r.value())
                }),
                Arc::new({
                    let events = events.clone();
                    move |e| events.lock().unwrap().push(e)
                }),
            );
            // guard drop joins the loop
        }
        let readings = readings.lock().unwrap().clone();
        let events = events.lock().unwrap().clone();
        (readings, events, connection.load())
    }

    #[test]
    fn delivers_each_complete_line_once() {
        let (readings, _, _) = run(
            [Ok(b"42.0\n".to_vec()), Ok(b"17.5\n".to_vec())],
            ConnectionState::Connected,
        );
        assert_eq!(vec![42, 18], readings);
    }

    #[test]
    fn partial_windows_yield_nothing() {
        let (readings, _, _) = run(
            [Ok(b"17".to_vec()), Ok(b"abc\n".to_vec())],
            ConnectionState::Connected,
        );
        assert!(readings.is_empty());
    }

    #[test]
    fn read_error_marks_disconnected_and_reports() {
        let (readings, events, state) = run(
            [
                Ok(b"3\n".to_vec()),
                Err(TransportError::new("stream fault")),
            ],
            ConnectionState::Connected,
        );
        assert_eq!(vec![3], readings);
        assert_eq!(vec![StatusEvent::ReceiveStopped], events);
        assert_eq!(ConnectionState::Disconnected, state);
    }

    #[test]
    fn deliberate_close_is_not_reported_as_loss() {
        // Session teardown stores Disconnected before the read unblocks.
        let (_, events, state) = run([], ConnectionState::Disconnected);
        assert!(events.is_empty());
        assert_eq!(ConnectionState::Disconnected, state);
    }
}
