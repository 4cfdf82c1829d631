use std::{
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use roverlink_core::{
    frame::TelemetryReading,
    sleep::{Sleeper, StdSleeper},
    state::DriveState,
    transport::Transport,
};

use crate::{
    error::SessionError,
    event::{StatusCallback, StatusEvent, TelemetryCallback},
    receiver::Receiver,
    scheduler::CommandScheduler,
};

/// Connection lifecycle of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ConnectionState {
    /// No open transport.
    #[default]
    Disconnected = 0,
    /// A connect attempt is in flight.
    Connecting = 1,
    /// The transport is open and the receive loop is running.
    Connected = 2,
}

/// Shared, atomically updated [`ConnectionState`] cell.
///
/// The session owns the writes on the connect/close path; the receiver
/// stores `Disconnected` when the stream dies; the scheduler only reads,
/// one consistent load per tick.
#[derive(Debug, Default)]
pub(crate) struct ConnectionCell(AtomicU8);

impl ConnectionCell {
    pub(crate) fn load(&self) -> ConnectionState {
        match self.0.load(Ordering::Acquire) {
            0 => ConnectionState::Disconnected,
            1 => ConnectionState::Connecting,
            _ => ConnectionState::Connected,
        }
    }

    pub(crate) fn store(&self, state: ConnectionState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// Options for a [`Session`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionOption {
    /// Command transmission period.
    pub period: Duration,
}

impl Default for SessionOption {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(100),
        }
    }
}

/// Supervises one link to the rover: transport lifecycle, the background
/// receive loop, and the periodic command scheduler.
///
/// At most one receive loop and one connect attempt exist per session at any
/// time. All operations are driven from the owning thread; the two worker
/// threads only touch the shared drive state, the connection cell, and the
/// transport write side.
pub struct Session<T: Transport> {
    transport: Arc<Mutex<T>>,
    drive: Arc<DriveState>,
    connection: Arc<ConnectionCell>,
    on_telemetry: TelemetryCallback,
    on_status: StatusCallback,
    option: SessionOption,
    receiver: Option<Receiver>,
    scheduler: Option<CommandScheduler>,
}

impl<T: Transport + 'static> Session<T> {
    /// Creates a session over `transport`. The link stays disconnected until
    /// [`connect`](Self::connect).
    ///
    /// `on_telemetry` is invoked from the receive thread for every decoded
    /// reading; `on_status` from whichever thread observed the event.
    pub fn new(
        transport: T,
        on_telemetry: impl Fn(TelemetryReading) + Send + Sync + 'static,
        on_status: impl Fn(StatusEvent) + Send + Sync + 'static,
        option: SessionOption,
    ) -> Self {
        Self {
            transport: Arc::new(Mutex::new(transport)),
            drive: Arc::new(DriveState::new()),
            connection: Arc::new(ConnectionCell::default()),
            on_telemetry: Arc::new(on_telemetry),
            on_status: Arc::new(on_status),
            option,
            receiver: None,
            scheduler: None,
        }
    }

    /// Shared mode/intent state, written by UI/sensor collaborators and read
    /// by the command scheduler once per tick.
    #[must_use]
    pub fn drive_state(&self) -> Arc<DriveState> {
        self.drive.clone()
    }

    /// Current connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.load()
    }

    /// Equivalent to [`Self::connect_with_sleeper`] with [`StdSleeper`].
    pub fn connect(&mut self) -> Result<(), SessionError> {
        self.connect_with_sleeper(StdSleeper)
    }

    /// Opens the transport and, on success, starts the receive loop and the
    /// command scheduler.
    ///
    /// On failure any partially-opened resource is closed, the failure is
    /// reported, and the session stays disconnected; there is no automatic
    /// retry. A connect while already connected is a no-op.
    pub fn connect_with_sleeper<S>(&mut self, sleeper: S) -> Result<(), SessionError>
    where
        S: Sleeper + Send + 'static,
    {
        if self.connection.load() == ConnectionState::Connected {
            tracing::debug!("connect requested while already connected");
            return Ok(());
        }

        // Join workers left over from a previous connection before starting
        // new ones; there is never more than one receive loop.
        self.receiver.take();
        self.scheduler.take();

        self.connection.store(ConnectionState::Connecting);
        let reader = {
            let mut transport = self.transport.lock().unwrap();
            match transport.open().and_then(|()| transport.reader()) {
                Ok(reader) => reader,
                Err(e) => {
                    let _ = transport.close();
                    drop(transport);
                    self.connection.store(ConnectionState::Disconnected);
                    tracing::warn!("connect failed: {}", e);
                    (self.on_status)(StatusEvent::ConnectFailed(e.clone()));
                    return Err(e.into());
                }
            }
        };

        self.connection.store(ConnectionState::Connected);
        self.receiver = Some(Receiver::spawn(
            reader,
            self.connection.clone(),
            self.on_telemetry.clone(),
            self.on_status.clone(),
        ));
        self.scheduler = Some(CommandScheduler::spawn(
            self.transport.clone(),
            self.drive.clone(),
            self.connection.clone(),
            self.on_status.clone(),
            self.option.period,
            sleeper,
        ));
        tracing::info!("link connected");
        Ok(())
    }

    /// Connects unless the link is already up.
    ///
    /// The operator-triggered recovery path: a no-op while connected,
    /// otherwise identical to [`connect`](Self::connect).
    pub fn reconnect(&mut self) -> Result<(), SessionError> {
        if self.connection.load() == ConnectionState::Connected {
            tracing::debug!("reconnect requested but link is up");
            return Ok(());
        }
        self.connect()
    }

    /// Closes the transport and stops both workers. Idempotent.
    ///
    /// The session ends up disconnected even when closing the transport
    /// reports an error; that error is returned after teardown completes.
    pub fn close(&mut self) -> Result<(), SessionError> {
        // Gate the scheduler off before tearing the stream down.
        self.connection.store(ConnectionState::Disconnected);
        let result = self.transport.lock().unwrap().close();
        // The closed read end unblocks the receiver, so joining both guards
        // cannot hang.
        self.receiver.take();
        self.scheduler.take();
        match result {
            Ok(()) => {
                tracing::info!("link disconnected");
                Ok(())
            }
            Err(e) => {
                tracing::warn!("transport close reported: {}", e);
                Err(e.into())
            }
        }
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.connection.store(ConnectionState::Disconnected);
        if let Ok(mut transport) = self.transport.lock() {
            let _ = transport.close();
        }
        self.receiver.take();
        self.scheduler.take();
    }
}
