use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread::JoinHandle,
    time::Duration,
};

use roverlink_core::{
    frame::{Command, Mode, DEFAULT_SPEED},
    sleep::Sleeper,
    state::DriveState,
    transport::Transport,
};

use crate::{
    event::{StatusCallback, StatusEvent},
    session::{ConnectionCell, ConnectionState},
};

/// Builds the outgoing command from one consistent snapshot of the drive
/// state.
///
/// In button mode at most one directional flag takes effect per tick, in the
/// fixed priority forward, reverse, right, left; no flag means stop. Tilt
/// mode carries the sensor-written speed pair through unchanged. Automatic
/// and idle transmit a placeholder (0, 0).
pub(crate) fn build_command(drive: &DriveState) -> Command {
    let (mode, intent) = drive.snapshot();
    let (left, right) = match mode {
        Mode::ManualButton => {
            if intent.forward {
                (DEFAULT_SPEED, DEFAULT_SPEED)
            } else if intent.reverse {
                (-DEFAULT_SPEED, -DEFAULT_SPEED)
            } else if intent.right {
                (DEFAULT_SPEED, -DEFAULT_SPEED)
            } else if intent.left {
                (-DEFAULT_SPEED, DEFAULT_SPEED)
            } else {
                (0, 0)
            }
        }
        Mode::ManualTilt => intent.tilt,
        Mode::Automatic | Mode::Idle => (0, 0),
    };
    Command::new(mode, left, right)
}

/// One scheduler tick: gate on the connection, build, validate, transmit.
///
/// Ticks while not connected are skipped, never queued. An out-of-range
/// speed pair is replaced by (0, 0) and reported; it never reaches the wire.
/// A write failure is reported and otherwise ignored, the next tick retries
/// naturally.
pub(crate) fn tick<T: Transport>(
    transport: &Mutex<T>,
    drive: &DriveState,
    connection: &ConnectionCell,
    on_status: &StatusCallback,
) {
    if connection.load() != ConnectionState::Connected {
        return;
    }

    let mut command = build_command(drive);
    if !command.in_bounds() {
        tracing::warn!(
            "speed ({}, {}) out of range, stopping motors",
            command.left(),
            command.right()
        );
        on_status(StatusEvent::BoundsViolation {
            left: command.left(),
            right: command.right(),
        });
        command = Command::new(command.mode(), 0, 0);
    }

    let frame = command.encode();
    let result = match transport.lock() {
        Ok(mut transport) => transport.write(&frame),
        Err(_) => return,
    };
    match result {
        Ok(()) => tracing::trace!("sent {}", command),
        Err(e) => {
            tracing::warn!("command write failed: {}", e);
            on_status(StatusEvent::WriteFailed(e));
        }
    }
}

/// Guard over the periodic command transmission thread; stops and joins it
/// on drop.
pub(crate) struct CommandScheduler {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl CommandScheduler {
    /// Spawns the tick loop with the given period and sleeper.
    ///
    /// The period is steady and uncompensated: a slow write delays the next
    /// tick instead of causing a catch-up burst.
    pub(crate) fn spawn<T, S>(
        transport: Arc<Mutex<T>>,
        drive: Arc<DriveState>,
        connection: Arc<ConnectionCell>,
        on_status: StatusCallback,
        period: Duration,
        sleeper: S,
    ) -> Self
    where
        T: Transport + 'static,
        S: Sleeper + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let handle = std::thread::spawn({
            let running = running.clone();
            move || {
                while running.load(Ordering::Acquire) {
                    sleeper.sleep(period);
                    if !running.load(Ordering::Acquire) {
                        break;
                    }
                    tick(&transport, &drive, &connection, &on_status);
                }
            }
        });
        Self {
            running,
            handle: Some(handle),
        }
    }
}

impl Drop for CommandScheduler {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
