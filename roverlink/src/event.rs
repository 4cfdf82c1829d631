use std::sync::Arc;

use roverlink_core::{frame::TelemetryReading, transport::TransportError};

/// A status notification surfaced to the operator.
///
/// These are the link-layer equivalents of the drive UI's toast
/// notifications; `Display` renders the human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// The transport could not be opened; the session stays disconnected.
    ConnectFailed(TransportError),
    /// A periodic command write failed; the scheduler retries on its next
    /// tick.
    WriteFailed(TransportError),
    /// The receive loop stopped because the stream closed or faulted; the
    /// session has marked itself disconnected.
    ReceiveStopped,
    /// A requested speed reached the motor PWM limit; both motors were reset
    /// to zero instead of transmitting the pair.
    BoundsViolation {
        /// Requested left speed.
        left: i32,
        /// Requested right speed.
        right: i32,
    },
}

impl std::fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusEvent::ConnectFailed(e) => write!(f, "Could not connect to device: {}", e),
            StatusEvent::WriteFailed(e) => write!(f, "Error writing to device: {}", e),
            StatusEvent::ReceiveStopped => write!(f, "Connection to device lost"),
            StatusEvent::BoundsViolation { left, right } => {
                write!(f, "Invalid speed ({}, {}) set, stopping motors", left, right)
            }
        }
    }
}

/// Callback receiving each decoded telemetry reading, invoked from the
/// receiver's thread.
pub type TelemetryCallback = Arc<dyn Fn(TelemetryReading) + Send + Sync>;

/// Callback receiving status notifications, invoked from whichever thread
/// observed the event.
pub type StatusCallback = Arc<dyn Fn(StatusEvent) + Send + Sync>;
