//! Convenience re-exports.

pub use crate::{
    error::SessionError,
    event::StatusEvent,
    link::{Audit, AuditHandle, AuditOption, Nop},
    session::{ConnectionState, Session, SessionOption},
};

pub use roverlink_core::{
    frame::{decode, Command, Mode, TelemetryReading, DEFAULT_SPEED, SPEED_LIMIT},
    sleep::{Sleeper, SpinWaitSleeper, StdSleeper},
    state::{Direction, DriveState, Intent},
    transport::{Transport, TransportError, TransportReader},
};
