use std::sync::Mutex;

use crate::frame::Mode;

/// Directional button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
    Left,
    Right,
}

/// Operator/sensor-derived motion request, independent of [`Mode`].
///
/// The directional flags belong to button mode and the tilt pair to tilt
/// mode, but both are retained across mode switches: flags set while in
/// another mode simply stay unused until button mode is selected again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Intent {
    /// Forward button held.
    pub forward: bool,
    /// Reverse button held.
    pub reverse: bool,
    /// Left button held.
    pub left: bool,
    /// Right button held.
    pub right: bool,
    /// Tilt-derived (left, right) motor speed pair, written as a unit.
    pub tilt: (i32, i32),
}

#[derive(Debug, Default)]
struct Inner {
    mode: Mode,
    intent: Intent,
}

/// Shared mode/intent state.
///
/// Written by UI/sensor collaborators, snapshotted by the command scheduler
/// once per tick. Every access holds the lock only long enough to copy, so
/// neither side can observe a torn tilt pair or a half-applied update.
#[derive(Debug, Default)]
pub struct DriveState {
    inner: Mutex<Inner>,
}

impl DriveState {
    /// Creates a new [`DriveState`] in the default mode
    /// ([`Mode::ManualButton`]) with no intent set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the operating mode. Visible to the scheduler on its next
    /// tick; there is no synchronous handshake.
    pub fn set_mode(&self, mode: Mode) {
        self.inner.lock().unwrap().mode = mode;
    }

    /// Sets or clears one directional flag.
    pub fn set_direction(&self, direction: Direction, pressed: bool) {
        let mut inner = self.inner.lock().unwrap();
        match direction {
            Direction::Forward => inner.intent.forward = pressed,
            Direction::Reverse => inner.intent.reverse = pressed,
            Direction::Left => inner.intent.left = pressed,
            Direction::Right => inner.intent.right = pressed,
        }
    }

    /// Stores the tilt-derived (left, right) speed pair as a unit.
    pub fn set_tilt(&self, left: i32, right: i32) {
        self.inner.lock().unwrap().intent.tilt = (left, right);
    }

    /// Returns a consistent copy of the current mode and intent.
    #[must_use]
    pub fn snapshot(&self) -> (Mode, Intent) {
        let inner = self.inner.lock().unwrap();
        (inner.mode, inner.intent)
    }
}
