use derive_more::Display;

/// Speed magnitude used for straight-line motion in button mode.
///
/// 238 rather than 255 to leave headroom for the firmware-side scaling that
/// equalizes the two motors.
pub const DEFAULT_SPEED: i32 = 238;

/// Exclusive bound on motor speed magnitude. Values at or beyond this cannot
/// be driven by the motor PWM and must never reach the wire.
pub const SPEED_LIMIT: i32 = 255;

/// Operating mode of the rover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Autonomous operation; transmitted motor values are placeholders.
    Automatic,
    /// Manual drive from the directional buttons.
    #[default]
    ManualButton,
    /// Manual drive from tilt readings.
    ManualTilt,
    /// Stopped, awaiting instructions.
    Idle,
}

impl Mode {
    /// The wire tag of this mode. Both manual modes share `'m'`.
    #[must_use]
    pub const fn tag(&self) -> char {
        match self {
            Mode::ManualButton | Mode::ManualTilt => 'm',
            Mode::Automatic => 'a',
            Mode::Idle => 'i',
        }
    }
}

/// One outgoing motor command.
///
/// Built fresh from the current mode and intent on every scheduler tick,
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    mode: Mode,
    left: i32,
    right: i32,
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}n{}", self.mode.tag(), self.left, self.right)
    }
}

impl Command {
    /// Creates a new [`Command`].
    #[must_use]
    pub const fn new(mode: Mode, left: i32, right: i32) -> Self {
        Self { mode, left, right }
    }

    /// The mode this command was built under.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Left motor speed.
    #[must_use]
    pub const fn left(&self) -> i32 {
        self.left
    }

    /// Right motor speed.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.right
    }

    /// Checks both speeds against the open interval
    /// (-[`SPEED_LIMIT`], [`SPEED_LIMIT`]).
    #[must_use]
    pub const fn in_bounds(&self) -> bool {
        self.left.abs() < SPEED_LIMIT && self.right.abs() < SPEED_LIMIT
    }

    /// Encodes this command into its wire frame:
    /// `<mode_tag><left>n<right>`, ASCII, no trailing terminator. The
    /// transport write is the complete frame.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

/// One decoded distance reading, in centimeters.
///
/// Has no identity beyond its value and arrival order. Negative values are
/// possible on malformed peripheral output and are passed through for the
/// presentation side to ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
#[display("{_0}")]
pub struct TelemetryReading(pub i32);

impl TelemetryReading {
    /// The distance value.
    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

/// Decodes the first newline-terminated line of a freshly-read window.
///
/// The window is whatever the last transport read returned, not a single
/// message: it may hold a partial line or several complete ones. Only the
/// first complete line is consumed; later lines in the same window are
/// dropped, and a window with no terminator yields nothing. There is no
/// buffering across calls, so a line split across two reads is lost. This
/// lossiness is deliberate and matched by the peripheral's send rate.
#[must_use]
pub fn decode(window: &[u8]) -> Option<TelemetryReading> {
    let end = window.iter().position(|&b| b == b'\n')?;
    let line = String::from_utf8_lossy(&window[..end]);
    match line.parse::<f32>() {
        Ok(v) => Some(TelemetryReading(v.round() as i32)),
        Err(_) => {
            tracing::debug!("dropping unparsable telemetry line: {:?}", line);
            None
        }
    }
}
