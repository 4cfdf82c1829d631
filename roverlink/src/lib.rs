//! Link and session layer for remotely driving a mobile robot over a
//! point-to-point byte-stream radio link.
//!
//! A [`Session`] supervises the transport lifecycle, runs a background
//! receive loop that turns incoming bytes into telemetry readings, and a
//! periodic command scheduler that transmits the current operator intent.
//!
//! ```
//! use roverlink::prelude::*;
//!
//! # fn main() -> Result<(), SessionError> {
//! let mut session = Session::new(
//!     Nop::new(),
//!     |reading| println!("distance: {reading}"),
//!     |status| eprintln!("{status}"),
//!     SessionOption::default(),
//! );
//! session.connect()?;
//!
//! let drive = session.drive_state();
//! drive.set_mode(Mode::ManualButton);
//! drive.set_direction(Direction::Forward, true);
//!
//! session.close()?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod event;
pub mod link;
pub mod prelude;
pub mod session;

mod receiver;
mod scheduler;

pub use session::Session;
