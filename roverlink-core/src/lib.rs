//! Core traits and types for the roverlink drive link.
//!
//! This crate defines the pieces shared by the session layer and the
//! concrete transports: the [`transport::Transport`] byte-stream interface,
//! the wire [`frame`] codec, the shared [`state::DriveState`], and the
//! [`sleep::Sleeper`] timing abstraction used by the command scheduler.

pub mod frame;
pub mod sleep;
pub mod state;
pub mod transport;
