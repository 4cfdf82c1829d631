mod error;
mod sync;

pub use error::TransportError;
pub use sync::{Transport, TransportReader};
