pub mod error;
pub mod log;
pub mod transport;

pub use error::TransportError;
pub use log::LogTransport;
pub use transport::{DynTransport, Transport};
