//! Transport protocol implementations
//!
//! One module per wiring scheme. Each exposes the raw protocol as free
//! functions generic over the capability traits, plus a handler type that
//! implements [`KeyTransport`](crate::device::KeyTransport) for it.

pub mod bus;
pub mod parallel;
pub mod serial;

pub use bus::BusRegisterIo;
pub use parallel::ParallelIo;
pub use serial::{BitbangSerial, SerialIo};
