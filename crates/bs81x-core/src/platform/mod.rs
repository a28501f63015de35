//! Platform capabilities consumed by the driver
//!
//! The driver never touches hardware directly. Everything it needs from the
//! platform (GPIO lines, the two-wire bus, edge interrupts and a microsecond
//! delay) is injected through the traits in this module.

#[cfg(feature = "hal")]
pub mod hal;
mod traits;

pub use traits::*;
