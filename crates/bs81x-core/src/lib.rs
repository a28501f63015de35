//! bs81x-core - Core driver for BS81x capacitive touch-key chips
//!
//! The BS81x family reports touch keys over one of three mutually exclusive
//! wirings. This crate implements the protocol for each of them on top of
//! small capability traits, so the same driver runs on a microcontroller, on
//! a Linux board, or against the in-memory emulator used by the tests.
//!
//! It is `no_std` compatible.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable boxed transport trait objects
//! - `hal` - Adapters from `embedded-hal` 1.0 I2C and delay implementations
//!
//! # Example
//!
//! ```ignore
//! use bs81x_core::{Bus, TouchDevice};
//!
//! fn dump_keys<B: Bus>(bus: B) -> bs81x_core::Result<()> {
//!     let mut touch = TouchDevice::bus(bus, 0x50);
//!     touch.begin()?;
//!     let states = touch.key_states()?;
//!     println!("keys: {:#06x}", states.bits());
//!     Ok(())
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod device;
pub mod error;
pub mod platform;
pub mod protocol;
pub mod registers;

pub use device::{KeyStates, KeyTransport, TouchDevice, TransportKind};
pub use error::{BusFault, Error, Result};
pub use platform::{Bus, Delay, DigitalIo, InterruptHandler, InterruptSource, Pin, PinMode};
