//! Capability trait definitions
//!
//! Lines are addressed by [`Pin`] identifier rather than owned, so one
//! implementation can serve any number of key lines.

use core::fmt;

use crate::error::Result;

/// Opaque GPIO line identifier
///
/// On Linux this is the line offset within a gpiochip, on a microcontroller
/// the pin number. The driver never interprets the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pin(pub u32);

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

impl From<u32> for Pin {
    fn from(line: u32) -> Self {
        Self(line)
    }
}

/// GPIO line direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinMode {
    /// High impedance input
    Input,
    /// Push-pull output
    Output,
}

/// Callback invoked on an interrupt edge
///
/// A plain function pointer: handlers run in an asynchronous context and
/// must communicate with the main flow through atomics or similar.
pub type InterruptHandler = fn();

/// GPIO line access
pub trait DigitalIo {
    /// Set the direction of a line
    fn configure(&mut self, pin: Pin, mode: PinMode) -> Result<()>;

    /// Read the raw level of a line (`true` = high)
    fn read(&mut self, pin: Pin) -> Result<bool>;

    /// Drive an output line (`true` = high)
    fn write(&mut self, pin: Pin, high: bool) -> Result<()>;
}

/// Two-wire register bus (I2C-style, 7-bit addressing)
pub trait Bus {
    /// Start the bus peripheral
    ///
    /// Platforms whose bus is ready once constructed keep the default.
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    /// Write `bytes` to the device at `addr` in a single transaction
    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<()>;

    /// Read exactly `buf.len()` bytes from the device at `addr`
    fn read(&mut self, addr: u8, buf: &mut [u8]) -> Result<()>;
}

/// Edge-triggered interrupt registration
pub trait InterruptSource {
    /// Invoke `handler` once per falling edge on `pin`
    fn on_falling_edge(&mut self, pin: Pin, handler: InterruptHandler) -> Result<()>;
}

/// Blocking microsecond delay
pub trait Delay {
    /// Block for at least `us` microseconds
    fn delay_us(&mut self, us: u32);
}

#[cfg(feature = "alloc")]
impl DigitalIo for alloc::boxed::Box<dyn DigitalIo + Send> {
    fn configure(&mut self, pin: Pin, mode: PinMode) -> Result<()> {
        (**self).configure(pin, mode)
    }

    fn read(&mut self, pin: Pin) -> Result<bool> {
        (**self).read(pin)
    }

    fn write(&mut self, pin: Pin, high: bool) -> Result<()> {
        (**self).write(pin, high)
    }
}

#[cfg(feature = "alloc")]
impl Bus for alloc::boxed::Box<dyn Bus + Send> {
    fn begin(&mut self) -> Result<()> {
        (**self).begin()
    }

    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<()> {
        (**self).write(addr, bytes)
    }

    fn read(&mut self, addr: u8, buf: &mut [u8]) -> Result<()> {
        (**self).read(addr, buf)
    }
}

#[cfg(feature = "alloc")]
impl InterruptSource for alloc::boxed::Box<dyn InterruptSource + Send> {
    fn on_falling_edge(&mut self, pin: Pin, handler: InterruptHandler) -> Result<()> {
        (**self).on_falling_edge(pin, handler)
    }
}

#[cfg(feature = "alloc")]
impl Delay for alloc::boxed::Box<dyn Delay + Send> {
    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}
