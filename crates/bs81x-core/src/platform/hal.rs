//! Adapters from `embedded-hal` 1.0 traits
//!
//! Lets a microcontroller HAL drive the bus transport directly:
//!
//! ```ignore
//! let touch = TouchDevice::bus(HalI2c::new(i2c), 0x50);
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, I2c};

use crate::error::{BusFault, Error, Result};
use crate::platform::{Bus, Delay};

/// `Bus` implementation over any `embedded_hal::i2c::I2c`
pub struct HalI2c<I> {
    i2c: I,
}

impl<I: I2c> HalI2c<I> {
    /// Wrap an I2C peripheral
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Return the wrapped peripheral
    pub fn release(self) -> I {
        self.i2c
    }
}

fn map_i2c_error<E: i2c::Error>(err: E) -> Error {
    let fault = match err.kind() {
        i2c::ErrorKind::NoAcknowledge(_) => BusFault::Nack,
        i2c::ErrorKind::ArbitrationLoss => BusFault::ArbitrationLoss,
        _ => BusFault::Other,
    };
    log::debug!("i2c: transaction failed: {:?}", err.kind());
    Error::Bus(fault)
}

impl<I: I2c> Bus for HalI2c<I> {
    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<()> {
        self.i2c.write(addr, bytes).map_err(map_i2c_error)
    }

    fn read(&mut self, addr: u8, buf: &mut [u8]) -> Result<()> {
        self.i2c.read(addr, buf).map_err(map_i2c_error)
    }
}

/// `Delay` implementation over any `embedded_hal::delay::DelayNs`
pub struct HalDelay<D> {
    delay: D,
}

impl<D: DelayNs> HalDelay<D> {
    /// Wrap a delay provider
    pub fn new(delay: D) -> Self {
        Self { delay }
    }
}

impl<D: DelayNs> Delay for HalDelay<D> {
    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}
