//! Bit-banged serial transport
//!
//! The chip shifts its key states out on the data line while the host
//! drives the clock line. One frame is 8 bits, least significant first:
//!
//! ```text
//! clock  ‾‾‾|___|‾‾‾|___|‾‾‾ ... (8 periods)
//! data        b0      b1
//!            ^ sampled 20 µs after the falling edge
//! ```
//!
//! Each half period is held for [`HALF_BIT_HOLD_US`].

use crate::device::{KeyTransport, TransportKind};
use crate::error::{Error, Result};
use crate::platform::{Delay, DigitalIo, Pin, PinMode};

/// Hold time after each clock edge, in microseconds
pub const HALF_BIT_HOLD_US: u32 = 20;

/// Bits in one key-state frame
pub const FRAME_BITS: u8 = 8;

/// Low-level operations needed to clock a frame in
///
/// Split out from [`SerialIo`] so the frame logic can run against any line
/// implementation.
pub trait BitbangSerial {
    /// Drive the clock line
    fn set_clock(&mut self, high: bool) -> Result<()>;

    /// Sample the data line
    fn get_data(&mut self) -> Result<bool>;

    /// Hold for half a bit period
    fn half_bit_delay(&mut self);
}

/// Read one frame, LSB first
pub fn read_byte<M: BitbangSerial + ?Sized>(master: &mut M) -> Result<u8> {
    let mut byte = 0u8;
    for bit in 0..FRAME_BITS {
        master.set_clock(false)?;
        master.half_bit_delay();
        if master.get_data()? {
            byte |= 1 << bit;
        }
        master.set_clock(true)?;
        master.half_bit_delay();
    }
    Ok(byte)
}

/// Serial transport handler
pub struct SerialIo<IO, D> {
    io: IO,
    delay: D,
    data: Pin,
    clock: Pin,
}

impl<IO: DigitalIo, D: Delay> SerialIo<IO, D> {
    /// Create a handler for the given data (input) and clock (output) lines
    pub fn new(io: IO, delay: D, data: Pin, clock: Pin) -> Self {
        Self {
            io,
            delay,
            data,
            clock,
        }
    }

    /// Data line
    pub fn data_pin(&self) -> Pin {
        self.data
    }

    /// Clock line
    pub fn clock_pin(&self) -> Pin {
        self.clock
    }

    /// Borrow the GPIO implementation
    pub fn io(&self) -> &IO {
        &self.io
    }

    /// Borrow the delay implementation
    pub fn delay(&self) -> &D {
        &self.delay
    }
}

impl<IO: DigitalIo, D: Delay> BitbangSerial for SerialIo<IO, D> {
    fn set_clock(&mut self, high: bool) -> Result<()> {
        self.io.write(self.clock, high)
    }

    fn get_data(&mut self) -> Result<bool> {
        self.io.read(self.data)
    }

    fn half_bit_delay(&mut self) {
        self.delay.delay_us(HALF_BIT_HOLD_US);
    }
}

impl<IO: DigitalIo, D: Delay> KeyTransport for SerialIo<IO, D> {
    fn kind(&self) -> TransportKind {
        TransportKind::Serial
    }

    fn begin(&mut self) -> Result<()> {
        log::debug!(
            "bs81x: serial transport data={} clock={}",
            self.data,
            self.clock
        );
        self.io.configure(self.data, PinMode::Input)?;
        self.io.configure(self.clock, PinMode::Output)
    }

    fn is_touched(&mut self, _key: u8) -> Result<bool> {
        Err(Error::UnsupportedOperation {
            operation: "is_touched",
            transport: TransportKind::Serial,
        })
    }

    fn key_states(&mut self) -> Result<u16> {
        let frame = read_byte(self)?;
        log::trace!("bs81x: serial frame {:#04x}", frame);
        Ok(frame as u16)
    }
}
