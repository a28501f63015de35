//! Parallel GPIO transport
//!
//! One input line per key, active low: a touched key pulls its line to
//! ground. The shared signal line is driven as an output.

use heapless::Vec;

use crate::device::{KeyTransport, TransportKind};
use crate::error::{Error, Result};
use crate::platform::{DigitalIo, Pin, PinMode};
use crate::registers::MAX_KEYS;

/// Parallel transport handler
pub struct ParallelIo<IO> {
    io: IO,
    key_pins: Vec<Pin, MAX_KEYS>,
    signal_pin: Pin,
}

impl<IO: DigitalIo> ParallelIo<IO> {
    /// Create a handler for `key_pins` (key 0 first) and the signal line
    pub fn new(io: IO, key_pins: &[Pin], signal_pin: Pin) -> Result<Self> {
        let key_pins = Vec::from_slice(key_pins).map_err(|_| Error::TooManyKeys {
            count: key_pins.len(),
        })?;
        Ok(Self {
            io,
            key_pins,
            signal_pin,
        })
    }

    /// Key lines, key 0 first
    pub fn key_pins(&self) -> &[Pin] {
        &self.key_pins
    }

    /// Number of wired keys
    pub fn key_count(&self) -> u8 {
        self.key_pins.len() as u8
    }

    /// Borrow the GPIO implementation
    pub fn io(&self) -> &IO {
        &self.io
    }
}

impl<IO: DigitalIo> KeyTransport for ParallelIo<IO> {
    fn kind(&self) -> TransportKind {
        TransportKind::Parallel
    }

    fn begin(&mut self) -> Result<()> {
        log::debug!(
            "bs81x: parallel transport, {} keys, signal={}",
            self.key_pins.len(),
            self.signal_pin
        );
        for &pin in &self.key_pins {
            self.io.configure(pin, PinMode::Input)?;
        }
        self.io.configure(self.signal_pin, PinMode::Output)
    }

    fn is_touched(&mut self, key: u8) -> Result<bool> {
        let pin = *self.key_pins.get(key as usize).ok_or(Error::InvalidIndex {
            index: key,
            limit: self.key_count(),
        })?;
        // Active low
        Ok(!self.io.read(pin)?)
    }

    fn key_states(&mut self) -> Result<u16> {
        // No bulk read exists for this wiring
        Ok(0)
    }

    fn signal_pin(&self) -> Option<Pin> {
        Some(self.signal_pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lines with fixed levels; records configuration calls
    struct Lines {
        levels: [bool; 32],
        configured: Vec<(Pin, PinMode), 32>,
    }

    impl Lines {
        fn new() -> Self {
            Self {
                levels: [true; 32],
                configured: Vec::new(),
            }
        }
    }

    impl DigitalIo for Lines {
        fn configure(&mut self, pin: Pin, mode: PinMode) -> Result<()> {
            self.configured.push((pin, mode)).unwrap();
            Ok(())
        }

        fn read(&mut self, pin: Pin) -> Result<bool> {
            Ok(self.levels[pin.0 as usize])
        }

        fn write(&mut self, pin: Pin, high: bool) -> Result<()> {
            self.levels[pin.0 as usize] = high;
            Ok(())
        }
    }

    #[test]
    fn test_touched_is_active_low() {
        let pins = [Pin(4), Pin(5)];
        let mut lines = Lines::new();
        lines.levels[5] = false;
        let mut io = ParallelIo::new(lines, &pins, Pin(9)).unwrap();

        assert!(!io.is_touched(0).unwrap());
        assert!(io.is_touched(1).unwrap());
    }

    #[test]
    fn test_begin_configures_keys_then_signal() {
        let pins = [Pin(1), Pin(2), Pin(3)];
        let mut io = ParallelIo::new(Lines::new(), &pins, Pin(7)).unwrap();
        io.begin().unwrap();

        assert_eq!(
            io.io().configured.as_slice(),
            &[
                (Pin(1), PinMode::Input),
                (Pin(2), PinMode::Input),
                (Pin(3), PinMode::Input),
                (Pin(7), PinMode::Output),
            ]
        );
    }

    #[test]
    fn test_index_bounded_by_key_count() {
        let pins = [Pin(1), Pin(2)];
        let mut io = ParallelIo::new(Lines::new(), &pins, Pin(7)).unwrap();
        assert_eq!(
            io.is_touched(2),
            Err(Error::InvalidIndex { index: 2, limit: 2 })
        );
    }

    #[test]
    fn test_too_many_keys() {
        let pins = [Pin(0); 17];
        assert_eq!(
            ParallelIo::new(Lines::new(), &pins, Pin(31)).err(),
            Some(Error::TooManyKeys { count: 17 })
        );
    }

    #[test]
    fn test_key_states_falls_back_to_zero() {
        let mut lines = Lines::new();
        lines.levels = [false; 32];
        let mut io = ParallelIo::new(lines, &[Pin(1)], Pin(2)).unwrap();
        assert_eq!(io.key_states().unwrap(), 0);
    }
}
