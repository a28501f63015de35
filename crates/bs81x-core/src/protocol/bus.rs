//! Register protocol for the two-wire bus transport
//!
//! Register reads are two separate transactions: the register address is
//! written and the transaction closed, then one byte is read back. There is
//! no repeated start, which is what the chip expects.

use crate::device::{KeyTransport, TransportKind};
use crate::error::{Error, Result};
use crate::platform::Bus;
use crate::registers;

/// Read one register
pub fn read_register<B: Bus + ?Sized>(bus: &mut B, addr: u8, reg: u8) -> Result<u8> {
    bus.write(addr, &[reg])?;
    let mut buf = [0u8; 1];
    bus.read(addr, &mut buf)?;
    log::trace!("bs81x@{:#04x}: read reg {:#04x} = {:#04x}", addr, reg, buf[0]);
    Ok(buf[0])
}

/// Write one register
pub fn write_register<B: Bus + ?Sized>(bus: &mut B, addr: u8, reg: u8, value: u8) -> Result<()> {
    log::trace!("bs81x@{:#04x}: write reg {:#04x} = {:#04x}", addr, reg, value);
    bus.write(addr, &[reg, value])
}

/// Read both key status registers as `(high << 8) | low`
pub fn read_key_status<B: Bus + ?Sized>(bus: &mut B, addr: u8) -> Result<u16> {
    let low = read_register(bus, addr, registers::KEY_STATUS_LOW)?;
    let high = read_register(bus, addr, registers::KEY_STATUS_HIGH)?;
    Ok(((high as u16) << 8) | low as u16)
}

/// Bus transport handler
pub struct BusRegisterIo<B> {
    bus: B,
    address: u8,
}

impl<B: Bus> BusRegisterIo<B> {
    /// Create a handler for the chip at the 7-bit `address`
    pub fn new(bus: B, address: u8) -> Self {
        Self { bus, address }
    }

    /// 7-bit device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Borrow the underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutably borrow the underlying bus
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}

impl<B: Bus> KeyTransport for BusRegisterIo<B> {
    fn kind(&self) -> TransportKind {
        TransportKind::Bus
    }

    fn begin(&mut self) -> Result<()> {
        log::debug!("bs81x: starting bus for device {:#04x}", self.address);
        self.bus.begin()
    }

    fn is_touched(&mut self, key: u8) -> Result<bool> {
        if key >= registers::STATUS_BYTE_KEYS {
            return Err(Error::InvalidIndex {
                index: key,
                limit: registers::STATUS_BYTE_KEYS,
            });
        }
        let status = read_register(&mut self.bus, self.address, registers::KEY_STATUS_LOW)?;
        Ok(status & (1 << key) != 0)
    }

    fn key_states(&mut self) -> Result<u16> {
        read_key_status(&mut self.bus, self.address)
    }

    fn read_register(&mut self, reg: u8) -> Result<u8> {
        read_register(&mut self.bus, self.address, reg)
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<()> {
        write_register(&mut self.bus, self.address, reg, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BusFault;

    /// Register file behind a write-pointer, like the chip
    struct RegisterBus {
        regs: [u8; 256],
        pointer: u8,
        writes: heapless::Vec<(u8, heapless::Vec<u8, 4>), 16>,
        nack: bool,
    }

    impl RegisterBus {
        fn new() -> Self {
            Self {
                regs: [0; 256],
                pointer: 0,
                writes: heapless::Vec::new(),
                nack: false,
            }
        }
    }

    impl Bus for RegisterBus {
        fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<()> {
            if self.nack {
                return Err(Error::Bus(BusFault::Nack));
            }
            self.writes
                .push((addr, heapless::Vec::from_slice(bytes).unwrap()))
                .unwrap();
            self.pointer = bytes[0];
            if let Some(&value) = bytes.get(1) {
                self.regs[self.pointer as usize] = value;
            }
            Ok(())
        }

        fn read(&mut self, _addr: u8, buf: &mut [u8]) -> Result<()> {
            for byte in buf.iter_mut() {
                *byte = self.regs[self.pointer as usize];
                self.pointer = self.pointer.wrapping_add(1);
            }
            Ok(())
        }
    }

    #[test]
    fn test_key_status_composition() {
        let mut bus = RegisterBus::new();
        bus.regs[0x08] = 0xFF;
        bus.regs[0x09] = 0x00;
        assert_eq!(read_key_status(&mut bus, 0x50).unwrap(), 0x00FF);

        bus.regs[0x08] = 0x00;
        bus.regs[0x09] = 0x01;
        assert_eq!(read_key_status(&mut bus, 0x50).unwrap(), 0x0100);
    }

    #[test]
    fn test_read_register_sequence() {
        let mut bus = RegisterBus::new();
        bus.regs[0xB0] = 0x42;
        assert_eq!(read_register(&mut bus, 0x50, 0xB0).unwrap(), 0x42);
        assert_eq!(bus.writes.len(), 1);
        assert_eq!(bus.writes[0].0, 0x50);
        assert_eq!(bus.writes[0].1.as_slice(), &[0xB0]);
    }

    #[test]
    fn test_is_touched_reads_status_bit() {
        let mut bus = RegisterBus::new();
        bus.regs[0x08] = 0b0000_0100;
        let mut io = BusRegisterIo::new(bus, 0x50);
        for key in 0..8 {
            assert_eq!(io.is_touched(key).unwrap(), key == 2);
        }
    }

    #[test]
    fn test_is_touched_rejects_second_status_byte() {
        let mut io = BusRegisterIo::new(RegisterBus::new(), 0x50);
        assert_eq!(
            io.is_touched(8),
            Err(Error::InvalidIndex { index: 8, limit: 8 })
        );
        assert!(io.bus().writes.is_empty());
    }

    #[test]
    fn test_nack_is_reported_once() {
        let mut bus = RegisterBus::new();
        bus.nack = true;
        let mut io = BusRegisterIo::new(bus, 0x50);
        assert_eq!(io.key_states(), Err(Error::Bus(BusFault::Nack)));
    }
}
