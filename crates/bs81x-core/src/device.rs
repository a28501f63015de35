//! Touch device front end
//!
//! [`TouchDevice`] is what callers hold. It is built with exactly one of the
//! named constructors, which fixes the transport for the lifetime of the
//! object, and forwards every query to the matching [`KeyTransport`].

use core::fmt;

use crate::error::{Error, Result};
use crate::platform::{Bus, Delay, DigitalIo, InterruptHandler, InterruptSource, Pin};
use crate::protocol::{BusRegisterIo, ParallelIo, SerialIo};
use crate::registers::{self, OptionFlags};

/// Wiring scheme between host and chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// One GPIO line per key plus a signal line
    Parallel,
    /// Register-addressed two-wire bus
    Bus,
    /// Bit-banged clock + data lines
    Serial,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parallel => write!(f, "parallel"),
            Self::Bus => write!(f, "bus"),
            Self::Serial => write!(f, "serial"),
        }
    }
}

/// Snapshot of all key states, bit `k` set when key `k` is touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyStates(u16);

impl KeyStates {
    /// Wrap a raw key mask
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw key mask
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether `key` is touched (keys past 15 never are)
    pub fn is_touched(self, key: u8) -> bool {
        key < 16 && self.0 & (1 << key) != 0
    }

    /// Number of touched keys
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// No key touched
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Indices of the touched keys, ascending
    pub fn touched(self) -> impl Iterator<Item = u8> {
        (0..16u8).filter(move |&key| self.is_touched(key))
    }
}

impl fmt::Display for KeyStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        for (i, key) in self.touched().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "K{}", key)?;
        }
        Ok(())
    }
}

/// Protocol handler for one wiring scheme
///
/// Implemented by [`ParallelIo`], [`BusRegisterIo`] and [`SerialIo`].
/// Register access is only meaningful on the bus transport; the default
/// implementations reject it.
pub trait KeyTransport {
    /// Which wiring this handler drives
    fn kind(&self) -> TransportKind;

    /// One-time pin/bus setup
    fn begin(&mut self) -> Result<()>;

    /// Whether a single key is touched
    fn is_touched(&mut self, key: u8) -> Result<bool>;

    /// Raw key-state mask
    fn key_states(&mut self) -> Result<u16>;

    /// Read a chip register
    fn read_register(&mut self, _reg: u8) -> Result<u8> {
        Err(Error::UnsupportedOperation {
            operation: "read_register",
            transport: self.kind(),
        })
    }

    /// Write a chip register
    fn write_register(&mut self, _reg: u8, _value: u8) -> Result<()> {
        Err(Error::UnsupportedOperation {
            operation: "write_register",
            transport: self.kind(),
        })
    }

    /// Line the chip signals touches on, if this wiring has one
    fn signal_pin(&self) -> Option<Pin> {
        None
    }
}

#[cfg(feature = "alloc")]
impl KeyTransport for alloc::boxed::Box<dyn KeyTransport + Send> {
    fn kind(&self) -> TransportKind {
        (**self).kind()
    }

    fn begin(&mut self) -> Result<()> {
        (**self).begin()
    }

    fn is_touched(&mut self, key: u8) -> Result<bool> {
        (**self).is_touched(key)
    }

    fn key_states(&mut self) -> Result<u16> {
        (**self).key_states()
    }

    fn read_register(&mut self, reg: u8) -> Result<u8> {
        (**self).read_register(reg)
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<()> {
        (**self).write_register(reg, value)
    }

    fn signal_pin(&self) -> Option<Pin> {
        (**self).signal_pin()
    }
}

/// BS81x touch-key chip
pub struct TouchDevice<T> {
    transport: T,
    interrupt_pin: Option<Pin>,
    initialized: bool,
}

impl<IO: DigitalIo> TouchDevice<ParallelIo<IO>> {
    /// Chip wired in parallel: `key_pins[k]` carries key `k`
    pub fn parallel(io: IO, key_pins: &[Pin], signal_pin: Pin) -> Result<Self> {
        Ok(Self::new(ParallelIo::new(io, key_pins, signal_pin)?))
    }
}

impl<B: Bus> TouchDevice<BusRegisterIo<B>> {
    /// Chip on the two-wire bus at the 7-bit `address`
    pub fn bus(bus: B, address: u8) -> Self {
        Self::new(BusRegisterIo::new(bus, address))
    }
}

impl<IO: DigitalIo, D: Delay> TouchDevice<SerialIo<IO, D>> {
    /// Chip on the bit-banged serial link
    pub fn serial(io: IO, delay: D, data: Pin, clock: Pin) -> Self {
        Self::new(SerialIo::new(io, delay, data, clock))
    }
}

impl<T: KeyTransport> TouchDevice<T> {
    /// Wrap an already built transport handler
    pub fn new(transport: T) -> Self {
        let interrupt_pin = transport.signal_pin();
        Self {
            transport,
            interrupt_pin,
            initialized: false,
        }
    }

    /// Use `pin` as the active-low interrupt line
    ///
    /// Parallel wiring defaults to its signal line; bus and serial wiring
    /// have no interrupt line until one is given here.
    pub fn with_interrupt_pin(mut self, pin: Pin) -> Self {
        self.interrupt_pin = Some(pin);
        self
    }

    /// Transport fixed at construction
    pub fn transport_kind(&self) -> TransportKind {
        self.transport.kind()
    }

    /// Interrupt line, if any
    pub fn interrupt_pin(&self) -> Option<Pin> {
        self.interrupt_pin
    }

    /// Borrow the transport handler
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport handler
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give back the transport handler
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Set up the pins or bus of the active transport
    ///
    /// Only the first call touches hardware.
    pub fn begin(&mut self) -> Result<()> {
        if self.initialized {
            log::debug!(
                "bs81x: {} transport already initialized",
                self.transport_kind()
            );
            return Ok(());
        }
        self.transport.begin()?;
        self.initialized = true;
        log::info!("bs81x: {} transport ready", self.transport_kind());
        Ok(())
    }

    /// Whether key `key` is touched
    ///
    /// Bus wiring can address keys 0-7 (one status byte), parallel wiring
    /// every wired key. Serial wiring has no per-key read.
    pub fn is_touched(&mut self, key: u8) -> Result<bool> {
        self.transport.is_touched(key)
    }

    /// Read every key at once
    ///
    /// On parallel wiring there is no bulk read and this returns an empty
    /// set rather than an error. Callers that need parallel key states must
    /// poll [`is_touched`](Self::is_touched) per key.
    pub fn key_states(&mut self) -> Result<KeyStates> {
        self.transport.key_states().map(KeyStates::from_bits)
    }

    /// Set the sensitivity of `key` (bus wiring only)
    pub fn set_sensitivity(&mut self, key: u8, value: u8) -> Result<()> {
        self.require_bus("set_sensitivity")?;
        let reg = registers::sensitivity_register(key).ok_or(Error::InvalidIndex {
            index: key,
            limit: registers::MAX_KEYS as u8,
        })?;
        log::debug!("bs81x: key {} sensitivity {:#04x}", key, value);
        self.transport.write_register(reg, value)
    }

    /// Enable or disable the wake-up function (bus wiring only)
    ///
    /// The option register bit is a disable flag: enabling clears it.
    pub fn set_wakeup_function(&mut self, enable: bool) -> Result<()> {
        self.require_bus("set_wakeup_function")?;
        let raw = self.transport.read_register(registers::OPTION)?;
        let current = OptionFlags::from_bits_retain(raw);
        let updated = current.with_wakeup(enable);
        log::debug!(
            "bs81x: option {:#04x} -> {:#04x}",
            current.bits(),
            updated.bits()
        );
        self.transport.write_register(registers::OPTION, updated.bits())
    }

    /// Auto-calibration control
    ///
    /// The chip calibrates automatically and no register controls it, so
    /// this has no effect on the hardware.
    pub fn enable_auto_calibration(&mut self, enable: bool) {
        log::debug!("bs81x: auto-calibration request ({}) ignored", enable);
    }

    /// Maximum key-on duration control
    ///
    /// The chip uses a fixed limit and no register controls it, so this has
    /// no effect on the hardware.
    pub fn set_max_key_on_duration(&mut self, duration: u16) {
        log::debug!("bs81x: max key-on duration request ({}) ignored", duration);
    }

    /// Call `handler` on every falling edge of the interrupt line
    pub fn attach_interrupt_handler<I: InterruptSource + ?Sized>(
        &self,
        source: &mut I,
        handler: InterruptHandler,
    ) -> Result<()> {
        let pin = self.interrupt_pin.ok_or(Error::UnsupportedOperation {
            operation: "attach_interrupt_handler",
            transport: self.transport_kind(),
        })?;
        log::debug!("bs81x: interrupt handler on {}", pin);
        source.on_falling_edge(pin, handler)
    }

    fn require_bus(&self, operation: &'static str) -> Result<()> {
        match self.transport_kind() {
            TransportKind::Bus => Ok(()),
            transport => Err(Error::UnsupportedOperation {
                operation,
                transport,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal transport that only counts setup calls
    struct Counting {
        kind: TransportKind,
        begins: u32,
        regs: [u8; 256],
    }

    impl Counting {
        fn new(kind: TransportKind) -> Self {
            Self {
                kind,
                begins: 0,
                regs: [0; 256],
            }
        }
    }

    impl KeyTransport for Counting {
        fn kind(&self) -> TransportKind {
            self.kind
        }

        fn begin(&mut self) -> Result<()> {
            self.begins += 1;
            Ok(())
        }

        fn is_touched(&mut self, _key: u8) -> Result<bool> {
            Ok(false)
        }

        fn key_states(&mut self) -> Result<u16> {
            Ok(0)
        }

        fn read_register(&mut self, reg: u8) -> Result<u8> {
            Ok(self.regs[reg as usize])
        }

        fn write_register(&mut self, reg: u8, value: u8) -> Result<()> {
            self.regs[reg as usize] = value;
            Ok(())
        }
    }

    #[test]
    fn test_begin_runs_once() {
        let mut touch = TouchDevice::new(Counting::new(TransportKind::Bus));
        touch.begin().unwrap();
        touch.begin().unwrap();
        assert_eq!(touch.transport().begins, 1);
    }

    #[test]
    fn test_register_ops_need_bus() {
        let mut touch = TouchDevice::new(Counting::new(TransportKind::Serial));
        assert_eq!(
            touch.set_sensitivity(0, 1),
            Err(Error::UnsupportedOperation {
                operation: "set_sensitivity",
                transport: TransportKind::Serial,
            })
        );
        assert!(matches!(
            touch.set_wakeup_function(true),
            Err(Error::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_sensitivity_register_address() {
        let mut touch = TouchDevice::new(Counting::new(TransportKind::Bus));
        touch.set_sensitivity(3, 0x20).unwrap();
        assert_eq!(touch.transport().regs[0xB8], 0x20);
        assert_eq!(
            touch.set_sensitivity(16, 0x20),
            Err(Error::InvalidIndex {
                index: 16,
                limit: 16
            })
        );
    }

    #[test]
    fn test_wakeup_polarity() {
        let mut touch = TouchDevice::new(Counting::new(TransportKind::Bus));
        touch.transport_mut().regs[0xB0] = 0xFF;
        touch.set_wakeup_function(true).unwrap();
        assert_eq!(touch.transport().regs[0xB0], 0x7F);
        touch.set_wakeup_function(false).unwrap();
        assert_eq!(touch.transport().regs[0xB0], 0xFF);
    }

    #[test]
    fn test_interrupt_needs_a_pin() {
        struct NoIrq;
        impl InterruptSource for NoIrq {
            fn on_falling_edge(&mut self, _pin: Pin, _handler: InterruptHandler) -> Result<()> {
                panic!("no pin configured, must not be called");
            }
        }

        let touch = TouchDevice::new(Counting::new(TransportKind::Bus));
        assert!(matches!(
            touch.attach_interrupt_handler(&mut NoIrq, || {}),
            Err(Error::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_key_states_display() {
        use core::fmt::Write;

        let mut out: heapless::String<32> = heapless::String::new();
        write!(out, "{}", KeyStates::from_bits(0)).unwrap();
        assert_eq!(out.as_str(), "none");

        let states = KeyStates::from_bits(0b1000_0000_0000_0101);
        out.clear();
        write!(out, "{}", states).unwrap();
        assert_eq!(out.as_str(), "K0 K2 K15");
        assert_eq!(states.count(), 3);
        assert!(states.is_touched(15));
        assert!(!states.is_touched(16));
    }
}
