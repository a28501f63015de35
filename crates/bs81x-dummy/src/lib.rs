//! bs81x-dummy - In-memory BS81x emulator for testing
//!
//! This crate provides a dummy chip that implements every platform
//! capability the driver consumes (GPIO, bus, interrupts, delay) and
//! behaves like a BS81x wired in one of the three transports. It's useful
//! for testing and development without real hardware.
//!
//! [`DummyChip`] is a cheap handle around shared state: clone it into the
//! driver and keep one copy to touch keys and inspect what the driver did.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use bs81x_core::error::{BusFault, Error, Result};
use bs81x_core::platform::{
    Bus, Delay, DigitalIo, InterruptHandler, InterruptSource, Pin, PinMode,
};
use bs81x_core::protocol::{BusRegisterIo, ParallelIo, SerialIo};
use bs81x_core::{registers, KeyTransport};

/// Bus address the emulator answers on by default
pub const DEFAULT_ADDRESS: u8 = 0x50;

/// How the emulated chip is wired to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DummyWiring {
    /// Two-wire bus at `address`
    Bus {
        /// 7-bit address
        address: u8,
    },
    /// Bit-banged serial link
    Serial {
        /// Data line (chip output)
        data: Pin,
        /// Clock line (host output)
        clock: Pin,
    },
    /// One line per key plus a signal line
    Parallel {
        /// Key lines, key 0 first
        key_pins: Vec<Pin>,
        /// Shared signal line
        signal: Pin,
    },
}

impl DummyWiring {
    /// Bus wiring at the default address
    pub fn bus() -> Self {
        Self::Bus {
            address: DEFAULT_ADDRESS,
        }
    }

    /// Serial wiring on lines 0 (data) and 1 (clock)
    pub fn serial() -> Self {
        Self::Serial {
            data: Pin(0),
            clock: Pin(1),
        }
    }

    /// Parallel wiring: keys on lines `0..key_count`, signal on the next line
    pub fn parallel(key_count: u8) -> Self {
        Self::Parallel {
            key_pins: (0..key_count as u32).map(Pin).collect(),
            signal: Pin(key_count as u32),
        }
    }
}

/// Configuration for the dummy chip
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Wiring to emulate
    pub wiring: DummyWiring,
    /// Initially touched keys
    pub keys: u16,
    /// Power-on content of the option register
    pub option: u8,
    /// Interrupt line for bus and serial wiring
    pub interrupt_pin: Option<Pin>,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            wiring: DummyWiring::bus(),
            keys: 0,
            option: 0x00,
            interrupt_pin: None,
        }
    }
}

/// One recorded bus transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusTransaction {
    /// Bus peripheral started
    Begin,
    /// Write transaction
    Write {
        /// Target address
        addr: u8,
        /// Bytes written
        data: Vec<u8>,
    },
    /// Read transaction
    Read {
        /// Target address
        addr: u8,
        /// Bytes returned
        data: Vec<u8>,
    },
}

struct ChipState {
    wiring: DummyWiring,
    interrupt_pin: Option<Pin>,
    regs: [u8; 256],
    pointer: u8,
    keys: u16,
    nack: bool,
    bus_log: Vec<BusTransaction>,
    levels: BTreeMap<Pin, bool>,
    modes: BTreeMap<Pin, PinMode>,
    pin_log: Vec<(Pin, PinMode)>,
    frame: u8,
    bit: u8,
    data_level: bool,
    script: VecDeque<bool>,
    handlers: Vec<(Pin, InterruptHandler)>,
    elapsed_us: u64,
}

impl ChipState {
    fn new(config: DummyConfig) -> Self {
        let interrupt_pin = match &config.wiring {
            DummyWiring::Parallel { signal, .. } => config.interrupt_pin.or(Some(*signal)),
            _ => config.interrupt_pin,
        };
        let mut state = Self {
            wiring: config.wiring,
            interrupt_pin,
            regs: [0; 256],
            pointer: 0,
            keys: 0,
            nack: false,
            bus_log: Vec::new(),
            levels: BTreeMap::new(),
            modes: BTreeMap::new(),
            pin_log: Vec::new(),
            frame: 0,
            bit: 0,
            data_level: true,
            script: VecDeque::new(),
            handlers: Vec::new(),
            elapsed_us: 0,
        };
        state.regs[registers::OPTION as usize] = config.option;
        state.store_keys(config.keys);
        state
    }

    fn store_keys(&mut self, keys: u16) {
        self.keys = keys;
        self.regs[registers::KEY_STATUS_LOW as usize] = keys as u8;
        self.regs[registers::KEY_STATUS_HIGH as usize] = (keys >> 8) as u8;
    }

    fn check_address(&self, addr: u8) -> Result<()> {
        match self.wiring {
            DummyWiring::Bus { address } if address == addr && !self.nack => Ok(()),
            _ => {
                log::debug!("dummy: no acknowledge from {:#04x}", addr);
                Err(Error::Bus(BusFault::Nack))
            }
        }
    }

    fn clock_edge(&mut self, was_high: bool, high: bool) {
        if was_high && !high {
            if self.bit == 0 {
                self.frame = self.keys as u8;
            }
            self.data_level = self
                .script
                .pop_front()
                .unwrap_or((self.frame >> self.bit) & 1 != 0);
        } else if !was_high && high {
            self.bit = (self.bit + 1) % 8;
        }
    }
}

/// Dummy BS81x chip
///
/// Implements [`DigitalIo`], [`Bus`], [`InterruptSource`] and [`Delay`];
/// the delay is a virtual clock that only accumulates time.
#[derive(Clone)]
pub struct DummyChip {
    state: Arc<Mutex<ChipState>>,
}

impl DummyChip {
    /// Create a new dummy chip with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(ChipState::new(config))),
        }
    }

    /// Create a new dummy chip on the bus at the default address
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy chip with the given wiring and default contents
    pub fn with_wiring(wiring: DummyWiring) -> Self {
        Self::new(DummyConfig {
            wiring,
            ..Default::default()
        })
    }

    fn state(&self) -> MutexGuard<'_, ChipState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Build the driver-side transport handler matching this chip's wiring
    pub fn transport(&self) -> Result<Box<dyn KeyTransport + Send>> {
        let wiring = self.wiring();
        Ok(match wiring {
            DummyWiring::Bus { address } => Box::new(BusRegisterIo::new(self.clone(), address)),
            DummyWiring::Serial { data, clock } => {
                Box::new(SerialIo::new(self.clone(), self.clone(), data, clock))
            }
            DummyWiring::Parallel { key_pins, signal } => {
                Box::new(ParallelIo::new(self.clone(), &key_pins, signal)?)
            }
        })
    }

    /// Emulated wiring
    pub fn wiring(&self) -> DummyWiring {
        self.state().wiring.clone()
    }

    /// Interrupt line of the chip, if wired
    pub fn interrupt_pin(&self) -> Option<Pin> {
        self.state().interrupt_pin
    }

    /// Replace the touched-key mask
    ///
    /// Any change pulls the interrupt line low once, invoking every handler
    /// registered on it.
    pub fn set_keys(&self, keys: u16) {
        let handlers: Vec<InterruptHandler> = {
            let mut state = self.state();
            let changed = state.keys != keys;
            state.store_keys(keys);
            match state.interrupt_pin {
                Some(irq) if changed => state
                    .handlers
                    .iter()
                    .filter(|(pin, _)| *pin == irq)
                    .map(|(_, handler)| *handler)
                    .collect(),
                _ => Vec::new(),
            }
        };
        for handler in handlers {
            handler();
        }
    }

    /// Touch one key
    ///
    /// Keys past the 16-bit mask are ignored.
    pub fn touch(&self, key: u8) {
        match key_bit(key.into()) {
            Some(bit) => self.set_keys(self.keys() | bit),
            None => log::warn!("dummy: no key {}", key),
        }
    }

    /// Release one key
    pub fn release(&self, key: u8) {
        match key_bit(key.into()) {
            Some(bit) => self.set_keys(self.keys() & !bit),
            None => log::warn!("dummy: no key {}", key),
        }
    }

    /// Currently touched keys
    pub fn keys(&self) -> u16 {
        self.state().keys
    }

    /// Read a register without going through the bus
    pub fn register(&self, reg: u8) -> u8 {
        self.state().regs[reg as usize]
    }

    /// Set a register without going through the bus
    pub fn set_register(&self, reg: u8, value: u8) {
        self.state().regs[reg as usize] = value;
    }

    /// Present these data-line bits on the next clock-low phases
    ///
    /// Overrides the key mask until the script runs out.
    pub fn script_serial_bits(&self, bits: &[u8]) {
        self.state().script.extend(bits.iter().map(|&b| b != 0));
    }

    /// Stop acknowledging bus transactions
    pub fn set_nack(&self, nack: bool) {
        self.state().nack = nack;
    }

    /// All bus transactions so far
    pub fn bus_log(&self) -> Vec<BusTransaction> {
        self.state().bus_log.clone()
    }

    /// Forget recorded bus transactions
    pub fn clear_bus_log(&self) {
        self.state().bus_log.clear();
    }

    /// Every `configure` call so far, in order
    pub fn pin_log(&self) -> Vec<(Pin, PinMode)> {
        self.state().pin_log.clone()
    }

    /// Current direction of a line
    pub fn pin_mode(&self, pin: Pin) -> Option<PinMode> {
        self.state().modes.get(&pin).copied()
    }

    /// Last level driven on a line
    pub fn level(&self, pin: Pin) -> Option<bool> {
        self.state().levels.get(&pin).copied()
    }

    /// Number of registered interrupt handlers
    pub fn handler_count(&self) -> usize {
        self.state().handlers.len()
    }

    /// Virtual time spent in delays
    pub fn elapsed_us(&self) -> u64 {
        self.state().elapsed_us
    }
}

impl DigitalIo for DummyChip {
    fn configure(&mut self, pin: Pin, mode: PinMode) -> Result<()> {
        let mut state = self.state();
        state.modes.insert(pin, mode);
        state.pin_log.push((pin, mode));
        Ok(())
    }

    fn read(&mut self, pin: Pin) -> Result<bool> {
        let state = self.state();
        let level = match &state.wiring {
            DummyWiring::Parallel { key_pins, .. } => match key_pins.iter().position(|&p| p == pin)
            {
                // Touched keys pull their line low
                Some(key) => key_bit(key).map_or(true, |bit| state.keys & bit == 0),
                None => state.levels.get(&pin).copied().unwrap_or(true),
            },
            DummyWiring::Serial { data, .. } if *data == pin => state.data_level,
            _ => state.levels.get(&pin).copied().unwrap_or(true),
        };
        Ok(level)
    }

    fn write(&mut self, pin: Pin, high: bool) -> Result<()> {
        let mut state = self.state();
        let was_high = state.levels.insert(pin, high).unwrap_or(true);
        if let DummyWiring::Serial { clock, .. } = state.wiring {
            if clock == pin {
                state.clock_edge(was_high, high);
            }
        }
        Ok(())
    }
}

impl Bus for DummyChip {
    fn begin(&mut self) -> Result<()> {
        self.state().bus_log.push(BusTransaction::Begin);
        Ok(())
    }

    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<()> {
        let mut state = self.state();
        state.check_address(addr)?;
        state.bus_log.push(BusTransaction::Write {
            addr,
            data: bytes.to_vec(),
        });

        let Some((&reg, values)) = bytes.split_first() else {
            return Ok(());
        };
        state.pointer = reg;
        for &value in values {
            let reg = state.pointer;
            // Key status is read-only
            if reg != registers::KEY_STATUS_LOW && reg != registers::KEY_STATUS_HIGH {
                state.regs[reg as usize] = value;
            }
            state.pointer = reg.wrapping_add(1);
        }
        Ok(())
    }

    fn read(&mut self, addr: u8, buf: &mut [u8]) -> Result<()> {
        let mut state = self.state();
        state.check_address(addr)?;
        for byte in buf.iter_mut() {
            let reg = state.pointer;
            *byte = state.regs[reg as usize];
            state.pointer = reg.wrapping_add(1);
        }
        state.bus_log.push(BusTransaction::Read {
            addr,
            data: buf.to_vec(),
        });
        Ok(())
    }
}

impl InterruptSource for DummyChip {
    fn on_falling_edge(&mut self, pin: Pin, handler: InterruptHandler) -> Result<()> {
        self.state().handlers.push((pin, handler));
        Ok(())
    }
}

impl Delay for DummyChip {
    fn delay_us(&mut self, us: u32) {
        // No real waiting, only virtual time
        self.state().elapsed_us += us as u64;
    }
}

/// Mask bit of `key`, `None` past the 16 keys the chip has
fn key_bit(key: usize) -> Option<u16> {
    u32::try_from(key).ok().and_then(|k| 1u16.checked_shl(k))
}

fn parse_hex_u16(value: &str) -> std::result::Result<u16, String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u16::from_str_radix(digits, 16).map_err(|_| format!("Invalid hex value: {}", value))
}

/// Parse emulator options from a list of key-value pairs
///
/// # Supported Options
///
/// - `transport=bus|serial|parallel` - wiring to emulate (default: bus)
/// - `keys=<hex>` - initially touched keys (default: 0)
/// - `keycount=N` - number of key lines for parallel wiring (default: 8)
/// - `addr=<hex>` - bus address (default: 0x50)
/// - `irq=N` - interrupt line for bus and serial wiring
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<DummyConfig, String> {
    let mut config = DummyConfig::default();
    let mut transport = "bus";
    let mut key_count: u8 = 8;
    let mut address = DEFAULT_ADDRESS;

    for &(key, value) in options {
        match key {
            "transport" => transport = value,
            "keys" => config.keys = parse_hex_u16(value)?,
            "keycount" => {
                key_count = value
                    .parse()
                    .ok()
                    .filter(|n| (1..=registers::MAX_KEYS as u8).contains(n))
                    .ok_or_else(|| format!("Invalid keycount value: {} (1-16)", value))?;
            }
            "addr" => {
                address = parse_hex_u16(value)
                    .ok()
                    .and_then(|a| u8::try_from(a).ok())
                    .filter(|&a| a <= 0x7F)
                    .ok_or_else(|| format!("Invalid addr value: {}", value))?;
            }
            "irq" => {
                let line = value
                    .parse()
                    .map_err(|_| format!("Invalid irq value: {}", value))?;
                config.interrupt_pin = Some(Pin(line));
            }
            _ => {
                log::warn!("dummy: Unknown option: {}={}", key, value);
            }
        }
    }

    config.wiring = match transport {
        "bus" => DummyWiring::Bus { address },
        "serial" => DummyWiring::serial(),
        "parallel" => DummyWiring::parallel(key_count),
        other => {
            return Err(format!(
                "Unknown dummy transport: {} (expected bus, serial or parallel)",
                other
            ))
        }
    };

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bs81x_core::{TouchDevice, TransportKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn write_of(data: &[u8]) -> BusTransaction {
        BusTransaction::Write {
            addr: DEFAULT_ADDRESS,
            data: data.to_vec(),
        }
    }

    #[test]
    fn test_bus_key_states() {
        let chip = DummyChip::new_default();
        let mut touch = TouchDevice::bus(chip.clone(), DEFAULT_ADDRESS);
        touch.begin().unwrap();

        chip.set_keys(0x00FF);
        assert_eq!(touch.key_states().unwrap().bits(), 0x00FF);

        chip.set_keys(0x0100);
        assert_eq!(touch.key_states().unwrap().bits(), 0x0100);
    }

    #[test]
    fn test_bus_key_states_reads_low_then_high() {
        let chip = DummyChip::new_default();
        let mut touch = TouchDevice::bus(chip.clone(), DEFAULT_ADDRESS);
        touch.key_states().unwrap();

        let log = chip.bus_log();
        assert_eq!(log.len(), 4);
        assert_eq!(log[0], write_of(&[0x08]));
        assert_eq!(log[2], write_of(&[0x09]));
        assert!(matches!(&log[1], BusTransaction::Read { data, .. } if data.len() == 1));
        assert!(matches!(&log[3], BusTransaction::Read { data, .. } if data.len() == 1));
    }

    #[test]
    fn test_bus_is_touched_single_bit() {
        let chip = DummyChip::new_default();
        chip.set_keys(0b0000_0100);
        let mut touch = TouchDevice::bus(chip, DEFAULT_ADDRESS);
        for key in 0..8 {
            assert_eq!(touch.is_touched(key).unwrap(), key == 2, "key {}", key);
        }
    }

    #[test]
    fn test_parallel_active_low() {
        let chip = DummyChip::with_wiring(DummyWiring::parallel(4));
        let pins = [Pin(0), Pin(1), Pin(2), Pin(3)];
        let mut touch = TouchDevice::parallel(chip.clone(), &pins, Pin(4)).unwrap();
        touch.begin().unwrap();

        assert!(!touch.is_touched(1).unwrap());
        chip.touch(1);
        assert!(touch.is_touched(1).unwrap());
        assert!(!touch.is_touched(0).unwrap());
        assert_eq!(touch.key_states().unwrap().bits(), 0);
    }

    #[test]
    fn test_touch_past_last_key_is_ignored() {
        let chip = DummyChip::new_default();
        chip.set_keys(0x8001);
        chip.touch(16);
        chip.release(200);
        assert_eq!(chip.keys(), 0x8001);

        chip.release(15);
        assert_eq!(chip.keys(), 0x0001);
    }

    #[test]
    fn test_wide_parallel_wiring_reads_released() {
        let mut chip = DummyChip::with_wiring(DummyWiring::parallel(20));
        chip.set_keys(0xFFFF);
        assert!(!DigitalIo::read(&mut chip, Pin(15)).unwrap());
        assert!(DigitalIo::read(&mut chip, Pin(18)).unwrap());

        // The driver still refuses more lines than the chip has keys
        assert!(matches!(
            chip.transport().err(),
            Some(Error::TooManyKeys { .. })
        ));
    }

    #[test]
    fn test_serial_scripted_bits() {
        let chip = DummyChip::with_wiring(DummyWiring::serial());
        let mut touch = TouchDevice::serial(chip.clone(), chip.clone(), Pin(0), Pin(1));
        touch.begin().unwrap();

        chip.script_serial_bits(&[1, 0, 1, 0, 0, 0, 0, 0]);
        assert_eq!(touch.key_states().unwrap().bits(), 0x0005);
        // Two 20 µs holds per bit
        assert_eq!(chip.elapsed_us(), 8 * 2 * 20);
        assert_eq!(chip.level(Pin(1)), Some(true));
    }

    #[test]
    fn test_serial_shifts_key_mask() {
        let chip = DummyChip::with_wiring(DummyWiring::serial());
        chip.set_keys(0x0093);
        let mut touch = TouchDevice::serial(chip.clone(), chip.clone(), Pin(0), Pin(1));
        touch.begin().unwrap();
        assert_eq!(touch.key_states().unwrap().bits(), 0x0093);

        // Upper keys do not fit in the serial frame
        chip.set_keys(0x1201);
        assert_eq!(touch.key_states().unwrap().bits(), 0x0001);
    }

    #[test]
    fn test_serial_rejects_is_touched() {
        let chip = DummyChip::with_wiring(DummyWiring::serial());
        let mut touch = TouchDevice::serial(chip.clone(), chip.clone(), Pin(0), Pin(1));
        assert_eq!(
            touch.is_touched(0),
            Err(Error::UnsupportedOperation {
                operation: "is_touched",
                transport: TransportKind::Serial,
            })
        );
        assert_eq!(chip.level(Pin(1)), None);
    }

    #[test]
    fn test_wakeup_enable_clears_bit7() {
        let chip = DummyChip::new(DummyConfig {
            option: 0xFF,
            ..Default::default()
        });
        let mut touch = TouchDevice::bus(chip.clone(), DEFAULT_ADDRESS);
        touch.set_wakeup_function(true).unwrap();
        assert_eq!(chip.register(0xB0), 0x7F);

        touch.set_wakeup_function(false).unwrap();
        assert_eq!(chip.register(0xB0), 0xFF);
    }

    #[test]
    fn test_sensitivity_write() {
        let chip = DummyChip::new_default();
        let mut touch = TouchDevice::bus(chip.clone(), DEFAULT_ADDRESS);
        touch.set_sensitivity(3, 0x20).unwrap();

        assert_eq!(chip.bus_log(), vec![write_of(&[0xB8, 0x20])]);
        assert_eq!(chip.register(0xB8), 0x20);
    }

    #[test]
    fn test_begin_twice_is_idempotent() {
        let chip = DummyChip::new_default();
        let mut touch = TouchDevice::bus(chip.clone(), DEFAULT_ADDRESS);
        touch.begin().unwrap();
        touch.begin().unwrap();
        assert_eq!(chip.bus_log(), vec![BusTransaction::Begin]);

        let chip = DummyChip::with_wiring(DummyWiring::serial());
        let mut touch = TouchDevice::serial(chip.clone(), chip.clone(), Pin(0), Pin(1));
        touch.begin().unwrap();
        let first = chip.pin_log();
        touch.begin().unwrap();
        assert_eq!(chip.pin_log(), first);
        assert_eq!(chip.pin_mode(Pin(0)), Some(PinMode::Input));
        assert_eq!(chip.pin_mode(Pin(1)), Some(PinMode::Output));

        let chip = DummyChip::with_wiring(DummyWiring::parallel(3));
        let pins = [Pin(0), Pin(1), Pin(2)];
        let mut touch = TouchDevice::parallel(chip.clone(), &pins, Pin(3)).unwrap();
        touch.begin().unwrap();
        touch.begin().unwrap();
        assert_eq!(
            chip.pin_log(),
            vec![
                (Pin(0), PinMode::Input),
                (Pin(1), PinMode::Input),
                (Pin(2), PinMode::Input),
                (Pin(3), PinMode::Output),
            ]
        );
    }

    #[test]
    fn test_wrong_address_is_nack() {
        let chip = DummyChip::new_default();
        let mut touch = TouchDevice::bus(chip, 0x51);
        assert_eq!(touch.key_states(), Err(Error::Bus(BusFault::Nack)));
    }

    #[test]
    fn test_nack_not_retried() {
        let chip = DummyChip::new_default();
        chip.set_nack(true);
        let mut touch = TouchDevice::bus(chip.clone(), DEFAULT_ADDRESS);
        assert!(touch.is_touched(0).is_err());
        assert!(chip.bus_log().is_empty());
    }

    #[test]
    fn test_stubs_do_not_touch_hardware() {
        let chip = DummyChip::new_default();
        let mut touch = TouchDevice::bus(chip.clone(), DEFAULT_ADDRESS);
        touch.enable_auto_calibration(true);
        touch.set_max_key_on_duration(64);
        assert!(chip.bus_log().is_empty());
    }

    static PARALLEL_EDGES: AtomicUsize = AtomicUsize::new(0);

    fn count_parallel_edge() {
        PARALLEL_EDGES.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_interrupt_on_signal_line() {
        let mut chip = DummyChip::with_wiring(DummyWiring::parallel(2));
        let touch = TouchDevice::parallel(chip.clone(), &[Pin(0), Pin(1)], Pin(2)).unwrap();
        touch
            .attach_interrupt_handler(&mut chip, count_parallel_edge)
            .unwrap();

        chip.touch(0);
        chip.touch(0);
        chip.release(0);
        assert_eq!(PARALLEL_EDGES.load(Ordering::SeqCst), 2);
    }

    static BUS_EDGES: AtomicUsize = AtomicUsize::new(0);

    fn count_bus_edge() {
        BUS_EDGES.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_interrupt_on_bus_needs_pin() {
        let mut chip = DummyChip::new(DummyConfig {
            interrupt_pin: Some(Pin(17)),
            ..Default::default()
        });
        let touch = TouchDevice::bus(chip.clone(), DEFAULT_ADDRESS);
        assert!(touch
            .attach_interrupt_handler(&mut chip, count_bus_edge)
            .is_err());

        let touch = touch.with_interrupt_pin(Pin(17));
        touch
            .attach_interrupt_handler(&mut chip, count_bus_edge)
            .unwrap();
        chip.touch(5);
        assert_eq!(BUS_EDGES.load(Ordering::SeqCst), 1);
        assert_eq!(chip.handler_count(), 1);
    }

    #[test]
    fn test_boxed_transport_matches_wiring() {
        for wiring in [
            DummyWiring::bus(),
            DummyWiring::serial(),
            DummyWiring::parallel(8),
        ] {
            let chip = DummyChip::with_wiring(wiring.clone());
            let transport = chip.transport().unwrap();
            let expected = match wiring {
                DummyWiring::Bus { .. } => TransportKind::Bus,
                DummyWiring::Serial { .. } => TransportKind::Serial,
                DummyWiring::Parallel { .. } => TransportKind::Parallel,
            };
            let mut touch = TouchDevice::new(transport);
            assert_eq!(touch.transport_kind(), expected);
            touch.begin().unwrap();
        }
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[]).unwrap();
        assert_eq!(config.wiring, DummyWiring::bus());
        assert_eq!(config.keys, 0);

        let config = parse_options(&[("transport", "parallel"), ("keycount", "4"), ("keys", "0x5")])
            .unwrap();
        assert_eq!(config.wiring, DummyWiring::parallel(4));
        assert_eq!(config.keys, 0x0005);

        let config = parse_options(&[("addr", "0x51"), ("irq", "7")]).unwrap();
        assert_eq!(config.wiring, DummyWiring::Bus { address: 0x51 });
        assert_eq!(config.interrupt_pin, Some(Pin(7)));
    }

    #[test]
    fn test_parse_options_rejects_bad_values() {
        assert!(parse_options(&[("transport", "spi")]).is_err());
        assert!(parse_options(&[("keycount", "17")]).is_err());
        assert!(parse_options(&[("keycount", "0")]).is_err());
        assert!(parse_options(&[("keys", "xyz")]).is_err());
        assert!(parse_options(&[("addr", "0x80")]).is_err());
    }
}
