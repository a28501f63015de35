//! Linux GPIO line access via the character device interface
//!
//! [`LinuxGpio`] requests every line the chip is wired to once at open time
//! and switches directions with `reconfigure`. Falling-edge interrupts are
//! served by [`LinuxGpioEdges`], which requests the interrupt line on its own
//! and hands edge events to a watcher thread.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::error::{LinuxGpioError, Result};

use gpiocdev::line::{EdgeDetection, Offset, Value};
use gpiocdev::request::{Config, Request};
use gpiocdev::Chip;

use bs81x_core::error::{Error as CoreError, Result as CoreResult};
use bs81x_core::platform::{Delay, DigitalIo, InterruptHandler, InterruptSource, Pin, PinMode};

/// Consumer label shown by `gpioinfo`
const CONSUMER: &str = "bs81x";

/// Delays shorter than this are busy-waited
const SPIN_THRESHOLD_US: u32 = 100;

/// Lines used by one wiring scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpioWiring {
    /// Bit-banged serial link
    Serial {
        /// Data line offset (input)
        data: Offset,
        /// Clock line offset (output)
        clock: Offset,
    },
    /// One line per key plus the signal line
    Parallel {
        /// Key line offsets, key 0 first
        keys: Vec<Offset>,
        /// Signal line offset (output)
        signal: Offset,
    },
}

impl GpioWiring {
    /// Every line offset this wiring requests
    pub fn lines(&self) -> Vec<Offset> {
        match self {
            Self::Serial { data, clock } => vec![*data, *clock],
            Self::Parallel { keys, signal } => {
                let mut lines = keys.clone();
                lines.push(*signal);
                lines
            }
        }
    }
}

/// Configuration for a chip wired to Linux GPIO lines
#[derive(Debug, Clone)]
pub struct LinuxGpioConfig {
    /// Device path (e.g., "/dev/gpiochip0")
    pub device: String,
    /// Line assignment
    pub wiring: GpioWiring,
    /// Interrupt line offset, serial wiring only
    pub irq: Option<Offset>,
}

/// Linux GPIO lines implementing [`DigitalIo`]
pub struct LinuxGpio {
    device: String,
    request: Request,
    modes: BTreeMap<Offset, PinMode>,
    levels: BTreeMap<Offset, bool>,
}

impl LinuxGpio {
    /// Open `device` and request `lines`, all as inputs
    pub fn open(device: &str, lines: &[Offset]) -> Result<Self> {
        if device.is_empty() {
            return Err(LinuxGpioError::NoDevice);
        }
        if lines.is_empty() {
            return Err(LinuxGpioError::InvalidParameter(
                "at least one GPIO line is required".into(),
            ));
        }

        log::debug!("linux_gpio: Opening device {}", device);

        let chip = Chip::from_path(device).map_err(|e| LinuxGpioError::ChipOpenFailed {
            path: device.to_string(),
            source: e,
        })?;
        if let Ok(info) = chip.info() {
            log::debug!(
                "linux_gpio: {} ({}), {} lines",
                info.name,
                info.label,
                info.num_lines
            );
        }

        let modes: BTreeMap<Offset, PinMode> =
            lines.iter().map(|&line| (line, PinMode::Input)).collect();
        let levels = BTreeMap::new();

        let request = Request::from_config(line_config(&modes, &levels))
            .on_chip(device)
            .with_consumer(CONSUMER)
            .request()
            .map_err(LinuxGpioError::LineRequestFailed)?;

        log::info!("linux_gpio: Opened {} (lines {:?})", device, lines);

        Ok(Self {
            device: device.to_string(),
            request,
            modes,
            levels,
        })
    }

    /// Device path
    pub fn device(&self) -> &str {
        &self.device
    }

    fn offset(&self, pin: Pin) -> CoreResult<Offset> {
        if self.modes.contains_key(&pin.0) {
            Ok(pin.0)
        } else {
            log::error!("linux_gpio: {} was not requested on {}", pin, self.device);
            Err(CoreError::Gpio(pin))
        }
    }
}

/// Build a request configuration covering every line
///
/// Outputs start at their last driven level, high if never driven.
fn line_config(modes: &BTreeMap<Offset, PinMode>, levels: &BTreeMap<Offset, bool>) -> Config {
    let mut cfg = Config::default();
    for (&line, &mode) in modes {
        match mode {
            PinMode::Input => {
                cfg.with_line(line).as_input();
            }
            PinMode::Output => {
                let high = levels.get(&line).copied().unwrap_or(true);
                cfg.with_line(line).as_output(to_value(high));
            }
        }
    }
    cfg
}

/// Move `line` to `mode`, keeping `modes` untouched unless `apply` succeeds
fn switch_mode<E>(
    modes: &mut BTreeMap<Offset, PinMode>,
    line: Offset,
    mode: PinMode,
    apply: impl FnOnce(&BTreeMap<Offset, PinMode>) -> std::result::Result<(), E>,
) -> std::result::Result<(), E> {
    if modes.get(&line) == Some(&mode) {
        return Ok(());
    }
    let mut candidate = modes.clone();
    candidate.insert(line, mode);
    apply(&candidate)?;
    *modes = candidate;
    Ok(())
}

fn to_value(high: bool) -> Value {
    if high {
        Value::Active
    } else {
        Value::Inactive
    }
}

impl DigitalIo for LinuxGpio {
    fn configure(&mut self, pin: Pin, mode: PinMode) -> CoreResult<()> {
        let line = self.offset(pin)?;
        let request = &mut self.request;
        let levels = &self.levels;
        switch_mode(&mut self.modes, line, mode, |modes| {
            request.reconfigure(&line_config(modes, levels))
        })
        .map_err(|e| {
            log::error!("Failed to configure {} as {:?}: {}", pin, mode, e);
            CoreError::Gpio(pin)
        })
    }

    fn read(&mut self, pin: Pin) -> CoreResult<bool> {
        let line = self.offset(pin)?;
        match self.request.value(line) {
            Ok(Value::Active) => Ok(true),
            Ok(Value::Inactive) => Ok(false),
            Err(e) => {
                log::error!("Failed to get {}: {}", pin, e);
                Err(CoreError::Gpio(pin))
            }
        }
    }

    fn write(&mut self, pin: Pin, high: bool) -> CoreResult<()> {
        let line = self.offset(pin)?;
        self.request.set_value(line, to_value(high)).map_err(|e| {
            log::error!("Failed to set {}: {}", pin, e);
            CoreError::Gpio(pin)
        })?;
        self.levels.insert(line, high);
        Ok(())
    }
}

/// Falling-edge interrupts on Linux GPIO lines
///
/// Every registered line gets its own request and watcher thread; the
/// handler runs on that thread.
pub struct LinuxGpioEdges {
    device: String,
    watched: Vec<Offset>,
}

impl LinuxGpioEdges {
    /// Serve interrupts from lines of `device`
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            watched: Vec::new(),
        }
    }

    /// Lines with a running watcher
    pub fn watched(&self) -> &[Offset] {
        &self.watched
    }
}

impl InterruptSource for LinuxGpioEdges {
    fn on_falling_edge(&mut self, pin: Pin, handler: InterruptHandler) -> CoreResult<()> {
        let request = Request::builder()
            .on_chip(&self.device)
            .with_consumer(CONSUMER)
            .with_line(pin.0)
            .as_input()
            .with_edge_detection(EdgeDetection::FallingEdge)
            .request()
            .map_err(|e| {
                log::error!("Failed to request {} for edge events: {}", pin, e);
                CoreError::Gpio(pin)
            })?;

        std::thread::Builder::new()
            .name(format!("bs81x-irq-{}", pin.0))
            .spawn(move || {
                for event in request.edge_events() {
                    match event {
                        Ok(_) => handler(),
                        Err(e) => {
                            log::error!("linux_gpio: edge watcher stopped: {}", e);
                            break;
                        }
                    }
                }
            })
            .map_err(|e| {
                log::error!("Failed to start edge watcher for {}: {}", pin, e);
                CoreError::Gpio(pin)
            })?;

        log::debug!("linux_gpio: watching {} for falling edges", pin);
        self.watched.push(pin.0);
        Ok(())
    }
}

/// Microsecond delay for bit-banging
///
/// Short holds spin on the monotonic clock since `thread::sleep` overshoots
/// by tens of microseconds; longer ones sleep.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinDelay;

impl Delay for SpinDelay {
    fn delay_us(&mut self, us: u32) {
        let duration = Duration::from_micros(us as u64);
        if us >= SPIN_THRESHOLD_US {
            std::thread::sleep(duration);
            return;
        }
        let start = Instant::now();
        while start.elapsed() < duration {
            std::hint::spin_loop();
        }
    }
}

fn parse_line(name: &str, value: &str) -> std::result::Result<Offset, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid {} value: {}", name, value))
}

/// Resolve `dev=` / `gpiochip=` into a device path
fn resolve_device(
    dev: Option<&str>,
    gpiochip: Option<u32>,
    usage: &str,
) -> std::result::Result<String, String> {
    match (dev, gpiochip) {
        (Some(_), Some(_)) => Err("Only one of 'dev' or 'gpiochip' can be specified".to_string()),
        (Some(dev), None) => Ok(dev.to_string()),
        (None, Some(n)) => {
            if n > 9 {
                return Err("Maximum gpiochip number supported is 9".to_string());
            }
            Ok(format!("/dev/gpiochip{}", n))
        }
        (None, None) => Err(format!(
            "Either 'dev' or 'gpiochip' must be specified.\n e.g. {}",
            usage
        )),
    }
}

/// Parse serial wiring options from a list of key-value pairs
///
/// # Supported Options
///
/// - `dev=/dev/gpiochipN` - GPIO chip device path (required, or use gpiochip)
/// - `gpiochip=N` - GPIO chip number (alternative to dev)
/// - `data=N` - data line offset (required)
/// - `clock=N` - clock line offset (required)
/// - `irq=N` - interrupt line offset (optional)
pub fn parse_serial_options(
    options: &[(&str, &str)],
) -> std::result::Result<LinuxGpioConfig, String> {
    let mut dev = None;
    let mut gpiochip = None;
    let mut data = None;
    let mut clock = None;
    let mut irq = None;

    for &(key, value) in options {
        match key {
            "dev" => dev = Some(value),
            "gpiochip" => gpiochip = Some(parse_line("gpiochip", value)?),
            "data" => data = Some(parse_line("data", value)?),
            "clock" => clock = Some(parse_line("clock", value)?),
            "irq" => irq = Some(parse_line("irq", value)?),
            _ => {
                log::warn!("gpio-serial: Unknown option: {}={}", key, value);
            }
        }
    }

    let device = resolve_device(dev, gpiochip, "gpio-serial:gpiochip=0,data=17,clock=27")?;
    let data = data.ok_or("Missing required parameter: data")?;
    let clock = clock.ok_or("Missing required parameter: clock")?;
    if data == clock {
        return Err("data and clock must be different lines".to_string());
    }
    if irq.is_some_and(|irq| irq == data || irq == clock) {
        return Err("irq must not share a line with data or clock".to_string());
    }

    Ok(LinuxGpioConfig {
        device,
        wiring: GpioWiring::Serial { data, clock },
        irq,
    })
}

/// Parse parallel wiring options from a list of key-value pairs
///
/// # Supported Options
///
/// - `dev=/dev/gpiochipN` - GPIO chip device path (required, or use gpiochip)
/// - `gpiochip=N` - GPIO chip number (alternative to dev)
/// - `keys=A+B+...` - key line offsets, key 0 first (required, at most 16)
/// - `out=N` - signal line offset (required)
pub fn parse_parallel_options(
    options: &[(&str, &str)],
) -> std::result::Result<LinuxGpioConfig, String> {
    let mut dev = None;
    let mut gpiochip = None;
    let mut keys = Vec::new();
    let mut signal = None;

    for &(key, value) in options {
        match key {
            "dev" => dev = Some(value),
            "gpiochip" => gpiochip = Some(parse_line("gpiochip", value)?),
            "keys" => {
                keys = value
                    .split('+')
                    .map(|line| parse_line("keys", line.trim()))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
            }
            "out" => signal = Some(parse_line("out", value)?),
            _ => {
                log::warn!("gpio-parallel: Unknown option: {}={}", key, value);
            }
        }
    }

    let device = resolve_device(dev, gpiochip, "gpio-parallel:gpiochip=0,keys=5+6+13,out=26")?;
    if keys.is_empty() {
        return Err("Missing required parameter: keys".to_string());
    }
    if keys.len() > bs81x_core::registers::MAX_KEYS {
        return Err(format!(
            "At most {} key lines are supported, got {}",
            bs81x_core::registers::MAX_KEYS,
            keys.len()
        ));
    }
    let signal = signal.ok_or("Missing required parameter: out")?;

    Ok(LinuxGpioConfig {
        device,
        wiring: GpioWiring::Parallel { keys, signal },
        irq: None,
    })
}
