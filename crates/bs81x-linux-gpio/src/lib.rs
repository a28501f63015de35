//! bs81x-linux-gpio - Linux GPIO backend for the BS81x driver
//!
//! This crate wires a BS81x touch-key chip to GPIO lines using the Linux
//! character device GPIO interface (gpiocdev). Both GPIO transports are
//! supported:
//!
//! - **Serial**: the host drives the clock line and samples the data line
//!   with 20 µs holds ([`SpinDelay`] keeps those accurate).
//! - **Parallel**: one input line per key, active low, plus a signal line.
//!
//! # Example
//!
//! ```no_run
//! use bs81x_core::platform::Pin;
//! use bs81x_core::TouchDevice;
//! use bs81x_linux_gpio::{LinuxGpio, SpinDelay};
//!
//! let gpio = LinuxGpio::open("/dev/gpiochip0", &[17, 27])?;
//! let mut touch = TouchDevice::serial(gpio, SpinDelay, Pin(17), Pin(27));
//! touch.begin()?;
//! println!("keys: {}", touch.key_states()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with the bs81x CLI
//!
//! ```bash
//! bs81x keys -t gpio-serial:gpiochip=0,data=17,clock=27
//! bs81x watch -t gpio-serial:gpiochip=0,data=17,clock=27,irq=22
//! bs81x touched -t gpio-parallel:dev=/dev/gpiochip0,keys=5+6+13+19,out=26 --key 2
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel 4.8+ with GPIO character device support (kernel 5.5+ for v2 API)
//! - Access to `/dev/gpiochipN` devices (may require root or udev rules)

pub mod device;
pub mod error;

// Re-exports
pub use device::{
    parse_parallel_options, parse_serial_options, GpioWiring, LinuxGpio, LinuxGpioConfig,
    LinuxGpioEdges, SpinDelay,
};
pub use error::{LinuxGpioError, Result};

use bs81x_core::platform::Pin;
use bs81x_core::protocol::{ParallelIo, SerialIo};
use bs81x_core::{KeyTransport, TouchDevice};

/// Touch device over a boxed transport, as handed to the CLI
pub type BoxedTouchDevice = TouchDevice<Box<dyn KeyTransport + Send>>;

/// Open a chip from a parsed configuration
///
/// Returns the device and, when the configuration names an interrupt line,
/// an edge source serving it.
pub fn open(
    config: &LinuxGpioConfig,
) -> std::result::Result<(BoxedTouchDevice, Option<LinuxGpioEdges>), Box<dyn std::error::Error>> {
    let gpio = LinuxGpio::open(&config.device, &config.wiring.lines())?;

    let transport: Box<dyn KeyTransport + Send> = match &config.wiring {
        GpioWiring::Serial { data, clock } => {
            Box::new(SerialIo::new(gpio, SpinDelay, Pin(*data), Pin(*clock)))
        }
        GpioWiring::Parallel { keys, signal } => {
            let pins: Vec<Pin> = keys.iter().copied().map(Pin).collect();
            Box::new(ParallelIo::new(gpio, &pins, Pin(*signal))?)
        }
    };

    let mut touch = TouchDevice::new(transport);
    let edges = match config.irq {
        Some(irq) => {
            touch = touch.with_interrupt_pin(Pin(irq));
            Some(LinuxGpioEdges::new(config.device.clone()))
        }
        None => None,
    };
    Ok((touch, edges))
}

/// Open a chip on the bit-banged serial link
///
/// This is a convenience function for use in the CLI transport dispatch.
///
/// # Example Options
///
/// - `dev=/dev/gpiochip0` - GPIO chip device path (or use gpiochip=N)
/// - `gpiochip=0` - GPIO chip number (alternative to dev)
/// - `data=17` - data line offset (required)
/// - `clock=27` - clock line offset (required)
/// - `irq=22` - interrupt line offset (optional)
pub fn open_gpio_serial(
    options: &[(&str, &str)],
) -> std::result::Result<(BoxedTouchDevice, Option<LinuxGpioEdges>), Box<dyn std::error::Error>> {
    let config = parse_serial_options(options)?;
    open(&config)
}

/// Open a chip wired in parallel
///
/// The signal line is driven by the host, so no edge source is returned;
/// callers poll the key lines instead.
///
/// # Example Options
///
/// - `dev=/dev/gpiochip0` - GPIO chip device path (or use gpiochip=N)
/// - `gpiochip=0` - GPIO chip number (alternative to dev)
/// - `keys=5+6+13` - key line offsets, key 0 first (required)
/// - `out=26` - signal line offset (required)
pub fn open_gpio_parallel(
    options: &[(&str, &str)],
) -> std::result::Result<BoxedTouchDevice, Box<dyn std::error::Error>> {
    let config = parse_parallel_options(options)?;
    let (touch, _) = open(&config)?;
    Ok(touch)
}
