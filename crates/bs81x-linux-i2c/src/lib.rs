//! bs81x-linux-i2c - Linux i2c-dev backend for the BS81x driver
//!
//! This crate talks to a BS81x on the two-wire bus through the Linux
//! `/dev/i2c-N` character devices.
//!
//! # Example
//!
//! ```no_run
//! use bs81x_core::TouchDevice;
//! use bs81x_linux_i2c::{LinuxI2c, LinuxI2cConfig};
//!
//! let config = LinuxI2cConfig::new("/dev/i2c-1").with_address(0x50);
//! let i2c = LinuxI2c::open(&config)?;
//!
//! let mut touch = TouchDevice::bus(i2c, config.address);
//! touch.begin()?;
//! touch.set_sensitivity(0, 0x20)?;
//! println!("keys: {}", touch.key_states()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with the bs81x CLI
//!
//! ```bash
//! bs81x keys -t i2c:bus=1
//! bs81x wakeup -t i2c:dev=/dev/i2c-1,addr=0x50 --enable
//! ```
//!
//! # System Requirements
//!
//! - The `i2c-dev` kernel module loaded
//! - Access to `/dev/i2c-N` devices (may require root or membership in the
//!   `i2c` group)

pub mod device;
pub mod error;

// Re-exports
pub use device::{fault_from_errno, parse_options, LinuxI2c, LinuxI2cConfig, DEFAULT_ADDRESS};
pub use error::{LinuxI2cError, Result};

use bs81x_core::protocol::BusRegisterIo;
use bs81x_core::{KeyTransport, TouchDevice};

/// Open a chip on a Linux I2C bus and return a touch device over a boxed transport
///
/// This is a convenience function for use in the CLI transport dispatch.
///
/// # Example Options
///
/// - `dev=/dev/i2c-1` - Device path (or use bus=N)
/// - `bus=1` - Bus number (alternative to dev)
/// - `addr=0x50` - Optional: chip address (default: 0x50)
pub fn open_i2c(
    options: &[(&str, &str)],
) -> std::result::Result<TouchDevice<Box<dyn KeyTransport + Send>>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let i2c = LinuxI2c::open(&config)?;
    let transport: Box<dyn KeyTransport + Send> =
        Box::new(BusRegisterIo::new(i2c, config.address));
    Ok(TouchDevice::new(transport))
}
