//! Linux I2C bus implementation
//!
//! This module provides the `LinuxI2c` struct that implements the `Bus`
//! trait using Linux's i2c-dev interface. Each `write`/`read` call is one
//! plain `write(2)`/`read(2)` on the device file, which the kernel turns into
//! a single bus transaction with its own start and stop condition.

use crate::error::{LinuxI2cError, Result};

use bs81x_core::error::{BusFault, Error as CoreError, Result as CoreResult};
use bs81x_core::platform::Bus;

use nix::errno::Errno;

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::unix::io::AsRawFd;

/// Bus address the chip answers on unless strapped otherwise
pub const DEFAULT_ADDRESS: u8 = 0x50;

/// Highest valid 7-bit address
const MAX_ADDRESS: u8 = 0x7F;

/// Linux i2c-dev ioctl constants
mod ioctl {
    use nix::ioctl_write_int_bad;

    /// Select the target address for subsequent read/write calls
    const I2C_SLAVE: libc::c_ulong = 0x0703;

    ioctl_write_int_bad!(i2c_slave, I2C_SLAVE);
}

/// Configuration for opening a Linux I2C bus
#[derive(Debug, Clone)]
pub struct LinuxI2cConfig {
    /// Device path (e.g., "/dev/i2c-1")
    pub device: String,
    /// 7-bit chip address (default: 0x50)
    pub address: u8,
}

impl Default for LinuxI2cConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            address: DEFAULT_ADDRESS,
        }
    }
}

impl LinuxI2cConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Set the chip address
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }
}

/// Map a kernel error code to a bus fault
///
/// Adapters report a missing acknowledge as ENXIO or EREMOTEIO and a lost
/// arbitration as EAGAIN.
pub fn fault_from_errno(errno: Errno) -> BusFault {
    match errno {
        Errno::ENXIO | Errno::EREMOTEIO => BusFault::Nack,
        Errno::ETIMEDOUT => BusFault::Timeout,
        Errno::EAGAIN => BusFault::ArbitrationLoss,
        _ => BusFault::Other,
    }
}

fn fault_from_io(e: &std::io::Error) -> BusFault {
    e.raw_os_error()
        .map(|code| fault_from_errno(Errno::from_raw(code)))
        .unwrap_or(BusFault::Other)
}

/// Linux I2C bus using the i2c-dev interface
pub struct LinuxI2c {
    /// File handle for the i2c-dev device
    file: File,
    /// Device path, for log messages
    path: String,
    /// Address currently selected with I2C_SLAVE
    selected: Option<u8>,
}

impl LinuxI2c {
    /// Open a Linux I2C bus and select the configured chip address
    pub fn open(config: &LinuxI2cConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxI2cError::NoDevice);
        }

        log::debug!("linux_i2c: Opening device {}", config.device);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxI2cError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        let mut i2c = Self {
            file,
            path: config.device.clone(),
            selected: None,
        };
        i2c.select(config.address)
            .map_err(|errno| LinuxI2cError::AddressSelectFailed {
                address: config.address,
                source: std::io::Error::from_raw_os_error(errno as i32),
            })?;

        log::info!(
            "linux_i2c: Opened {} (address {:#04x})",
            config.device,
            config.address
        );

        Ok(i2c)
    }

    /// Device path
    pub fn path(&self) -> &str {
        &self.path
    }

    fn select(&mut self, addr: u8) -> std::result::Result<(), Errno> {
        if self.selected == Some(addr) {
            return Ok(());
        }
        unsafe {
            ioctl::i2c_slave(self.file.as_raw_fd(), addr as libc::c_int)?;
        }
        self.selected = Some(addr);
        Ok(())
    }

    fn select_or_fault(&mut self, addr: u8) -> CoreResult<()> {
        self.select(addr).map_err(|errno| {
            log::error!("linux_i2c: selecting {:#04x} failed: {}", addr, errno);
            CoreError::Bus(fault_from_errno(errno))
        })
    }
}

impl Bus for LinuxI2c {
    fn begin(&mut self) -> CoreResult<()> {
        // The adapter is ready once the device file is open
        log::debug!("linux_i2c: {} ready", self.path);
        Ok(())
    }

    fn write(&mut self, addr: u8, bytes: &[u8]) -> CoreResult<()> {
        self.select_or_fault(addr)?;
        match self.file.write(bytes) {
            Ok(n) if n == bytes.len() => Ok(()),
            Ok(n) => {
                log::error!(
                    "linux_i2c: short write to {:#04x} ({} of {} bytes)",
                    addr,
                    n,
                    bytes.len()
                );
                Err(CoreError::Bus(BusFault::ShortTransfer))
            }
            Err(e) => {
                log::error!("linux_i2c: write to {:#04x} failed: {}", addr, e);
                Err(CoreError::Bus(fault_from_io(&e)))
            }
        }
    }

    fn read(&mut self, addr: u8, buf: &mut [u8]) -> CoreResult<()> {
        self.select_or_fault(addr)?;
        match self.file.read(buf) {
            Ok(n) if n == buf.len() => Ok(()),
            Ok(n) => {
                log::error!(
                    "linux_i2c: short read from {:#04x} ({} of {} bytes)",
                    addr,
                    n,
                    buf.len()
                );
                Err(CoreError::Bus(BusFault::ShortTransfer))
            }
            Err(e) => {
                log::error!("linux_i2c: read from {:#04x} failed: {}", addr, e);
                Err(CoreError::Bus(fault_from_io(&e)))
            }
        }
    }
}

/// Parse a bus address, hex with `0x` prefix or decimal
fn parse_address(value: &str) -> std::result::Result<u8, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => value.parse(),
    };
    match parsed {
        Ok(addr) if addr <= MAX_ADDRESS => Ok(addr),
        _ => Err(format!("Invalid addr value: {} (expected 0x00-0x7f)", value)),
    }
}

/// Parse bus options from a list of key-value pairs
///
/// # Supported Options
///
/// - `dev=/dev/i2c-N` - Device path (required, or use bus)
/// - `bus=N` - Bus number (alternative to dev)
/// - `addr=0x50` - Chip address (optional, default: 0x50)
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxI2cConfig, String> {
    let mut config = LinuxI2cConfig::default();
    let mut bus: Option<u32> = None;

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "bus" => {
                bus = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid bus value: {}", value))?,
                );
            }
            "addr" => {
                config.address = parse_address(value)?;
            }
            _ => {
                log::warn!("linux_i2c: Unknown option: {}={}", key, value);
            }
        }
    }

    match bus {
        Some(_) if !config.device.is_empty() => {
            return Err("Only one of 'dev' or 'bus' can be specified".to_string());
        }
        Some(n) => config.device = format!("/dev/i2c-{}", n),
        None if config.device.is_empty() => {
            return Err("Either 'dev' or 'bus' must be specified.\n\
                 e.g. i2c:dev=/dev/i2c-1,addr=0x50"
                .to_string());
        }
        None => {}
    }

    Ok(config)
}
