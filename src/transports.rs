//! Transport registration and dispatch
//!
//! This module provides a centralized registry for all transports, with
//! support for feature-gated inclusion and dynamic help text generation.

use bs81x_core::{InterruptSource, KeyTransport, TouchDevice};
use thiserror::Error;

/// Touch device over a boxed transport
pub type BoxedTouchDevice = TouchDevice<Box<dyn KeyTransport + Send>>;

/// Errors raised while resolving a transport string
#[derive(Debug, Error)]
pub enum TransportError {
    /// No transport with this name is compiled in
    #[error("Unknown transport: {name}\n\n{help}\nUse 'bs81x list-transports' for more details")]
    Unknown { name: String, help: String },

    /// An option value could not be used
    #[error("Invalid {transport} parameters: {message}")]
    InvalidParameter {
        transport: &'static str,
        message: String,
    },
}

/// Information about a transport
pub struct TransportInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// A touch device ready to use, plus the interrupt source serving its line
pub struct OpenedTransport {
    /// The device
    pub device: BoxedTouchDevice,
    /// Edge source for the device's interrupt line, if one exists
    pub interrupts: Option<Box<dyn InterruptSource + Send>>,
}

impl OpenedTransport {
    fn polled(device: BoxedTouchDevice) -> Self {
        Self {
            device,
            interrupts: None,
        }
    }
}

/// Get information about all available transports (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_transports() -> Vec<TransportInfo> {
    let mut transports = Vec::new();

    #[cfg(feature = "dummy")]
    transports.push(TransportInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory BS81x emulator (transport=bus|serial|parallel,keys=<hex>,keycount=<n>)",
    });

    #[cfg(feature = "linux-i2c")]
    transports.push(TransportInfo {
        name: "i2c",
        aliases: &["linux_i2c", "bus"],
        description: "Linux i2c-dev bus (dev=/dev/i2c-N|bus=N,addr=0x50,irq=<line>,gpiochip=N)",
    });

    #[cfg(feature = "linux-gpio")]
    transports.push(TransportInfo {
        name: "gpio-serial",
        aliases: &["serial"],
        description: "Bit-banged serial on Linux GPIO (dev=|gpiochip=N,data=<line>,clock=<line>,irq=<line>)",
    });

    #[cfg(feature = "linux-gpio")]
    transports.push(TransportInfo {
        name: "gpio-parallel",
        aliases: &["parallel"],
        description: "One Linux GPIO line per key (dev=|gpiochip=N,keys=<l0>+<l1>+...,out=<line>)",
    });

    transports
}

/// Generate help text listing all available transports
pub fn transport_help() -> String {
    let transports = available_transports();

    if transports.is_empty() {
        return "No transports available (recompile with transport features enabled)".to_string();
    }

    let mut help = String::from("Available transports:\n");
    for t in &transports {
        help.push_str(&format!("  {:14} - {}\n", t.name, t.description));
    }
    help
}

/// Resolve a name or alias to the primary transport name
pub fn find_transport(name: &str) -> Option<&'static str> {
    available_transports()
        .into_iter()
        .find(|t| t.name == name || t.aliases.contains(&name))
        .map(|t| t.name)
}

/// Parse a transport string into name and options
///
/// Format: "name" or "name:option1=value1,option2=value2"
pub fn parse_transport_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter_map(|opt| opt.split_once('='))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

/// Open the transport named by `transport`
///
/// The device is returned before `begin()`; commands call it themselves.
pub fn open_transport(transport: &str) -> Result<OpenedTransport, Box<dyn std::error::Error>> {
    let (name, options) = parse_transport_string(transport);

    let canonical_name = find_transport(name).ok_or_else(|| TransportError::Unknown {
        name: name.to_string(),
        help: transport_help(),
    })?;

    log::debug!("Opening {} transport with {:?}", canonical_name, options);

    match canonical_name {
        #[cfg(feature = "dummy")]
        "dummy" => open_dummy(&options),

        #[cfg(feature = "linux-i2c")]
        "i2c" => open_i2c(&options),

        #[cfg(feature = "linux-gpio")]
        "gpio-serial" => {
            let (device, edges) = bs81x_linux_gpio::open_gpio_serial(&options)
                .map_err(|e| format!("Failed to open GPIO serial transport: {}", e))?;
            Ok(OpenedTransport {
                device,
                interrupts: edges.map(|e| Box::new(e) as Box<dyn InterruptSource + Send>),
            })
        }

        #[cfg(feature = "linux-gpio")]
        "gpio-parallel" => {
            let device = bs81x_linux_gpio::open_gpio_parallel(&options)
                .map_err(|e| format!("Failed to open GPIO parallel transport: {}", e))?;
            Ok(OpenedTransport::polled(device))
        }

        _ => Err(TransportError::Unknown {
            name: name.to_string(),
            help: transport_help(),
        }
        .into()),
    }
}

#[cfg(feature = "dummy")]
fn open_dummy(options: &[(&str, &str)]) -> Result<OpenedTransport, Box<dyn std::error::Error>> {
    use bs81x_dummy::DummyChip;

    let config = bs81x_dummy::parse_options(options).map_err(|message| {
        TransportError::InvalidParameter {
            transport: "dummy",
            message,
        }
    })?;
    let irq = config.interrupt_pin;

    log::info!("Opening dummy {:?} chip", config.wiring);
    let chip = DummyChip::new(config);
    let mut device = TouchDevice::new(chip.transport()?);
    if let Some(pin) = irq {
        device = device.with_interrupt_pin(pin);
    }

    Ok(OpenedTransport {
        device,
        interrupts: Some(Box::new(chip)),
    })
}

/// Split off the interrupt options the bus backend does not understand
#[cfg_attr(not(feature = "linux-i2c"), allow(dead_code))]
fn split_interrupt_options<'a>(
    options: &[(&'a str, &'a str)],
) -> Result<(Vec<(&'a str, &'a str)>, Option<u32>, u32), TransportError> {
    let mut rest = Vec::new();
    let mut irq = None;
    let mut gpiochip = None;

    for &(key, value) in options {
        let invalid = || TransportError::InvalidParameter {
            transport: "i2c",
            message: format!("Invalid {} value: {}", key, value),
        };
        match key {
            "irq" => irq = Some(value.parse().map_err(|_| invalid())?),
            "gpiochip" => gpiochip = Some(value.parse().map_err(|_| invalid())?),
            _ => rest.push((key, value)),
        }
    }
    if irq.is_none() && gpiochip.is_some() {
        return Err(TransportError::InvalidParameter {
            transport: "i2c",
            message: "gpiochip selects the interrupt line's chip and needs irq".to_string(),
        });
    }
    Ok((rest, irq, gpiochip.unwrap_or(0)))
}

#[cfg(feature = "linux-i2c")]
fn open_i2c(options: &[(&str, &str)]) -> Result<OpenedTransport, Box<dyn std::error::Error>> {
    let (bus_options, irq, gpiochip) = split_interrupt_options(options)?;

    log::info!("Opening Linux I2C transport...");
    let device = bs81x_linux_i2c::open_i2c(&bus_options).map_err(|e| {
        format!(
            "Failed to open Linux I2C transport: {}\n\
             Make sure the i2c-dev module is loaded and you have read/write permissions.",
            e
        )
    })?;

    let Some(irq) = irq else {
        return Ok(OpenedTransport::polled(device));
    };

    #[cfg(feature = "linux-gpio")]
    {
        let edges = bs81x_linux_gpio::LinuxGpioEdges::new(format!("/dev/gpiochip{}", gpiochip));
        Ok(OpenedTransport {
            device: device.with_interrupt_pin(bs81x_core::Pin(irq)),
            interrupts: Some(Box::new(edges)),
        })
    }

    #[cfg(not(feature = "linux-gpio"))]
    {
        let _ = (device, gpiochip);
        Err(TransportError::InvalidParameter {
            transport: "i2c",
            message: format!("irq={} needs the linux-gpio feature", irq),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transport_string() {
        let (name, options) = parse_transport_string("dummy");
        assert_eq!(name, "dummy");
        assert!(options.is_empty());

        let (name, options) = parse_transport_string("i2c:bus=1,addr=0x51");
        assert_eq!(name, "i2c");
        assert_eq!(options, vec![("bus", "1"), ("addr", "0x51")]);

        let (name, options) = parse_transport_string("gpio-parallel:keys=5+6,out=26,junk");
        assert_eq!(name, "gpio-parallel");
        assert_eq!(options, vec![("keys", "5+6"), ("out", "26")]);
    }

    #[test]
    fn test_split_interrupt_options() {
        let (rest, irq, chip) =
            split_interrupt_options(&[("bus", "1"), ("irq", "22"), ("gpiochip", "2")]).unwrap();
        assert_eq!(rest, vec![("bus", "1")]);
        assert_eq!(irq, Some(22));
        assert_eq!(chip, 2);

        let (_, irq, chip) = split_interrupt_options(&[("bus", "1")]).unwrap();
        assert_eq!(irq, None);
        assert_eq!(chip, 0);

        assert!(split_interrupt_options(&[("irq", "x")]).is_err());
    }

    #[test]
    fn test_gpiochip_without_irq_is_rejected() {
        let err = split_interrupt_options(&[("bus", "1"), ("gpiochip", "2")]).unwrap_err();
        assert!(err.to_string().contains("needs irq"));

        let (_, irq, chip) = split_interrupt_options(&[("irq", "5")]).unwrap();
        assert_eq!((irq, chip), (Some(5), 0));
    }

    #[test]
    fn test_unknown_transport() {
        let err = open_transport("spi:dev=/dev/spidev0.0").err().unwrap();
        assert!(err.to_string().contains("Unknown transport: spi"));
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_open_dummy() {
        let mut opened = open_transport("dummy:keys=0x0104").unwrap();
        opened.device.begin().unwrap();
        assert_eq!(opened.device.key_states().unwrap().bits(), 0x0104);
        assert!(opened.device.interrupt_pin().is_none());

        let opened = open_transport("dummy:transport=parallel,keycount=4").unwrap();
        assert_eq!(
            opened.device.transport_kind(),
            bs81x_core::TransportKind::Parallel
        );
        assert_eq!(opened.device.interrupt_pin(), Some(bs81x_core::Pin(4)));

        assert!(open_transport("dummy:transport=usb").is_err());
    }

    #[cfg(feature = "linux-gpio")]
    #[test]
    fn test_aliases() {
        assert_eq!(find_transport("serial"), Some("gpio-serial"));
        assert_eq!(find_transport("parallel"), Some("gpio-parallel"));
    }
}
