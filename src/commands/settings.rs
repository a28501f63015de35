//! Chip configuration commands (bus transport only)

use bs81x_core::{KeyTransport, TouchDevice};

/// Set the sensitivity of one key
pub fn cmd_sensitivity<T: KeyTransport>(
    device: &mut TouchDevice<T>,
    key: u8,
    value: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    device.begin()?;
    device.set_sensitivity(key, value)?;
    println!("K{}: sensitivity set to {:#04x}", key, value);
    Ok(())
}

/// Switch the wake-up function
pub fn cmd_wakeup<T: KeyTransport>(
    device: &mut TouchDevice<T>,
    enable: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    device.begin()?;
    device.set_wakeup_function(enable)?;
    println!(
        "Wake-up function {}",
        if enable { "enabled" } else { "disabled" }
    );
    Ok(())
}
