//! One-shot key reads

use bs81x_core::{Error, KeyStates, KeyTransport, TouchDevice, TransportKind};

/// Read every key
///
/// Parallel wiring has no bulk read, so its keys are polled one by one
/// until the wired key count is exhausted.
pub(crate) fn read_states<T: KeyTransport>(
    device: &mut TouchDevice<T>,
) -> Result<KeyStates, Error> {
    if device.transport_kind() != TransportKind::Parallel {
        return device.key_states();
    }

    let mut bits = 0u16;
    for key in 0..16u8 {
        match device.is_touched(key) {
            Ok(true) => bits |= 1 << key,
            Ok(false) => {}
            Err(Error::InvalidIndex { .. }) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(KeyStates::from_bits(bits))
}

/// Print the key-state mask
pub fn cmd_keys<T: KeyTransport>(
    device: &mut TouchDevice<T>,
) -> Result<(), Box<dyn std::error::Error>> {
    device.begin()?;
    let states = read_states(device)?;
    println!("Key states: {:#06x} ({})", states.bits(), states);
    Ok(())
}

/// Print whether one key is touched
pub fn cmd_touched<T: KeyTransport>(
    device: &mut TouchDevice<T>,
    key: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    device.begin()?;
    let touched = device.is_touched(key)?;
    println!(
        "K{}: {}",
        key,
        if touched { "touched" } else { "released" }
    );
    Ok(())
}
