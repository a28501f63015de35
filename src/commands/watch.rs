//! Key-state monitoring

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use bs81x_core::{InterruptSource, KeyStates, KeyTransport, TouchDevice};

use super::keys::read_states;

/// Set from the interrupt handler, cleared by the watch loop
static EDGE_SEEN: AtomicBool = AtomicBool::new(false);

fn on_edge() {
    EDGE_SEEN.store(true, Ordering::Release);
}

/// Print key-state changes
///
/// With an interrupt source the chip is only read after a falling edge;
/// without one it is read every `interval_ms`. Stops after `count` changes
/// when given.
pub fn cmd_watch<T: KeyTransport, I: InterruptSource + ?Sized>(
    device: &mut TouchDevice<T>,
    interrupts: Option<&mut I>,
    interval_ms: u64,
    count: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    device.begin()?;

    let interrupt_driven = match (interrupts, device.interrupt_pin()) {
        (Some(source), Some(pin)) => {
            device.attach_interrupt_handler(source, on_edge)?;
            log::info!("Waiting for falling edges on {}", pin);
            true
        }
        _ => {
            log::info!("No interrupt line, polling every {} ms", interval_ms);
            false
        }
    };

    let interval = Duration::from_millis(interval_ms);
    let mut last = read_states(device)?;
    print_states(last);

    let mut changes = 0u32;
    while count.map_or(true, |limit| changes < limit) {
        thread::sleep(interval);
        if interrupt_driven && !EDGE_SEEN.swap(false, Ordering::AcqRel) {
            continue;
        }

        let states = read_states(device)?;
        if states != last {
            log::debug!("Key states {:#06x} -> {:#06x}", last.bits(), states.bits());
            print_states(states);
            last = states;
            changes += 1;
        }
    }
    Ok(())
}

fn print_states(states: KeyStates) {
    println!("{:#06x}  {}", states.bits(), states);
}
