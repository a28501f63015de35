//! bs81x - Command line tool for BS81x capacitive touch-key chips
//!
//! Reads key states and configures the chip over any of its three wirings.
//!
//! # Architecture
//!
//! Every transport string resolves to a `TouchDevice` over a boxed
//! `KeyTransport` (see `transports`), so the commands are written once and
//! work regardless of how the chip is wired:
//! - **Bus** (Linux i2c-dev) - register access, all commands available
//! - **Serial** (bit-banged on Linux GPIO) - key states only
//! - **Parallel** (one Linux GPIO line per key) - per-key reads
//! - **Dummy** - in-memory emulator of any of the above

mod cli;
mod commands;
mod transports;

use clap::Parser;
use cli::{Cli, Commands};
use transports::open_transport;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match cli.command {
        Commands::Keys { transport } => {
            let mut opened = open_transport(&transport)?;
            commands::cmd_keys(&mut opened.device)
        }
        Commands::Touched { transport, key } => {
            let mut opened = open_transport(&transport)?;
            commands::cmd_touched(&mut opened.device, key)
        }
        Commands::Sensitivity {
            transport,
            key,
            value,
        } => {
            let mut opened = open_transport(&transport)?;
            commands::cmd_sensitivity(&mut opened.device, key, value)
        }
        Commands::Wakeup {
            transport,
            enable,
            disable: _,
        } => {
            let mut opened = open_transport(&transport)?;
            commands::cmd_wakeup(&mut opened.device, enable)
        }
        Commands::Watch {
            transport,
            interval_ms,
            count,
        } => {
            let mut opened = open_transport(&transport)?;
            commands::cmd_watch(
                &mut opened.device,
                opened.interrupts.as_deref_mut(),
                interval_ms,
                count,
            )
        }
        Commands::ListTransports => {
            commands::list_transports();
            Ok(())
        }
    }
}
