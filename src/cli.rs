//! CLI argument parsing

use clap::{Parser, Subcommand};

/// Parse a string as a hex (0x-prefixed) or decimal u8
fn parse_u8(s: &str) -> Result<u8, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u8>().map_err(|e| format!("Invalid number: {}", e))
    }
}

const TRANSPORT_HELP: &str = "Transport to use, e.g. i2c:bus=1 or \
    gpio-serial:gpiochip=0,data=17,clock=27 (see list-transports)";

#[derive(Parser)]
#[command(name = "bs81x")]
#[command(author, version, about = "BS81x capacitive touch-key tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read all key states once
    Keys {
        /// Transport to use
        #[arg(short, long, help = TRANSPORT_HELP)]
        transport: String,
    },

    /// Check whether a single key is touched
    Touched {
        /// Transport to use
        #[arg(short, long, help = TRANSPORT_HELP)]
        transport: String,

        /// Key index
        #[arg(short, long)]
        key: u8,
    },

    /// Set the sensitivity of one key (bus transport only)
    Sensitivity {
        /// Transport to use
        #[arg(short, long, help = TRANSPORT_HELP)]
        transport: String,

        /// Key index (0-15)
        #[arg(short, long)]
        key: u8,

        /// Sensitivity value (hex with 0x prefix, or decimal)
        #[arg(long, value_parser = parse_u8)]
        value: u8,
    },

    /// Enable or disable the wake-up function (bus transport only)
    Wakeup {
        /// Transport to use
        #[arg(short, long, help = TRANSPORT_HELP)]
        transport: String,

        /// Enable wake-up
        #[arg(long, conflicts_with = "disable", required_unless_present = "disable")]
        enable: bool,

        /// Disable wake-up
        #[arg(long)]
        disable: bool,
    },

    /// Print key-state changes until interrupted
    ///
    /// Waits for the interrupt line when the transport has one, polls
    /// otherwise.
    Watch {
        /// Transport to use
        #[arg(short, long, help = TRANSPORT_HELP)]
        transport: String,

        /// Polling interval in milliseconds
        #[arg(short, long, default_value = "50")]
        interval_ms: u64,

        /// Stop after this many changes
        #[arg(short, long)]
        count: Option<u32>,
    },

    /// List available transports
    ListTransports,
}
