//! CLI command implementations
//!
//! Every command takes a device that has not been started yet and calls
//! `begin()` itself.

mod keys;
mod list;
mod settings;
mod watch;

pub use keys::{cmd_keys, cmd_touched};
pub use list::list_transports;
pub use settings::{cmd_sensitivity, cmd_wakeup};
pub use watch::cmd_watch;
