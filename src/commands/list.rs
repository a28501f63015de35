//! List commands implementation

use crate::transports;

/// List all transports compiled into this binary
pub fn list_transports() {
    let available = transports::available_transports();
    if available.is_empty() {
        println!("No transports available (recompile with transport features enabled)");
        return;
    }

    println!("Supported transports:");
    println!();
    for t in &available {
        println!("  {:14} - {}", t.name, t.description);
        if !t.aliases.is_empty() {
            println!("  {:14}   aliases: {}", "", t.aliases.join(", "));
        }
    }
}
