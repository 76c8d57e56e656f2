//! List command - show registered checks

use crate::checker::global_registry;
use anyhow::Result;
use console::style;

pub fn run() -> Result<()> {
    let registry = global_registry();
    println!("{} registered check(s)\n", style(registry.len()).bold());
    for name in registry.names() {
        println!("  {} {}", style("•").dim(), style(name).cyan());
    }
    Ok(())
}
