//! Report key material left without metadata.

use super::Session;
use crate::ui::progress::with_spinner;
use anyhow::{Context, Result};
use colored::Colorize;

pub async fn execute(session: &Session) -> Result<()> {
    let orphans = with_spinner("Scanning for orphaned keys", session.manager.find_orphans())
        .await
        .context("Failed to scan for orphaned keys")?;

    if orphans.is_empty() {
        println!("{} No orphaned keys", "✓".green().bold());
        return Ok(());
    }

    println!(
        "{} {} key secrets have no metadata:",
        "Warning:".yellow().bold(),
        orphans.len()
    );
    for id in &orphans {
        println!("  {}", session.manager.names().key_secret(id));
    }
    println!("They are invisible to list and cleanup and must be removed by hand.");

    Ok(())
}
