//! Generate a new signing key.

use super::Session;
use crate::ui::progress::with_spinner;
use anyhow::{Context, Result};
use colored::Colorize;

pub async fn execute(session: &Session, size: Option<usize>) -> Result<()> {
    let size = size.unwrap_or(session.settings.keys.size);
    let id = with_spinner("Generating signing key", session.manager.generate_and_store_sized(size))
        .await
        .context("Failed to generate key")?;

    let names = session.manager.names();
    println!("{} Generated key {}", "✓".green().bold(), id.to_string().cyan());
    println!("  Key secret:      {}", names.key_secret(id.as_str()));
    println!("  Metadata secret: {}", names.metadata_secret(id.as_str()));

    Ok(())
}
