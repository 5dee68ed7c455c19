//! Verify that a key is in place.

use super::{parse_key_id, Session};
use crate::ui::progress::with_spinner;
use anyhow::{Context, Result};
use colored::Colorize;

pub async fn execute(session: &Session, key_id: &str) -> Result<()> {
    let id = parse_key_id(key_id)?;

    let size = with_spinner("Checking key", session.manager.verify_key(&id))
        .await
        .with_context(|| format!("Key {} could not be verified", id))?;

    println!(
        "{} Key {} present ({} bytes) as {}",
        "✓".green().bold(),
        id.to_string().cyan(),
        size,
        session.manager.names().key_secret(id.as_str())
    );

    Ok(())
}
