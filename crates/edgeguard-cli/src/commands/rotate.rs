//! Rotate a signing key.

use super::{parse_key_id, Session};
use crate::ui::progress::with_spinner;
use anyhow::{Context, Result};
use colored::Colorize;

pub async fn execute(session: &Session, key_id: &str) -> Result<()> {
    let old_id = parse_key_id(key_id)?;

    println!("{} key: {}", "Rotating".yellow().bold(), old_id.to_string().cyan());

    let new_id = with_spinner("Rotating key", session.manager.rotate_key(&old_id))
        .await
        .with_context(|| format!("Failed to rotate key {}", old_id))?;

    println!(
        "{} Rotated {} -> {}",
        "✓".green().bold(),
        old_id.to_string().cyan(),
        new_id.to_string().cyan()
    );
    println!("  {} stays in the store until cleanup", old_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use edgeguard_services::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_rotate_unknown_key() {
        let session = testing::session(Arc::new(MemoryStore::new()));

        let err = execute(&session, "KEY_1").await.unwrap_err();
        assert!(err.to_string().contains("Failed to rotate key KEY_1"));
        assert!(execute(&session, "not a key").await.is_err());
    }
}
