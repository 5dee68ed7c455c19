//! List stored keys.

use super::Session;
use crate::ui::progress::with_spinner;
use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use edgeguard_core::time::fuzzy_time;
use edgeguard_keys::KeyStatus;
use edgeguard_types::KeyState;

pub async fn execute(session: &Session) -> Result<()> {
    let keys = with_spinner("Fetching keys", session.manager.list_keys())
        .await
        .context("Failed to list keys")?;

    if keys.is_empty() {
        println!("{}", "No keys found".yellow());
        return Ok(());
    }

    println!(
        "{} {} keys under {}",
        "Listing".green().bold(),
        keys.len(),
        session.manager.names().prefix().cyan()
    );

    for key in &keys {
        println!("{}", render(key));
    }

    Ok(())
}

/// One line per key: id, state, version, and age details.
fn render(key: &KeyStatus) -> String {
    let now = Utc::now();
    let state = match key.state() {
        KeyState::Active => key.state().to_string().green().bold(),
        other => other.to_string().yellow(),
    };

    let mut line = format!(
        "  {:<20} {:<8} v{:<3} created {}",
        key.id,
        state,
        key.version,
        fuzzy_time(key.created_time, now)
    );

    if let Some(rotated) = key.rotated_time {
        line.push_str(&format!(", rotated {}", fuzzy_time(rotated, now)));
    }
    if let Some(next) = &key.rotated_from_id {
        line.push_str(&format!(" -> {}", next));
    }
    if let Some(used) = key.last_used {
        line.push_str(&format!(", last used {}", fuzzy_time(used, now)));
    }
    if key.marked_for_deletion {
        line.push_str(&format!(" {}", "[marked for deletion]".red()));
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use edgeguard_services::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_after_generate() {
        let store = Arc::new(MemoryStore::new());
        let session = testing::session(store.clone());

        execute(&session).await.unwrap();
        session.manager.generate_and_store().await.unwrap();
        execute(&session).await.unwrap();
    }

    #[test]
    fn test_render_rotated() {
        colored::control::set_override(false);
        let key = KeyStatus::from_json(
            r#"{"id":"KEY_1","created_time":"2024-01-01T00:00:00Z","active":false,"version":1,
                "rotated_time":"2024-01-02T00:00:00Z","rotated_from_id":"KEY_2"}"#,
        )
        .unwrap();

        let line = render(&key);
        assert!(line.contains("KEY_1"));
        assert!(line.contains("INACTIVE"));
        assert!(line.contains("-> KEY_2"));
        assert!(!line.contains("last used"));
    }
}
