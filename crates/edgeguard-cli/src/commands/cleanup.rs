//! Delete expired keys.

use super::Session;
use crate::ui::progress::with_spinner;
use anyhow::{anyhow, Result};
use colored::Colorize;
use dialoguer::Confirm;
use edgeguard_core::time::{parse_duration, pretty_duration};
use edgeguard_types::{CleanupReport, KeygenError};

pub async fn execute(session: &Session, max_age: Option<&str>, dry_run: bool, yes: bool) -> Result<()> {
    let raw = max_age.unwrap_or(&session.settings.keys.max_age);
    let max_age = parse_duration(raw)
        .filter(|age| *age > chrono::Duration::zero())
        .ok_or_else(|| anyhow!("Invalid max age '{}': expected a positive duration such as 2160h or 90d", raw))?;

    println!(
        "{} inactive keys older than {}{}",
        "Cleaning up".red().bold(),
        pretty_duration(max_age).cyan(),
        if dry_run { " (dry run)" } else { "" }
    );

    if !dry_run && !yes {
        let confirmed = Confirm::new()
            .with_prompt("Permanently delete expired keys from Doppler?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".yellow());
            return Ok(());
        }
    }

    let outcome = with_spinner("Cleaning up keys", session.manager.cleanup_old_keys(max_age, dry_run)).await;

    match outcome {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(KeygenError::PartialCleanup { report, source }) => {
            print_report(&report);
            for id in report.remaining() {
                println!("  {} {}", "not deleted:".red(), id);
            }
            Err(anyhow!(
                "Cleanup stopped after deleting {} of {} keys: {}",
                report.deleted.len(),
                report.eligible.len(),
                source
            ))
        }
        Err(e) => Err(anyhow!(e).context("Failed to clean up keys")),
    }
}

fn print_report(report: &CleanupReport) {
    if report.is_empty() {
        println!("{} No keys eligible for cleanup", "✓".green().bold());
        return;
    }

    if report.dry_run {
        println!("Would delete {} keys:", report.eligible.len());
        for id in &report.eligible {
            println!("  {}", id.cyan());
        }
        println!("Re-run with {} to delete them.", "--dry-run=false".bold());
        return;
    }

    for id in &report.deleted {
        println!("  {} {}", "deleted".green(), id);
    }
    println!("{} Deleted {} keys", "✓".green().bold(), report.deleted.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use edgeguard_core::ManualClock;
    use edgeguard_keys::{KeyManager, SecretNames};
    use edgeguard_services::{MemoryStore, StoreOp};
    use std::sync::Arc;

    /// Store holding one key rotated long ago plus its active successor.
    async fn rotated_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::at_unix(1_000_000_000));
        let manager = KeyManager::new(store.clone(), SecretNames::default()).with_clock(clock.clone());

        let id = manager.generate_and_store().await.unwrap();
        clock.advance(chrono::Duration::seconds(1));
        manager.rotate_key(&id).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_dry_run_keeps_keys() {
        let store = rotated_store().await;
        let session = testing::session(store.clone());
        let before = store.snapshot();

        execute(&session, None, true, false).await.unwrap();
        assert_eq!(store.snapshot(), before);
        assert!(store.deletes().is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_deletes_expired() {
        let store = rotated_store().await;
        let session = testing::session(store.clone());

        execute(&session, Some("720h"), false, true).await.unwrap();
        assert_eq!(store.snapshot().len(), 2);
        assert_eq!(session.manager.list_keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_surfaces() {
        let store = rotated_store().await;
        store.fail_on(StoreOp::Delete, "JWT_SIGNING_KEY_KEY_1000000000");
        let session = testing::session(store.clone());

        let err = execute(&session, None, false, true).await.unwrap_err();
        assert!(err.to_string().contains("after deleting 0 of 1 keys"));
    }

    #[tokio::test]
    async fn test_rejects_bad_max_age() {
        let session = testing::session(Arc::new(MemoryStore::new()));
        assert!(execute(&session, Some("soon"), true, false).await.is_err());
        assert!(execute(&session, Some("0h"), true, false).await.is_err());
    }
}
