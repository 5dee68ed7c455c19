//! Progress indicators and spinners.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a spinner for a call to the secret store.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Run `fut` behind a spinner, clearing it once the future resolves.
pub async fn with_spinner<F, T>(message: &str, fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let pb = spinner(message);
    let result = fut.await;
    pb.finish_and_clear();
    result
}
