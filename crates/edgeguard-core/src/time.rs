//! Time and duration utilities.

use chrono::{DateTime, Duration, TimeZone, Utc};
use edgeguard_types::Clock;
use parking_lot::Mutex;

/// Wall clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for simulations and tests.
///
/// ```
/// use chrono::Duration;
/// use edgeguard_core::ManualClock;
/// use edgeguard_types::Clock;
///
/// let clock = ManualClock::at_unix(1_700_000_000);
/// clock.advance(Duration::hours(1));
/// assert_eq!(clock.now().timestamp(), 1_700_003_600);
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start) }
    }

    /// Create a clock frozen at the given unix second.
    pub fn at_unix(secs: i64) -> Self {
        let start = Utc
            .timestamp_opt(secs, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self::new(start)
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Jump the clock to an absolute instant.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Format a duration in human-readable form.
pub fn pretty_duration(duration: Duration) -> String {
    let secs = duration.num_seconds();

    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86_400 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}h {}m", hours, mins)
    } else {
        let days = secs / 86_400;
        let hours = (secs % 86_400) / 3600;
        format!("{}d {}h", days, hours)
    }
}

/// Format timestamp in fuzzy relative time, as seen from `now`.
pub fn fuzzy_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(timestamp);

    if diff.num_seconds() < 60 {
        "just now".to_string()
    } else if diff.num_minutes() < 60 {
        format!("{} minutes ago", diff.num_minutes())
    } else if diff.num_hours() < 24 {
        format!("{} hours ago", diff.num_hours())
    } else {
        format!("{} days ago", diff.num_days())
    }
}

/// Parse duration from string (e.g., "2160h", "1h30m", "90s", "90d").
///
/// A bare number is read as seconds. Units: `s`, `m`, `h`, `d`, `w`.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(secs) = s.parse::<i64>() {
        return Duration::try_seconds(secs);
    }

    let mut total = Duration::zero();
    let mut digits = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let value: i64 = digits.parse().ok()?;
        digits.clear();

        let part = match c {
            's' => Duration::try_seconds(value)?,
            'm' => Duration::try_minutes(value)?,
            'h' => Duration::try_hours(value)?,
            'd' => Duration::try_days(value)?,
            'w' => Duration::try_weeks(value)?,
            _ => return None,
        };
        total = total.checked_add(&part)?;
    }

    // Trailing digits without a unit are ambiguous in a compound value
    if !digits.is_empty() {
        return None;
    }

    Some(total)
}
