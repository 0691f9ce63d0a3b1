//! Rolling-window admission control for outbound API calls.
//!
//! Provider quotas are tiered: a burst cap per minute and an aggregate cap
//! per day, plus a minimum gap between consecutive calls. [`RateGovernor`]
//! enforces all three. `admit()` never fails — it only delays — and never
//! returns while any limit would be violated by the caller's next call.
//!
//! Admission is an explicit loop, not recursion: after any sleep the full
//! window state is re-evaluated from scratch, because other waiters may
//! have refilled and re-exhausted a window in the meantime. Admission order
//! across concurrent waiters is best-effort, not FIFO.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use mapt_settings::RateLimitSettings;

/// Trailing window for the per-minute cap.
const MINUTE_WINDOW: Duration = Duration::from_secs(60);
/// Trailing window for the per-day cap.
const DAY_WINDOW: Duration = Duration::from_secs(86_400);

/// Point-in-time snapshot of governor state, for observability only.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GovernorStatus {
    /// Admitted calls currently inside the trailing minute window.
    pub minute_used: usize,
    /// Admitted calls currently inside the trailing day window.
    pub day_used: usize,
    /// Configured per-minute ceiling.
    pub max_per_minute: usize,
    /// Configured per-day ceiling.
    pub max_per_day: usize,
    /// Seconds since the last admitted call, if any.
    pub secs_since_last: Option<f64>,
}

/// Call records in both rolling windows plus the last-call timestamp.
///
/// All fields mutate together inside one critical section per admission
/// decision; interleaved purge/append across waiters would undercount.
#[derive(Debug, Default)]
struct Windows {
    minute: VecDeque<Instant>,
    day: VecDeque<Instant>,
    last_call: Option<Instant>,
}

impl Windows {
    /// Drop records older than their window. Stale records must never count
    /// toward a limit.
    fn purge(&mut self, now: Instant) {
        while self
            .minute
            .front()
            .is_some_and(|&t| now.duration_since(t) >= MINUTE_WINDOW)
        {
            let _ = self.minute.pop_front();
        }
        while self
            .day
            .front()
            .is_some_and(|&t| now.duration_since(t) >= DAY_WINDOW)
        {
            let _ = self.day.pop_front();
        }
    }
}

/// Admission control shared by every caller of one provider quota.
pub struct RateGovernor {
    max_per_minute: usize,
    max_per_day: usize,
    min_spacing: Duration,
    windows: Mutex<Windows>,
}

impl RateGovernor {
    /// Build a governor from rate settings.
    pub fn new(settings: &RateLimitSettings) -> Self {
        Self {
            max_per_minute: settings.max_per_minute,
            max_per_day: settings.max_per_day,
            min_spacing: Duration::from_secs_f64(settings.min_spacing_secs.max(0.0)),
            windows: Mutex::new(Windows::default()),
        }
    }

    /// Block until a call may proceed, then record it.
    ///
    /// May wait up to a full window duration when a cap is exhausted. The
    /// lock is never held across a sleep; every wake re-evaluates all
    /// limits before recording.
    pub async fn admit(&self) {
        loop {
            let wait = {
                let mut windows = self.windows.lock().await;
                let now = Instant::now();
                windows.purge(now);

                if let Some(wait) = self.window_wait(&windows, now) {
                    wait
                } else if let Some(wait) = self.spacing_wait(&windows, now) {
                    wait
                } else {
                    windows.minute.push_back(now);
                    windows.day.push_back(now);
                    windows.last_call = Some(now);
                    debug!(
                        minute_used = windows.minute.len(),
                        day_used = windows.day.len(),
                        "api call admitted"
                    );
                    return;
                }
            };
            tokio::time::sleep(wait).await;
        }
    }

    /// Time until the oldest record ages out of a saturated window.
    fn window_wait(&self, windows: &Windows, now: Instant) -> Option<Duration> {
        if windows.minute.len() >= self.max_per_minute {
            let oldest = *windows.minute.front()?;
            let wait = MINUTE_WINDOW.saturating_sub(now.duration_since(oldest));
            warn!(wait_secs = wait.as_secs_f64(), "per-minute limit reached, waiting");
            return Some(wait);
        }
        if windows.day.len() >= self.max_per_day {
            let oldest = *windows.day.front()?;
            let wait = DAY_WINDOW.saturating_sub(now.duration_since(oldest));
            warn!(
                wait_hours = wait.as_secs_f64() / 3600.0,
                "daily limit reached, waiting"
            );
            return Some(wait);
        }
        None
    }

    /// Remaining spacing gap since the last admitted call.
    fn spacing_wait(&self, windows: &Windows, now: Instant) -> Option<Duration> {
        let last = windows.last_call?;
        let since = now.duration_since(last);
        if since < self.min_spacing {
            let wait = self.min_spacing - since;
            debug!(wait_secs = wait.as_secs_f64(), "spacing delay before next call");
            Some(wait)
        } else {
            None
        }
    }

    /// Current counts and ceilings, purged as of the query moment.
    pub async fn status(&self) -> GovernorStatus {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();
        windows.purge(now);
        GovernorStatus {
            minute_used: windows.minute.len(),
            day_used: windows.day.len(),
            max_per_minute: self.max_per_minute,
            max_per_day: self.max_per_day,
            secs_since_last: windows
                .last_call
                .map(|last| now.duration_since(last).as_secs_f64()),
        }
    }
}

impl std::fmt::Debug for RateGovernor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateGovernor")
            .field("max_per_minute", &self.max_per_minute)
            .field("max_per_day", &self.max_per_day)
            .field("min_spacing", &self.min_spacing)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
