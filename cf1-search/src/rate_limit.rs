//! Per-provider request admission.
//!
//! Each provider gets a resetting one-minute window plus a one-day window,
//! created lazily on its first call. Admission is local and advisory: it
//! keeps this process inside the provider's declared budget but knows
//! nothing about quota consumed elsewhere.
//!
//! The minute window is fixed, not sliding: it opens on the first admitted
//! call and resets whole once it elapses, so up to twice the per-minute
//! budget can pass in a short span straddling a reset.
//!
//! # State Machine
//!
//! ```text
//! ┌──────┐ first call ┌──────────┐ count == limit ┌───────────┐
//! │ Idle ├───────────►│ Counting ├───────────────►│ Exhausted │
//! └──────┘            └────▲─────┘                └─────┬─────┘
//!                          │        window reset        │
//!                          └────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::provider::{ProviderId, ProviderRegistry, RateLimit};

const MINUTE: Duration = Duration::from_secs(60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Counter state for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitWindow {
    /// Admitted requests since the minute window opened.
    pub requests_in_window: u32,
    /// When the minute window resets.
    pub window_reset_at: Instant,
    /// Admitted requests since the day window opened.
    pub requests_today: u32,
    /// When the day window resets.
    pub day_reset_at: Instant,
}

impl RateLimitWindow {
    fn fresh(now: Instant) -> Self {
        Self {
            requests_in_window: 1,
            window_reset_at: now + MINUTE,
            requests_today: 1,
            day_reset_at: now + DAY,
        }
    }
}

/// Admits or rejects provider calls against each provider's declared budget.
///
/// Admission checks for the same provider are serialised by a [`Mutex`], so
/// concurrent callers can never both observe "below limit" and overshoot.
#[derive(Debug)]
pub struct RateLimiter {
    limits: HashMap<ProviderId, RateLimit>,
    windows: Mutex<HashMap<ProviderId, RateLimitWindow>>,
}

impl RateLimiter {
    pub fn new(limits: impl IntoIterator<Item = (ProviderId, RateLimit)>) -> Self {
        Self {
            limits: limits.into_iter().collect(),
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_registry(registry: &ProviderRegistry) -> Self {
        Self::new(registry.iter().map(|d| (d.id, d.rate_limit)))
    }

    /// Ask whether `provider` may be called right now.
    ///
    /// Providers without a declared budget are always admitted.
    pub fn allow(&self, provider: ProviderId) -> bool {
        self.allow_at(provider, Instant::now())
    }

    /// [`allow`](Self::allow) evaluated at an explicit instant.
    pub fn allow_at(&self, provider: ProviderId, now: Instant) -> bool {
        let Some(limit) = self.limits.get(&provider) else {
            return true;
        };
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(window) = windows.get_mut(&provider) else {
            windows.insert(provider, RateLimitWindow::fresh(now));
            return true;
        };

        if now >= window.day_reset_at {
            window.requests_today = 0;
            window.day_reset_at = now + DAY;
        }
        if window.requests_today >= limit.requests_per_day {
            tracing::debug!(%provider, "daily budget exhausted");
            return false;
        }

        if now >= window.window_reset_at {
            window.requests_in_window = 1;
            window.window_reset_at = now + MINUTE;
            window.requests_today += 1;
            return true;
        }
        if window.requests_in_window < limit.requests_per_minute {
            window.requests_in_window += 1;
            window.requests_today += 1;
            return true;
        }

        tracing::debug!(%provider, "per-minute budget exhausted");
        false
    }

    /// Snapshot of a provider's window, if it has been called.
    pub fn window(&self, provider: ProviderId) -> Option<RateLimitWindow> {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&provider)
            .copied()
    }

    /// Requests left in the current minute window.
    pub fn remaining(&self, provider: ProviderId) -> Option<u32> {
        let limit = self.limits.get(&provider)?;
        let used = self
            .window(provider)
            .filter(|w| Instant::now() < w.window_reset_at)
            .map_or(0, |w| w.requests_in_window);
        Some(limit.requests_per_minute.saturating_sub(used))
    }
}
