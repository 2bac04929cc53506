// ============================================================================
// Rate Limiter
// ============================================================================
//
// Fixed-window request counter keyed by caller IP. One counter per IP,
// reset when its window elapses. Advisory capacity protection only: no
// weighted queues, no cross-IP coordination.
//
// The same budget applies to ALL routes (health endpoints and fallbacks
// included), one counter per IP across routes.
//
// ============================================================================

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

struct Window {
    started_at: Instant,
    count: u64,
}

struct LimiterState {
    windows: HashMap<String, Window>,
    last_sweep: Instant,
}

/// Per-IP fixed-window limiter.
///
/// The mutex is held only for the map update, never across awaits, which
/// keeps increments atomic per key. Stale entries are swept opportunistically
/// at most once per window.
pub struct RateLimiter {
    max_requests: u64,
    window: Duration,
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    pub fn new(max_requests: u64, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Mutex::new(LimiterState {
                windows: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// Records one request from `ip` and decides whether it fits the budget.
    pub fn check(&self, ip: &str) -> RateLimitDecision {
        self.check_at(ip, Instant::now())
    }

    /// Clock-explicit variant of [`check`](Self::check); unit tests drive it
    /// with synthetic instants.
    pub fn check_at(&self, ip: &str, now: Instant) -> RateLimitDecision {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if now.duration_since(state.last_sweep) >= self.window {
            let window = self.window;
            state.windows.retain(|_, w| now.duration_since(w.started_at) < window);
            state.last_sweep = now;
        }

        let entry = state
            .windows
            .entry(ip.to_string())
            .or_insert(Window { started_at: now, count: 0 });

        if now.duration_since(entry.started_at) >= self.window {
            entry.started_at = now;
            entry.count = 0;
        }

        entry.count += 1;
        if entry.count > self.max_requests {
            RateLimitDecision::Limited
        } else {
            RateLimitDecision::Allowed
        }
    }
}
