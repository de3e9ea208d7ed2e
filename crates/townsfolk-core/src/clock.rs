//! Tick clock: turns wall-clock drift into whole elapsed ticks.
//!
//! Every agent carries a `last_processed_at` timestamp. On each scheduler
//! pass the elapsed tick count is `floor((now - last_processed_at) /
//! interval)`; zero means the agent is skipped (timer jitter, or an agent
//! added mid-interval). When ticks elapse, the timestamp advances by exactly
//! `elapsed * interval`, so the fractional remainder carries into the next
//! pass instead of being lost.
//!
//! The global initiative pass uses the same arithmetic against its own
//! timestamp and owns the monotonic simulation tick counter.

use chrono::{DateTime, Duration, Utc};

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Invalid interval.
    #[error("invalid tick interval: {reason}")]
    InvalidInterval {
        /// Explanation of what is wrong with the interval.
        reason: String,
    },
}

/// Whole ticks between `last` and `now` at the given interval.
///
/// A clock that went backwards yields 0.
pub fn elapsed_ticks(last: DateTime<Utc>, now: DateTime<Utc>, interval: Duration) -> u64 {
    let Some(interval_ms) = interval.num_milliseconds().checked_abs().filter(|ms| *ms > 0) else {
        return 0;
    };
    let drift_ms = now.signed_duration_since(last).num_milliseconds();
    if drift_ms <= 0 {
        return 0;
    }
    drift_ms
        .checked_div(interval_ms)
        .and_then(|ticks| u64::try_from(ticks).ok())
        .unwrap_or(0)
}

/// `last` moved forward by `ticks` whole intervals.
pub fn advance(last: DateTime<Utc>, ticks: u64, interval: Duration) -> DateTime<Utc> {
    let steps = i32::try_from(ticks).unwrap_or(i32::MAX);
    interval
        .checked_mul(steps)
        .and_then(|span| last.checked_add_signed(span))
        .unwrap_or(last)
}

/// Simulation clock for the global pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldClock {
    /// Number of simulated ticks so far.
    tick: u64,
    /// Wall-clock length of one tick.
    interval: Duration,
    /// Instant up to which global ticks have been accounted for.
    last_global_at: DateTime<Utc>,
}

impl WorldClock {
    /// Create a clock at tick 0 anchored at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidInterval`] if `interval_ms` is 0 or does
    /// not fit a signed duration.
    pub fn new(interval_ms: u64, now: DateTime<Utc>) -> Result<Self, ClockError> {
        if interval_ms == 0 {
            return Err(ClockError::InvalidInterval {
                reason: "interval must be at least 1 ms".to_owned(),
            });
        }
        let ms = i64::try_from(interval_ms).map_err(|err| ClockError::InvalidInterval {
            reason: format!("{interval_ms} ms is out of range: {err}"),
        })?;
        Ok(Self {
            tick: 0,
            interval: Duration::milliseconds(ms),
            last_global_at: now,
        })
    }

    /// Current simulation tick.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Wall-clock length of one tick.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Instant the global pass last advanced to.
    pub const fn last_global_at(&self) -> DateTime<Utc> {
        self.last_global_at
    }

    /// Elapsed ticks for an agent last processed at `last`.
    pub fn elapsed_since(&self, last: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
        elapsed_ticks(last, now, self.interval)
    }

    /// Account for the global pass at `now`.
    ///
    /// Returns the number of elapsed ticks (0 means the pass should not
    /// run) and advances the tick counter by that amount.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the counter would overflow.
    pub fn advance_global(&mut self, now: DateTime<Utc>) -> Result<u64, ClockError> {
        let elapsed = elapsed_ticks(self.last_global_at, now, self.interval);
        if elapsed == 0 {
            return Ok(0);
        }
        self.tick = self
            .tick
            .checked_add(elapsed)
            .ok_or(ClockError::TickOverflow)?;
        self.last_global_at = advance(self.last_global_at, elapsed, self.interval);
        Ok(elapsed)
    }
}
