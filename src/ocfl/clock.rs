use chrono::{DateTime, Local, Utc};

/// Supplies the current time to components that need to stamp a version or a mutable-head
/// revision. Abstracted so tests can pin a timestamp instead of depending on the wall clock.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;

    /// Convenience for call sites that still work in local time, matching how versions are
    /// displayed elsewhere in this crate.
    fn now_local(&self) -> DateTime<Local> {
        self.now_utc().with_timezone(&Local)
    }
}

/// The default clock, backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that always returns the same instant. Used in tests that assert on exact
/// `created` timestamps.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn fixed_clock_always_returns_same_instant() {
        let now = Utc.ymd(2021, 1, 1).and_hms(0, 0, 0);
        let clock = FixedClock::new(now);
        assert_eq!(now, clock.now_utc());
        assert_eq!(now, clock.now_utc());
    }
}
