//! Countdown to the next draw
//!
//! The remaining time is recomputed from the wall clock on every tick; no
//! running counter is stored, so a late or skipped tick never drifts.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Remaining time split for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownParts {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl CountdownParts {
    pub fn from_remaining(remaining: Duration) -> Self {
        let ms = remaining.num_milliseconds().max(0);
        Self {
            days: ms / MS_PER_DAY,
            hours: (ms % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (ms % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (ms % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }
}

impl fmt::Display for CountdownParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {}h {}m {}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Result of one countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    Running(CountdownParts),
    /// Deadline reached; emitted exactly once
    Expired,
}

/// Periodic countdown towards a fixed instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    end: DateTime<Utc>,
    finished: bool,
}

impl Countdown {
    /// Start a countdown, or `None` if `end` is not in the future
    pub fn start(end: DateTime<Utc>, now: DateTime<Utc>) -> Option<Self> {
        (end > now).then_some(Self {
            end,
            finished: false,
        })
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.end - now
    }

    /// Recompute the display for `now`.
    ///
    /// Returns `None` once the countdown has expired.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<CountdownTick> {
        if self.finished {
            return None;
        }
        let remaining = self.remaining(now);
        if remaining <= Duration::zero() {
            self.finished = true;
            return Some(CountdownTick::Expired);
        }
        Some(CountdownTick::Running(CountdownParts::from_remaining(
            remaining,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parts_split() {
        let remaining = Duration::days(2)
            + Duration::hours(3)
            + Duration::minutes(4)
            + Duration::seconds(5)
            + Duration::milliseconds(900);
        let parts = CountdownParts::from_remaining(remaining);
        assert_eq!(
            parts,
            CountdownParts {
                days: 2,
                hours: 3,
                minutes: 4,
                seconds: 5
            }
        );
        assert_eq!(parts.to_string(), "2d 3h 4m 5s");
    }

    #[test]
    fn test_parts_negative_clamped() {
        let parts = CountdownParts::from_remaining(Duration::seconds(-3));
        assert_eq!(parts.to_string(), "0d 0h 0m 0s");
    }

    #[test]
    fn test_start_requires_future_deadline() {
        assert!(Countdown::start(t0(), t0()).is_none());
        assert!(Countdown::start(t0() - Duration::seconds(1), t0()).is_none());
        assert!(Countdown::start(t0() + Duration::seconds(1), t0()).is_some());
    }

    #[test]
    fn test_ten_second_countdown_expires_then_stops() {
        let start = t0();
        let mut countdown = Countdown::start(start + Duration::seconds(10), start).unwrap();

        for k in 1..10 {
            match countdown.tick(start + Duration::seconds(k)) {
                Some(CountdownTick::Running(parts)) => assert_eq!(parts.seconds, 10 - k),
                other => panic!("tick {} gave {:?}", k, other),
            }
        }
        assert_eq!(
            countdown.tick(start + Duration::seconds(10)),
            Some(CountdownTick::Expired)
        );
        assert!(countdown.is_finished());

        // No further ticks fire
        assert_eq!(countdown.tick(start + Duration::seconds(11)), None);
        assert_eq!(countdown.tick(start + Duration::seconds(12)), None);
    }

    #[test]
    fn test_tick_follows_wall_clock() {
        let start = t0();
        let mut countdown = Countdown::start(start + Duration::minutes(1), start).unwrap();

        // A tick that arrives late shows the true remaining time
        match countdown.tick(start + Duration::seconds(45)) {
            Some(CountdownTick::Running(parts)) => {
                assert_eq!(parts.minutes, 0);
                assert_eq!(parts.seconds, 15);
            }
            other => panic!("unexpected tick: {:?}", other),
        }
    }
}
