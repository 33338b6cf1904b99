use crate::error::{AppError, Result};
use std::fmt;
use time::{Duration, OffsetDateTime, Time, UtcOffset};

/// A wall-clock time of day with minute resolution, as configured by an
/// administrator in `HH:MM` form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct WallTime {
    hour: u8,
    minute: u8,
}

impl WallTime {
    /// Parses a strict `HH:MM` 24-hour string.
    ///
    /// # Errors
    /// Returns `AppError::Validation` for anything that is not two digits,
    /// a colon, and two digits within range.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || AppError::Validation(format!("invalid time '{s}', expected HH:MM"));

        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        if h.len() != 2 || m.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok(Self { hour, minute })
    }

    #[must_use]
    pub const fn from_time(t: Time) -> Self {
        Self { hour: t.hour(), minute: t.minute() }
    }

    fn to_time(self) -> Time {
        // hour and minute are range-checked at construction
        Time::from_hms(self.hour, self.minute, 0).unwrap_or(Time::MIDNIGHT)
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// The organization's daily quiet-hours window. Both endpoints are
/// inclusive. `start > end` means the window spans local midnight, the
/// usual shape for nightly quiet hours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuietHours {
    pub start: WallTime,
    pub end: WallTime,
}

impl Default for QuietHours {
    fn default() -> Self {
        Self { start: WallTime { hour: 18, minute: 0 }, end: WallTime { hour: 7, minute: 0 } }
    }
}

impl QuietHours {
    /// Whether `t` falls inside the window, handling the overnight shape.
    #[must_use]
    pub fn contains(&self, t: WallTime) -> bool {
        if self.start <= self.end {
            self.start <= t && t <= self.end
        } else {
            t >= self.start || t <= self.end
        }
    }

    const fn spans_midnight(&self) -> bool {
        // Ord derive on WallTime is not const-usable
        self.start.hour > self.end.hour
            || (self.start.hour == self.end.hour && self.start.minute > self.end.minute)
    }
}

/// Outcome of the scheduling decision for one message submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeliveryPlan {
    pub deliver_at: OffsetDateTime,
    pub queued: bool,
}

/// Decides whether a message submitted at `now` is delivered immediately or
/// held until the quiet-hours window ends.
///
/// The time of day is taken from `now` resolved into the organization's
/// configured UTC offset, so the decision tracks the org's wall clock rather
/// than the process's. The computation is pure; callers fetch `window` fresh
/// from settings beforehand so an admin change applies to the next send only.
#[must_use]
pub fn plan_delivery(now: OffsetDateTime, org_offset: UtcOffset, window: QuietHours) -> DeliveryPlan {
    let local = now.to_offset(org_offset);
    let current = WallTime::from_time(local.time());

    if !window.contains(current) {
        return DeliveryPlan { deliver_at: now, queued: false };
    }

    let mut release = local.replace_time(window.end.to_time());

    // In the evening portion of an overnight window the end lands tomorrow
    // morning. In the early-morning portion, and for same-day windows, the
    // end falls later today.
    if window.spans_midnight() && current >= window.start {
        release += Duration::days(1);
    }

    // The inclusive end boundary truncates seconds; a send at exactly `end`
    // would otherwise compute a release a few seconds in the past.
    let deliver_at = release.max(local);

    DeliveryPlan { deliver_at, queued: true }
}
