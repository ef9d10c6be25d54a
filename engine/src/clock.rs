//! Source of "now" for reference dates.

use std::fmt;

use chrono::{Local, NaiveDateTime, TimeDelta, Timelike};

pub trait Clock: fmt::Debug {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Round the minutes up to the next multiple of `resolution` and drop
/// seconds. Minutes already on a multiple stay.
#[must_use]
pub fn ceil_to_resolution(date: NaiveDateTime, resolution: u32) -> NaiveDateTime {
    let truncated = date
        .with_second(0)
        .and_then(|date| date.with_nanosecond(0))
        .unwrap_or(date);
    if resolution == 0 {
        return truncated;
    }
    match truncated.minute() % resolution {
        0 => truncated,
        rest => truncated
            .checked_add_signed(TimeDelta::minutes(i64::from(resolution - rest)))
            .unwrap_or(truncated),
    }
}
