//! Duration units carried in key suffixes (`timeout-seconds = 30`).
use chrono::{NaiveTime, TimeDelta, Timelike};

use crate::error::BindError;
use crate::value::Value;

pub(crate) const MICROS_PER_SECOND: i64 = 1_000_000;
pub(crate) const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DurationUnit {
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
    Microseconds,
}

impl DurationUnit {
    pub const ALL: [DurationUnit; 7] = [
        DurationUnit::Weeks,
        DurationUnit::Days,
        DurationUnit::Hours,
        DurationUnit::Minutes,
        DurationUnit::Seconds,
        DurationUnit::Milliseconds,
        DurationUnit::Microseconds,
    ];

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|unit| unit.suffix() == suffix)
    }

    pub fn suffix(self) -> &'static str {
        match self {
            DurationUnit::Weeks => "weeks",
            DurationUnit::Days => "days",
            DurationUnit::Hours => "hours",
            DurationUnit::Minutes => "minutes",
            DurationUnit::Seconds => "seconds",
            DurationUnit::Milliseconds => "milliseconds",
            DurationUnit::Microseconds => "microseconds",
        }
    }

    pub fn micros(self) -> i64 {
        match self {
            DurationUnit::Weeks => 7 * MICROS_PER_DAY,
            DurationUnit::Days => MICROS_PER_DAY,
            DurationUnit::Hours => 3_600 * MICROS_PER_SECOND,
            DurationUnit::Minutes => 60 * MICROS_PER_SECOND,
            DurationUnit::Seconds => MICROS_PER_SECOND,
            DurationUnit::Milliseconds => 1_000,
            DurationUnit::Microseconds => 1,
        }
    }

    /// Scale a suffixed number into a duration, rounding to whole microseconds.
    pub fn apply(self, value: &Value, context: &str) -> Result<TimeDelta, BindError> {
        let out_of_range = || BindError::Duration { context: context.to_owned() };
        let micros = match value {
            Value::Integer(amount) => amount.checked_mul(self.micros()).ok_or_else(out_of_range)?,
            Value::Float(amount) => {
                let scaled = (amount * self.micros() as f64).round();
                if !scaled.is_finite() || scaled.abs() >= i64::MAX as f64 {
                    return Err(out_of_range());
                }
                scaled as i64
            }
            other => {
                return Err(BindError::SuffixedValue {
                    context: context.to_owned(),
                    suffix: self.suffix().to_owned(),
                    found: other.kind().to_owned(),
                });
            }
        };
        Ok(TimeDelta::microseconds(micros))
    }
}

/// Elapsed time since midnight, truncated to microseconds.
pub fn from_time_of_day(time: NaiveTime) -> TimeDelta {
    let micros = i64::from(time.num_seconds_from_midnight()) * MICROS_PER_SECOND
        + i64::from(time.nanosecond() / 1_000);
    TimeDelta::microseconds(micros)
}
