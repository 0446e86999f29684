//! Transaction time windows.
//!
//! NEM timestamps on the wire are whole seconds elapsed since the nemesis
//! block. [`to_native_epoch`] and [`from_native_epoch`] are the only places
//! that translate between that encoding and `DateTime<Utc>`; both round to
//! the nearest second so a round trip is stable.
//!
//! A [`TimeWindow`] pairs the creation instant of a transaction with its
//! deadline. The deadline must lie strictly after the creation instant and
//! strictly less than 24 hours after it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{NemgateError, Result};

/// Unix timestamp (seconds) of the nemesis block.
pub const NEMESIS_BLOCK_TIMESTAMP: i64 = 1_427_587_585;

/// Upper bound (exclusive) for a deadline, in hours.
pub const MAX_DEADLINE_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadlineUnit {
    Seconds,
    Minutes,
    Hours,
}

impl DeadlineUnit {
    fn duration(self, amount: i64) -> Option<Duration> {
        match self {
            DeadlineUnit::Seconds => Duration::try_seconds(amount),
            DeadlineUnit::Minutes => Duration::try_minutes(amount),
            DeadlineUnit::Hours => Duration::try_hours(amount),
        }
    }
}

impl std::str::FromStr for DeadlineUnit {
    type Err = NemgateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Ok(DeadlineUnit::Seconds),
            "m" | "min" | "mins" | "minute" | "minutes" => Ok(DeadlineUnit::Minutes),
            "h" | "hour" | "hours" => Ok(DeadlineUnit::Hours),
            other => Err(NemgateError::Config(format!("unknown deadline unit '{}'", other))),
        }
    }
}

/// Rounds `time` to the nearest whole second.
fn round_to_second(time: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let secs = (time.timestamp_millis() + 500).div_euclid(1000);
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| NemgateError::InvalidRequest(format!("time {} out of range", time)))
}

/// Seconds elapsed since the nemesis block, rounded to the nearest second.
pub fn to_native_epoch(time: DateTime<Utc>) -> i64 {
    (time.timestamp_millis() + 500).div_euclid(1000) - NEMESIS_BLOCK_TIMESTAMP
}

/// Inverse of [`to_native_epoch`].
///
/// # Errors
///
/// Returns [`NemgateError::InvalidRequest`] if the result is not a
/// representable date.
pub fn from_native_epoch(seconds: i64) -> Result<DateTime<Utc>> {
    seconds
        .checked_add(NEMESIS_BLOCK_TIMESTAMP)
        .and_then(|unix| DateTime::from_timestamp(unix, 0))
        .ok_or_else(|| {
            NemgateError::InvalidRequest(format!("native timestamp {} out of range", seconds))
        })
}

/// Converts a node-reported time (milliseconds since the nemesis block).
pub fn from_node_time_millis(millis: u64) -> Result<DateTime<Utc>> {
    let seconds = i64::try_from(millis.saturating_add(500) / 1000).map_err(|_| {
        NemgateError::InvalidRequest(format!("node time {}ms out of range", millis))
    })?;
    from_native_epoch(seconds)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Wire representation of a [`TimeWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindowDto {
    pub time_stamp: i64,
    pub deadline: i64,
}

impl TimeWindow {
    /// Window starting now on the local clock.
    pub fn create_with_deadline(amount: i64, unit: DeadlineUnit) -> Result<Self> {
        Self::with_deadline_from(Utc::now(), amount, unit)
    }

    /// Window of two hours starting now on the local clock.
    pub fn default_deadline() -> Result<Self> {
        Self::create_with_deadline(2, DeadlineUnit::Hours)
    }

    /// Window starting at the node's notion of now.
    ///
    /// `node_time_ms` is the node's network time in milliseconds since the
    /// nemesis block. Zero means "unknown" and falls back to the local clock.
    pub fn create_with_node_time_and_deadline(
        node_time_ms: u64,
        amount: i64,
        unit: DeadlineUnit,
    ) -> Result<Self> {
        let created_at = if node_time_ms != 0 {
            from_node_time_millis(node_time_ms)?
        } else {
            Utc::now()
        };
        Self::with_deadline_from(created_at, amount, unit)
    }

    /// Window starting at `created_at`, rounded to the nearest second.
    ///
    /// # Errors
    ///
    /// Returns [`NemgateError::InvalidDeadline`] if `amount <= 0` or the
    /// deadline is not strictly less than 24 hours away.
    pub fn with_deadline_from(
        created_at: DateTime<Utc>,
        amount: i64,
        unit: DeadlineUnit,
    ) -> Result<Self> {
        if amount <= 0 {
            return Err(NemgateError::InvalidDeadline(
                "deadline should be greater than 0".to_string(),
            ));
        }

        let created_at = round_to_second(created_at)?;
        let too_far = || {
            NemgateError::InvalidDeadline(format!(
                "deadline should be less than {} hours",
                MAX_DEADLINE_HOURS
            ))
        };
        let duration = unit.duration(amount).ok_or_else(too_far)?;
        if duration >= Duration::hours(MAX_DEADLINE_HOURS) {
            return Err(too_far());
        }
        let expires_at = created_at.checked_add_signed(duration).ok_or_else(too_far)?;

        Ok(Self {
            created_at,
            expires_at,
        })
    }

    /// Rebuilds a window from wire timestamps without validating it.
    pub fn from_dto(time_stamp: i64, deadline: i64) -> Result<Self> {
        Ok(Self {
            created_at: from_native_epoch(time_stamp)?,
            expires_at: from_native_epoch(deadline)?,
        })
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn duration(&self) -> Duration {
        self.expires_at - self.created_at
    }

    pub fn time_stamp_to_dto(&self) -> i64 {
        to_native_epoch(self.created_at)
    }

    pub fn deadline_to_dto(&self) -> i64 {
        to_native_epoch(self.expires_at)
    }

    pub fn to_dto(&self) -> TimeWindowDto {
        TimeWindowDto {
            time_stamp: self.time_stamp_to_dto(),
            deadline: self.deadline_to_dto(),
        }
    }
}
