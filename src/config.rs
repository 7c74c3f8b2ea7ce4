//! Session configuration for box extraction
//!
//! The defaults describe the Nasdaq futures session as seen from Milan:
//! a 15:30-16:00 formation window in `Europe/Rome`, targets evaluated up to 23:00.
//!
//! # Example
//!
//! ```rust
//! use ivbox::config::SessionConfig;
//!
//! let config: SessionConfig = serde_json::from_str(
//!     r#"{ "timezone": "America/New_York", "box_start": "09:30:00", "box_end": "10:00:00" }"#,
//! ).unwrap();
//! assert!(config.validate().is_ok());
//! ```

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{ExtractError, Result};

// ============================================================
// SESSION DEFAULTS
// ============================================================

/// Provider-side limit on 5-minute history, in days
pub const MAX_HISTORY_DAYS: u32 = 59;

/// Candle interval the extraction is tuned for
pub const CANDLE_INTERVAL_MINUTES: u32 = 5;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Rome;

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

fn default_timezone() -> Tz {
    DEFAULT_TIMEZONE
}

fn default_box_start() -> NaiveTime {
    hm(15, 30)
}

fn default_box_end() -> NaiveTime {
    hm(16, 0)
}

fn default_cutoff() -> NaiveTime {
    hm(23, 0)
}

// ============================================================
// SESSION CONFIG
// ============================================================

/// Clock windows and zone used to cut a candle series into boxes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Local civil zone days and windows are expressed in
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    /// First local time of the formation window (inclusive)
    #[serde(default = "default_box_start")]
    pub box_start: NaiveTime,
    /// Last local time of the formation window (inclusive)
    #[serde(default = "default_box_end")]
    pub box_end: NaiveTime,
    /// Last local time a candle may have to count towards targets and inverse detection
    #[serde(default = "default_cutoff")]
    pub cutoff: NaiveTime,
    /// Dataset tag copied into every record (e.g. the data provider)
    #[serde(default)]
    pub dataset: Option<String>,
    /// Reject NaN / inconsistent / unordered candles before extracting
    #[serde(default)]
    pub validate_data: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            box_start: default_box_start(),
            box_end: default_box_end(),
            cutoff: default_cutoff(),
            dataset: None,
            validate_data: false,
        }
    }
}

impl SessionConfig {
    /// Check window ordering: `box_start <= box_end < cutoff`
    pub fn validate(&self) -> Result<()> {
        if self.box_start > self.box_end {
            return Err(ExtractError::InvalidConfig(format!(
                "box_start {} is after box_end {}",
                self.box_start, self.box_end
            )));
        }
        if self.box_end >= self.cutoff {
            return Err(ExtractError::InvalidConfig(format!(
                "cutoff {} must be after box_end {}",
                self.cutoff, self.box_end
            )));
        }
        Ok(())
    }

    /// True if the local time lies inside the closed formation window
    #[inline]
    pub fn in_formation_window(&self, time: NaiveTime) -> bool {
        (self.box_start..=self.box_end).contains(&time)
    }
}

// ============================================================
// HISTORY REQUEST
// ============================================================

/// Request handed to a [`CandleSource`](crate::CandleSource)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRequest {
    pub ticker: String,
    pub days_back: u32,
}

impl HistoryRequest {
    /// Create a request, rejecting windows the provider cannot serve
    pub fn new(ticker: impl Into<String>, days_back: u32) -> Result<Self> {
        if days_back == 0 {
            return Err(ExtractError::InvalidValue("days_back must be > 0"));
        }
        if days_back > MAX_HISTORY_DAYS {
            return Err(ExtractError::HistoryWindowTooLong {
                requested: days_back,
                limit: MAX_HISTORY_DAYS,
            });
        }
        Ok(Self {
            ticker: ticker.into(),
            days_back,
        })
    }
}

// ============================================================
// TESTS
// ============================================================
