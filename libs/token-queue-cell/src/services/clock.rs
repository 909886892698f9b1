use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use tracing::warn;

use shared_config::AppConfig;

/// Server-side source of the token date: the clinic's calendar day.
#[derive(Debug, Clone, Copy)]
pub struct TokenClock {
    offset: FixedOffset,
}

impl TokenClock {
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    pub fn with_offset_minutes(minutes: i32) -> Self {
        match FixedOffset::east_opt(minutes.saturating_mul(60)) {
            Some(offset) => Self { offset },
            None => {
                warn!("Clinic UTC offset of {} minutes is out of range, using UTC", minutes);
                Self::utc()
            }
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_offset_minutes(config.clinic_utc_offset_minutes)
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

impl Default for TokenClock {
    fn default() -> Self {
        Self::utc()
    }
}
