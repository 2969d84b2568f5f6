//! Birth profile of the person a chart is drawn for

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ziwei_core::CalculationRequest;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("gender must be \"male\" or \"female\", got {0:?}")]
    Gender(String),

    #[error("month {0} out of range")]
    Month(u32),

    #[error("day {day} out of range for month {month}")]
    Day { month: u32, day: u32 },

    #[error("time {hour:02}:{minute:02} out of range")]
    Time { hour: u32, minute: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthProfile {
    pub name: String,
    pub gender: String,
    pub birth_year: i32,
    pub birth_month: u32,
    pub birth_day: u32,
    pub birth_hour: u32,
    pub birth_minute: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_location: Option<String>,
    /// Birth date is given in the lunar calendar.
    #[serde(default)]
    pub is_lunar_date: bool,
}

impl BirthProfile {
    /// Check the fields the engine cannot cope with.
    ///
    /// Lunar months never have more than 30 days; solar dates are checked
    /// against the Gregorian calendar.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.gender != "male" && self.gender != "female" {
            return Err(ProfileError::Gender(self.gender.clone()));
        }
        if !(1..=12).contains(&self.birth_month) {
            return Err(ProfileError::Month(self.birth_month));
        }
        let day_exists = if self.is_lunar_date {
            (1..=30).contains(&self.birth_day)
        } else {
            NaiveDate::from_ymd_opt(self.birth_year, self.birth_month, self.birth_day).is_some()
        };
        if !day_exists {
            return Err(ProfileError::Day {
                month: self.birth_month,
                day: self.birth_day,
            });
        }
        if self.birth_hour > 23 || self.birth_minute > 59 {
            return Err(ProfileError::Time {
                hour: self.birth_hour,
                minute: self.birth_minute,
            });
        }
        Ok(())
    }

    pub fn to_request(&self) -> Result<CalculationRequest, ProfileError> {
        self.validate()?;
        Ok(CalculationRequest::new(
            self.birth_year,
            self.birth_month,
            self.birth_day,
            self.birth_hour,
            self.birth_minute,
            self.gender.as_str(),
            self.is_lunar_date,
        ))
    }

    /// Age in nominal (xu sui) years during `year`, as used for decadal lookups.
    pub fn nominal_age(&self, year: i32) -> u32 {
        u32::try_from(year - self.birth_year + 1).unwrap_or(0)
    }
}
