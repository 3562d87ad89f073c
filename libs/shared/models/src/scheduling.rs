use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::{format_display, intervals_overlap, minutes, SLOT_MINUTES};

// ==============================================================================
// MODEL ERRORS
// ==============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Start time {start} must be before end time {end}")]
    InvalidInterval { start: NaiveTime, end: NaiveTime },

    #[error("Unknown day of week '{0}'")]
    UnknownDay(String),

    #[error("Invalid time of day '{0}'")]
    InvalidTime(String),
}

// ==============================================================================
// CALENDAR
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayOfWeek::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownDay(s.to_string()))
    }
}

// ==============================================================================
// PROVIDERS AND RULES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub specialty: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub office_location: Option<String>,
}

impl Provider {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProvider {
    pub first_name: String,
    pub last_name: String,
    pub specialty: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub office_location: Option<String>,
}

/// A recurring weekly open interval `[start_time, end_time)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityRule {
    id: i64,
    provider_id: i64,
    day_of_week: DayOfWeek,
    start_time: NaiveTime,
    end_time: NaiveTime,
    is_active: bool,
}

impl AvailabilityRule {
    pub fn new(
        id: i64,
        provider_id: i64,
        day_of_week: DayOfWeek,
        start_time: NaiveTime,
        end_time: NaiveTime,
        is_active: bool,
    ) -> Result<Self, ModelError> {
        if start_time >= end_time {
            return Err(ModelError::InvalidInterval {
                start: start_time,
                end: end_time,
            });
        }

        Ok(Self {
            id,
            provider_id,
            day_of_week,
            start_time,
            end_time,
            is_active,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn provider_id(&self) -> i64 {
        self.provider_id
    }

    pub fn day_of_week(&self) -> DayOfWeek {
        self.day_of_week
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// True when `time` lies in `[start_time, end_time)`.
    pub fn admits_start(&self, time: NaiveTime) -> bool {
        self.start_time <= time && time < self.end_time
    }

    /// The rule's interval materialised on a concrete date.
    pub fn window_on(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        (date.and_time(self.start_time), date.and_time(self.end_time))
    }
}

/// Rule definition before the store assigns an identifier.
#[derive(Debug, Clone)]
pub struct NewAvailabilityRule {
    pub provider_id: i64,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
}

impl NewAvailabilityRule {
    pub fn new(
        provider_id: i64,
        day_of_week: DayOfWeek,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<Self, ModelError> {
        if start_time >= end_time {
            return Err(ModelError::InvalidInterval {
                start: start_time,
                end: end_time,
            });
        }

        Ok(Self {
            provider_id,
            day_of_week,
            start_time,
            end_time,
            is_active: true,
        })
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn into_rule(self, id: i64) -> Result<AvailabilityRule, ModelError> {
        AvailabilityRule::new(
            id,
            self.provider_id,
            self.day_of_week,
            self.start_time,
            self.end_time,
            self.is_active,
        )
    }
}

// ==============================================================================
// PATIENTS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: String,
    pub insurance: Option<String>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: String,
    pub insurance: Option<String>,
}

// ==============================================================================
// BOOKINGS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Confirmed => write!(f, "Confirmed"),
            BookingStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub patient_id: i64,
    pub provider_id: i64,
    pub start: NaiveDateTime,
    pub duration_minutes: u32,
    pub status: BookingStatus,
    pub is_emergency: bool,
}

impl Booking {
    pub fn end(&self) -> NaiveDateTime {
        self.start + minutes(self.duration_minutes)
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }

    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        intervals_overlap(self.start, self.end(), start, end)
    }
}

/// A validated booking ready to be written. Always persisted as Confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub patient_id: i64,
    pub provider_id: i64,
    pub start: NaiveDateTime,
    pub duration_minutes: u32,
    pub is_emergency: bool,
}

impl NewBooking {
    pub fn end(&self) -> NaiveDateTime {
        self.start + minutes(self.duration_minutes)
    }

    pub fn into_booking(self, id: i64) -> Booking {
        Booking {
            id,
            patient_id: self.patient_id,
            provider_id: self.provider_id,
            start: self.start,
            duration_minutes: self.duration_minutes,
            status: BookingStatus::Confirmed,
            is_emergency: self.is_emergency,
        }
    }
}

// ==============================================================================
// SLOTS
// ==============================================================================

/// A derived 30-minute candidate interval `[start, end)`. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: i64,
}

impl Slot {
    pub fn starting_at(start: NaiveDateTime) -> Self {
        Self {
            start,
            end: start + minutes(SLOT_MINUTES),
            duration_minutes: SLOT_MINUTES,
        }
    }

    pub fn display_start(&self) -> String {
        format_display(self.start)
    }
}
