// libs/availability-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{NaiveDate, NaiveTime, Weekday};
use std::fmt;

// ==============================================================================
// WORKING SCHEDULE MODELS
// ==============================================================================

/// Weekday of a recurring working session. Sunday is 0, matching the stored
/// numeric encoding; rows may also carry a short ("mon") or full ("monday")
/// day name, so deserialization accepts all three.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub fn from_number(value: u64) -> Option<Self> {
        match value {
            0 => Some(DayOfWeek::Sunday),
            1 => Some(DayOfWeek::Monday),
            2 => Some(DayOfWeek::Tuesday),
            3 => Some(DayOfWeek::Wednesday),
            4 => Some(DayOfWeek::Thursday),
            5 => Some(DayOfWeek::Friday),
            6 => Some(DayOfWeek::Saturday),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sun" | "sunday" => Some(DayOfWeek::Sunday),
            "mon" | "monday" => Some(DayOfWeek::Monday),
            "tue" | "tuesday" => Some(DayOfWeek::Tuesday),
            "wed" | "wednesday" => Some(DayOfWeek::Wednesday),
            "thu" | "thursday" => Some(DayOfWeek::Thursday),
            "fri" | "friday" => Some(DayOfWeek::Friday),
            "sat" | "saturday" => Some(DayOfWeek::Saturday),
            _ => None,
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => DayOfWeek::Sunday,
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
        }
    }
}

impl<'de> Deserialize<'de> for DayOfWeek {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct DayOfWeekVisitor;

        impl<'de> serde::de::Visitor<'de> for DayOfWeekVisitor {
            type Value = DayOfWeek;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a weekday number (0 = Sunday) or a weekday name")
            }

            fn visit_u64<E>(self, value: u64) -> Result<DayOfWeek, E>
            where
                E: serde::de::Error,
            {
                DayOfWeek::from_number(value)
                    .ok_or_else(|| E::custom(format!("weekday number out of range: {}", value)))
            }

            fn visit_i64<E>(self, value: i64) -> Result<DayOfWeek, E>
            where
                E: serde::de::Error,
            {
                u64::try_from(value)
                    .ok()
                    .and_then(DayOfWeek::from_number)
                    .ok_or_else(|| E::custom(format!("weekday number out of range: {}", value)))
            }

            fn visit_str<E>(self, value: &str) -> Result<DayOfWeek, E>
            where
                E: serde::de::Error,
            {
                DayOfWeek::from_name(value)
                    .ok_or_else(|| E::custom(format!("unrecognized weekday: {}", value)))
            }
        }

        deserializer.deserialize_any(DayOfWeekVisitor)
    }
}

/// Stored weekly working session row. A row with `parent_session_id` set is
/// the second half of a split session and never generates slots on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingSession {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub doctor_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_granularity_minutes: i64,
    pub parent_session_id: Option<Uuid>,
}

/// Wall-clock range within one day, start inclusive, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, other: &TimeRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}

/// A working session resolved for one date. Slot generation runs over
/// `primary` only; `secondary` is the display range of a split session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBlock {
    pub id: Uuid,
    pub primary: TimeRange,
    pub secondary: Option<TimeRange>,
    pub granularity_minutes: i64,
}

// ==============================================================================
// BOOKING MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    /// Statuses that still hold their time against new bookings.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::CheckedIn
        )
    }
}

/// An appointment occupying time on a doctor's calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookedInterval {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub clinic_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: BookingStatus,
}

impl BookedInterval {
    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }
}

// ==============================================================================
// EXCEPTION / LEAVE MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionModule {
    Clinic,
    Doctor,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionStatus {
    Active,
    Inactive,
}

/// A closure period: clinic holidays or doctor leave. Bounds are inclusive
/// whole dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionPeriod {
    pub id: Uuid,
    pub module_type: ExceptionModule,
    pub module_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ExceptionStatus,
}

// ==============================================================================
// SERVICE DURATION MODELS
// ==============================================================================

/// How long one service takes for a given doctor at a given clinic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDurationMapping {
    pub service_id: Uuid,
    pub doctor_id: Uuid,
    pub clinic_id: Uuid,
    pub duration_minutes: i64,
}

// ==============================================================================
// SLOT OUTPUT MODELS
// ==============================================================================

/// One offerable appointment start. `available` is false for times already in
/// the past at computation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub available: bool,
}

/// Slots grouped under the working session that produced them, in session
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSlots {
    pub session_index: usize,
    pub session: SessionBlock,
    pub slots: Vec<Slot>,
}

/// Slot times are exchanged as "HH:mm"; seconds carry no meaning here.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&value, FORMAT).map_err(serde::de::Error::custom)
    }
}

// ==============================================================================
// QUERY AND ERROR MODELS
// ==============================================================================

/// Inputs for one slot computation. Missing date, doctor or clinic means
/// there is nothing to offer, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotQuery {
    pub date: Option<NaiveDate>,
    pub doctor_id: Option<Uuid>,
    pub clinic_id: Option<Uuid>,
    #[serde(default)]
    pub service_ids: Vec<Uuid>,
    pub exclude_appointment_id: Option<Uuid>,
    #[serde(default)]
    pub available_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AvailabilityError {
    #[error("Database error: {0}")]
    Database(String),
}
