use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_utils::time::{format_hhmm, parse_hhmm};

// ==============================================================================
// APPOINTMENT TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AppointmentTypeRecord")]
pub struct AppointmentType {
    pub id: Uuid,
    pub name: String,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct AppointmentTypeRecord {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    name: String,
    duration_minutes: u32,
}

impl TryFrom<AppointmentTypeRecord> for AppointmentType {
    type Error = DoctorError;

    fn try_from(record: AppointmentTypeRecord) -> Result<Self, Self::Error> {
        Self::with_id(record.id, record.name, record.duration_minutes)
    }
}

impl AppointmentType {
    pub fn new(name: impl Into<String>, duration_minutes: u32) -> Result<Self, DoctorError> {
        Self::with_id(Uuid::new_v4(), name, duration_minutes)
    }

    pub fn with_id(
        id: Uuid,
        name: impl Into<String>,
        duration_minutes: u32,
    ) -> Result<Self, DoctorError> {
        let name = name.into();
        if duration_minutes == 0 {
            return Err(DoctorError::InvalidDuration(name));
        }
        Ok(Self { id, name, duration_minutes })
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }
}

impl std::fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} min)", self.name, self.duration_minutes)
    }
}

// ==============================================================================
// TIME SLOTS
// ==============================================================================

/// A same-day `[start, end)` interval at minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    /// Returns `None` when the slot would end at or past midnight. Slots never
    /// span two calendar days.
    pub fn starting_at(start: NaiveTime, duration_minutes: u32) -> Option<Self> {
        if duration_minutes == 0 {
            return None;
        }
        let (end, wrapped_secs) =
            start.overflowing_add_signed(Duration::minutes(i64::from(duration_minutes)));
        if wrapped_secs != 0 {
            return None;
        }
        Some(Self { start, end })
    }

    /// Half-open overlap: touching slots do not overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && self.end > other.start
    }
}

// ==============================================================================
// AVAILABILITY WINDOW
// ==============================================================================

/// A doctor's single daily working envelope. `daily_start < daily_end` holds
/// for every constructed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AvailabilityWindowRecord", into = "AvailabilityWindowRecord")]
pub struct AvailabilityWindow {
    daily_start: NaiveTime,
    daily_end: NaiveTime,
    working_days: Vec<Weekday>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AvailabilityWindowRecord {
    daily_start: String,
    daily_end: String,
    #[serde(default)]
    working_days: Vec<Weekday>,
}

impl TryFrom<AvailabilityWindowRecord> for AvailabilityWindow {
    type Error = DoctorError;

    fn try_from(record: AvailabilityWindowRecord) -> Result<Self, Self::Error> {
        let start = parse_hhmm(&record.daily_start)
            .ok_or_else(|| DoctorError::InvalidTime(record.daily_start.clone()))?;
        let end = parse_hhmm(&record.daily_end)
            .ok_or_else(|| DoctorError::InvalidTime(record.daily_end.clone()))?;
        Ok(Self::new(start, end)?.on_days(record.working_days))
    }
}

impl From<AvailabilityWindow> for AvailabilityWindowRecord {
    fn from(window: AvailabilityWindow) -> Self {
        Self {
            daily_start: format_hhmm(window.daily_start),
            daily_end: format_hhmm(window.daily_end),
            working_days: window.working_days,
        }
    }
}

impl AvailabilityWindow {
    /// Fails when `daily_start >= daily_end`; such a record is corrupt
    /// configuration, not user input.
    pub fn new(daily_start: NaiveTime, daily_end: NaiveTime) -> Result<Self, DoctorError> {
        if daily_start >= daily_end {
            return Err(DoctorError::InvalidWorkingHours {
                daily_start: format_hhmm(daily_start),
                daily_end: format_hhmm(daily_end),
            });
        }
        Ok(Self {
            daily_start,
            daily_end,
            working_days: Vec::new(),
        })
    }

    /// Restricts the window to the given weekdays. An empty list means every day.
    pub fn on_days(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut days: Vec<Weekday> = days.into_iter().collect();
        days.sort_by_key(|d| d.num_days_from_monday());
        days.dedup();
        self.working_days = days;
        self
    }

    pub fn daily_start(&self) -> NaiveTime {
        self.daily_start
    }

    pub fn daily_end(&self) -> NaiveTime {
        self.daily_end
    }

    pub fn working_days(&self) -> &[Weekday] {
        &self.working_days
    }

    /// Inclusive at both boundaries.
    pub fn contains(&self, slot: &TimeSlot) -> bool {
        slot.start >= self.daily_start && slot.end <= self.daily_end
    }

    pub fn works_on(&self, date: NaiveDate) -> bool {
        self.working_days.is_empty() || self.working_days.contains(&date.weekday())
    }

    pub fn display_hours(&self) -> (String, String) {
        (format_hhmm(self.daily_start), format_hhmm(self.daily_end))
    }
}

// ==============================================================================
// DOCTORS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialty: String,
    pub availability: AvailabilityWindow,
    #[serde(default)]
    pub offered_types: Vec<AppointmentType>,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn offers(&self, appointment_type_id: Uuid) -> bool {
        self.offered_type(appointment_type_id).is_some()
    }

    pub fn offered_type(&self, appointment_type_id: Uuid) -> Option<&AppointmentType> {
        self.offered_types.iter().find(|t| t.id == appointment_type_id)
    }
}

// DTO for the "doctors offering this type" lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub id: Uuid,
    pub name: String,
}

impl From<&Doctor> for DoctorSummary {
    fn from(doctor: &Doctor) -> Self {
        Self {
            id: doctor.id,
            name: format!("{} - {}", doctor.full_name(), doctor.specialty),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorListResponse {
    pub doctors: Vec<DoctorSummary>,
}

/// On-disk layout of the clinic directory file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClinicDirectory {
    #[serde(default)]
    pub appointment_types: Vec<AppointmentType>,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Appointment type not found")]
    AppointmentTypeNotFound,

    #[error("Invalid working hours: daily start {daily_start} must be before daily end {daily_end}")]
    InvalidWorkingHours { daily_start: String, daily_end: String },

    #[error("Appointment type {0} must have a positive duration")]
    InvalidDuration(String),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Failed to load clinic directory: {0}")]
    DirectoryLoad(String),
}
