// libs/appointment-cell/src/models.rs
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use doctor_cell::models::{AppointmentType, DoctorError, TimeSlot};
use shared_utils::time::format_hhmm;

// ==============================================================================
// CORE BOOKING MODELS
// ==============================================================================

/// A persisted appointment. The appointment type is captured by value when
/// the booking is created, so later catalog edits never move its end time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub appointment_type: AppointmentType,
    pub created_at: NaiveDateTime,
}

impl Booking {
    pub fn from_accepted(candidate: &Candidate, accepted: Accepted, created_at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            doctor_id: candidate.doctor_id,
            patient_id: candidate.patient_id,
            date: candidate.date,
            start_time: accepted.slot.start,
            appointment_type: accepted.appointment_type,
            created_at,
        }
    }

    pub fn end_time(&self) -> NaiveTime {
        // Admitted bookings end no later than the doctor's daily end, so this never wraps.
        self.start_time
            .overflowing_add_signed(self.appointment_type.duration())
            .0
    }

    pub fn slot(&self) -> TimeSlot {
        TimeSlot {
            start: self.start_time,
            end: self.end_time(),
        }
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }
}

/// A prospective booking under evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub appointment_type_id: Uuid,
}

/// Outcome of a successful evaluation, carrying what the caller needs to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub slot: TimeSlot,
    pub appointment_type: AppointmentType,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub appointment_type_id: Uuid,
}

impl From<&BookAppointmentRequest> for Candidate {
    fn from(request: &BookAppointmentRequest) -> Self {
        Self {
            doctor_id: request.doctor_id,
            patient_id: request.patient_id,
            date: request.date,
            start_time: request.start_time,
            appointment_type_id: request.appointment_type_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RescheduleAppointmentRequest {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
}

/// Wire form of a booking request; dates and times arrive as strings and are
/// parsed at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentPayload {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_type_id: Uuid,
    pub appointment_date: String,
    pub appointment_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReschedulePayload {
    pub appointment_date: String,
    pub appointment_time: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailableTimesQuery {
    pub appointment_date: Option<String>,
    pub appointment_type_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableTimesResponse {
    pub times: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AvailableTimesResponse {
    pub fn ok(times: &[NaiveTime]) -> Self {
        Self {
            times: times.iter().copied().map(format_hhmm).collect(),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            times: Vec::new(),
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingView {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub end_time: String,
    pub appointment_type: String,
    pub duration_minutes: u32,
}

impl From<&Booking> for BookingView {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id,
            doctor_id: booking.doctor_id,
            patient_id: booking.patient_id,
            appointment_date: booking.date,
            appointment_time: format_hhmm(booking.start_time),
            end_time: format_hhmm(booking.end_time()),
            appointment_type: booking.appointment_type.name.clone(),
            duration_minutes: booking.appointment_type.duration_minutes,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientAppointments {
    pub upcoming: Vec<Booking>,
    pub past: Vec<Booking>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientAppointmentsResponse {
    pub upcoming: Vec<BookingView>,
    pub past: Vec<BookingView>,
}

impl From<&PatientAppointments> for PatientAppointmentsResponse {
    fn from(appointments: &PatientAppointments) -> Self {
        Self {
            upcoming: appointments.upcoming.iter().map(BookingView::from).collect(),
            past: appointments.past.iter().map(BookingView::from).collect(),
        }
    }
}

// ==============================================================================
// REJECTIONS AND ERRORS
// ==============================================================================

/// Why a candidate was not admitted. Every variant is recoverable: the user
/// picks another time or type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum BookingRejection {
    #[error("{doctor_name} does not offer the selected appointment type.")]
    UnsupportedAppointmentType {
        doctor_name: String,
        appointment_type_id: Uuid,
    },

    #[error("The appointment date and time cannot be in the past.")]
    PastDateTime,

    #[error("The doctor is only available between {daily_start} and {daily_end}.")]
    OutsideWorkingHours {
        daily_start: String,
        daily_end: String,
    },

    #[error("The selected time overlaps an existing appointment from {start_time} to {end_time}.")]
    OverlapsExistingBooking {
        booking_id: Uuid,
        start_time: String,
        end_time: String,
    },
}

impl BookingRejection {
    pub fn code(&self) -> &'static str {
        match self {
            BookingRejection::UnsupportedAppointmentType { .. } => "unsupported_appointment_type",
            BookingRejection::PastDateTime => "past_date_time",
            BookingRejection::OutsideWorkingHours { .. } => "outside_working_hours",
            BookingRejection::OverlapsExistingBooking { .. } => "overlaps_existing_booking",
        }
    }

    pub fn overlapping(booking: &Booking) -> Self {
        BookingRejection::OverlapsExistingBooking {
            booking_id: booking.id,
            start_time: format_hhmm(booking.start_time),
            end_time: format_hhmm(booking.end_time()),
        }
    }
}

/// Conditions under which no slot list can be produced at all, as opposed to
/// an empty list for a fully booked day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SlotQueryError {
    #[error("Cannot book appointments for past dates.")]
    PastDate,

    #[error("This doctor does not offer the selected appointment type.")]
    UnsupportedAppointmentType,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppointmentError {
    #[error("{0}")]
    Rejected(#[from] BookingRejection),

    #[error("{0}")]
    SlotQuery(#[from] SlotQueryError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Appointment type not found")]
    AppointmentTypeNotFound,

    #[error("Appointment not found")]
    NotFound,

    #[error("Timed out waiting for the schedule of this doctor and day")]
    LockTimeout,

    #[error("Doctor directory error: {0}")]
    Directory(String),

    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<DoctorError> for AppointmentError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppointmentError::DoctorNotFound,
            DoctorError::AppointmentTypeNotFound => AppointmentError::AppointmentTypeNotFound,
            other => AppointmentError::Directory(other.to_string()),
        }
    }
}
