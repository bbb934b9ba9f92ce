// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, NaiveTime};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_utils::time::{parse_hhmm, parse_query_date};
use shared_utils::Clock;

use crate::models::{
    AppointmentError, AvailableTimesQuery, AvailableTimesResponse, BookAppointmentPayload,
    BookAppointmentRequest, BookingRejection, BookingView, PatientAppointmentsResponse,
    RescheduleAppointmentRequest, ReschedulePayload,
};
use crate::services::booking::BookingService;

pub struct AppointmentState {
    pub booking_service: Arc<BookingService>,
    pub clock: Arc<dyn Clock>,
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::Rejected(rejection) => {
                let code = rejection.code();
                let message = rejection.to_string();
                match rejection {
                    BookingRejection::OverlapsExistingBooking { .. } => AppError::Conflict { code, message },
                    _ => AppError::Rejected { code, message },
                }
            }
            AppointmentError::SlotQuery(e) => AppError::BadRequest(e.to_string()),
            AppointmentError::InvalidInput(msg) => AppError::BadRequest(msg),
            AppointmentError::DoctorNotFound
            | AppointmentError::AppointmentTypeNotFound
            | AppointmentError::NotFound => AppError::NotFound(err.to_string()),
            AppointmentError::LockTimeout => AppError::Busy(err.to_string()),
            AppointmentError::Directory(_) | AppointmentError::Repository(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppointmentError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppointmentError::InvalidInput(format!("Invalid {} id", what)))
}

fn parse_date_time(date: &str, time: &str) -> Result<(NaiveDate, NaiveTime), AppointmentError> {
    let date = parse_query_date(date)
        .ok_or_else(|| AppointmentError::InvalidInput("Please enter a valid appointment date.".to_string()))?;
    let time = parse_hhmm(time)
        .ok_or_else(|| AppointmentError::InvalidInput("Please enter a valid appointment time.".to_string()))?;
    Ok((date, time))
}

// ==============================================================================
// SLOT QUERIES
// ==============================================================================

/// Free start times for the booking form. Always answers with a `times`
/// list; failures add an `error` message instead of changing the shape.
pub async fn get_available_times(
    State(state): State<Arc<AppointmentState>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<AvailableTimesQuery>,
) -> (StatusCode, Json<AvailableTimesResponse>) {
    let bad_request = |message: &str| (StatusCode::BAD_REQUEST, Json(AvailableTimesResponse::error(message)));

    let Some(raw_date) = query.appointment_date.filter(|d| !d.trim().is_empty()) else {
        return bad_request("Appointment date is required.");
    };
    let Some(raw_type) = query.appointment_type_id.filter(|t| !t.trim().is_empty()) else {
        return bad_request("Appointment type is required.");
    };

    let (Some(date), Ok(appointment_type_id)) = (parse_query_date(&raw_date), Uuid::parse_str(raw_type.trim())) else {
        return bad_request("Invalid date or appointment type.");
    };
    let Ok(doctor_id) = Uuid::parse_str(doctor_id.trim()) else {
        return bad_request("Invalid doctor id.");
    };

    let now = state.clock.now();
    match state
        .booking_service
        .available_times(doctor_id, date, appointment_type_id, now)
        .await
    {
        Ok(times) => (StatusCode::OK, Json(AvailableTimesResponse::ok(&times))),
        Err(AppointmentError::AppointmentTypeNotFound) => bad_request("Invalid date or appointment type."),
        Err(err) => {
            let status = AppError::from(err.clone()).status();
            (status, Json(AvailableTimesResponse::error(err.to_string())))
        }
    }
}

// ==============================================================================
// BOOKING LIFECYCLE
// ==============================================================================

pub async fn book_appointment(
    State(state): State<Arc<AppointmentState>>,
    Json(payload): Json<BookAppointmentPayload>,
) -> Result<(StatusCode, Json<BookingView>), AppError> {
    let (date, start_time) = parse_date_time(&payload.appointment_date, &payload.appointment_time)?;

    let request = BookAppointmentRequest {
        doctor_id: payload.doctor_id,
        patient_id: payload.patient_id,
        date,
        start_time,
        appointment_type_id: payload.appointment_type_id,
    };

    let booking = state.booking_service.book(request, state.clock.now()).await?;
    Ok((StatusCode::CREATED, Json(BookingView::from(&booking))))
}

pub async fn get_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<BookingView>, AppError> {
    let appointment_id = parse_id(&appointment_id, "appointment")?;
    let booking = state.booking_service.get_booking(appointment_id).await?;
    Ok(Json(BookingView::from(&booking)))
}

pub async fn reschedule_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<String>,
    Json(payload): Json<ReschedulePayload>,
) -> Result<Json<BookingView>, AppError> {
    let appointment_id = parse_id(&appointment_id, "appointment")?;
    let (date, start_time) = parse_date_time(&payload.appointment_date, &payload.appointment_time)?;

    let booking = state
        .booking_service
        .reschedule(
            appointment_id,
            RescheduleAppointmentRequest { date, start_time },
            state.clock.now(),
        )
        .await?;

    Ok(Json(BookingView::from(&booking)))
}

pub async fn cancel_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let appointment_id = parse_id(&appointment_id, "appointment")?;
    let booking = state.booking_service.cancel(appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "cancelled": BookingView::from(&booking),
    })))
}

pub async fn get_patient_appointments(
    State(state): State<Arc<AppointmentState>>,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientAppointmentsResponse>, AppError> {
    let patient_id = parse_id(&patient_id, "patient")?;
    let appointments = state
        .booking_service
        .patient_appointments(patient_id, state.clock.now())
        .await?;
    Ok(Json(PatientAppointmentsResponse::from(&appointments)))
}
