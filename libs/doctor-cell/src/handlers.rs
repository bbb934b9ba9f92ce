use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{DoctorError, DoctorListResponse, DoctorSummary};
use crate::services::doctor::DoctorService;

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound | DoctorError::AppointmentTypeNotFound => {
                AppError::NotFound(err.to_string())
            }
            DoctorError::InvalidTime(_) => AppError::BadRequest(err.to_string()),
            DoctorError::InvalidWorkingHours { .. }
            | DoctorError::InvalidDuration(_)
            | DoctorError::DirectoryLoad(_) => AppError::Internal(err.to_string()),
        }
    }
}

fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {} id", what)))
}

pub async fn list_doctors(
    State(service): State<Arc<DoctorService>>,
) -> Result<Json<DoctorListResponse>, AppError> {
    let doctors = service.list_doctors().await?;
    Ok(Json(DoctorListResponse {
        doctors: doctors.iter().map(DoctorSummary::from).collect(),
    }))
}

pub async fn get_doctor(
    State(service): State<Arc<DoctorService>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = parse_id(&doctor_id, "doctor")?;
    let doctor = service.get_doctor(doctor_id).await?;
    Ok(Json(json!(doctor)))
}

pub async fn get_doctors_for_appointment_type(
    State(service): State<Arc<DoctorService>>,
    Path(appointment_type_id): Path<String>,
) -> Result<Json<DoctorListResponse>, AppError> {
    let appointment_type_id = parse_id(&appointment_type_id, "appointment type")?;
    let doctors = service.doctors_for_appointment_type(appointment_type_id).await?;
    Ok(Json(DoctorListResponse { doctors }))
}
