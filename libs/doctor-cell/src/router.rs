use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::services::doctor::DoctorService;

pub fn doctor_routes(state: Arc<DoctorService>) -> Router {
    Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/{doctor_id}", get(handlers::get_doctor))
        .route("/by-type/{appointment_type_id}", get(handlers::get_doctors_for_appointment_type))
        .with_state(state)
}
