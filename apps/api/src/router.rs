use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::handlers::AppointmentState;
use appointment_cell::router::appointment_routes;
use appointment_cell::services::BookingService;
use doctor_cell::router::doctor_routes;
use doctor_cell::services::DoctorService;
use shared_utils::Clock;

pub fn create_router(
    doctors: Arc<DoctorService>,
    bookings: Arc<BookingService>,
    clock: Arc<dyn Clock>,
) -> Router {
    let appointment_state = Arc::new(AppointmentState {
        booking_service: bookings,
        clock,
    });

    Router::new()
        .route("/", get(|| async { "Clinic scheduler API is running!" }))
        .nest("/doctors", doctor_routes(doctors))
        .nest("/appointments", appointment_routes(appointment_state))
}
