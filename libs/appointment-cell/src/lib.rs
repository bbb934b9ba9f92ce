pub mod handlers;
pub mod models;
pub mod repository;
pub mod router;
pub mod services;

pub use models::*;
pub use repository::{BookingRepository, InMemoryBookingRepository};
pub use services::*;
