use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{AppointmentError, Booking};

/// Storage collaborator for bookings. The scheduling core reads through
/// `fetch_bookings` and never talks to a database directly.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Bookings for one doctor on one date, ordered by start time.
    async fn fetch_bookings(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<Booking>, AppointmentError>;

    async fn insert(&self, booking: Booking) -> Result<(), AppointmentError>;

    /// Removes and returns the booking, or `None` if it was already gone.
    async fn remove(&self, booking_id: Uuid) -> Result<Option<Booking>, AppointmentError>;

    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, AppointmentError>;

    async fn fetch_for_patient(&self, patient_id: Uuid) -> Result<Vec<Booking>, AppointmentError>;
}

#[derive(Debug, Default)]
pub struct InMemoryBookingRepository {
    bookings: RwLock<HashMap<Uuid, Booking>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.bookings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bookings.read().await.is_empty()
    }
}

fn chronological(mut bookings: Vec<Booking>) -> Vec<Booking> {
    bookings.sort_by_key(|b| (b.date, b.start_time));
    bookings
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn fetch_bookings(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<Booking>, AppointmentError> {
        let bookings = self.bookings.read().await;
        Ok(chronological(
            bookings
                .values()
                .filter(|b| b.doctor_id == doctor_id && b.date == date)
                .cloned()
                .collect(),
        ))
    }

    async fn insert(&self, booking: Booking) -> Result<(), AppointmentError> {
        let mut bookings = self.bookings.write().await;
        if bookings.contains_key(&booking.id) {
            return Err(AppointmentError::Repository(format!(
                "booking {} already exists",
                booking.id
            )));
        }
        bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn remove(&self, booking_id: Uuid) -> Result<Option<Booking>, AppointmentError> {
        Ok(self.bookings.write().await.remove(&booking_id))
    }

    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, AppointmentError> {
        Ok(self.bookings.read().await.get(&booking_id).cloned())
    }

    async fn fetch_for_patient(&self, patient_id: Uuid) -> Result<Vec<Booking>, AppointmentError> {
        let bookings = self.bookings.read().await;
        Ok(chronological(
            bookings
                .values()
                .filter(|b| b.patient_id == patient_id)
                .cloned()
                .collect(),
        ))
    }
}
