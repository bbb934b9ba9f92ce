use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use doctor_cell::services::DoctorDirectory;
use shared_config::SchedulingConfig;

use crate::models::{
    AppointmentError, BookAppointmentRequest, Booking, Candidate, PatientAppointments,
    RescheduleAppointmentRequest,
};
use crate::repository::BookingRepository;
use crate::services::conflict::ConflictEvaluator;
use crate::services::consistency::SchedulingLocks;
use crate::services::slots::SlotEnumerator;

/// Entry point for booking, rescheduling, cancelling and slot queries.
/// Writes to a doctor's day are serialised through `SchedulingLocks`;
/// slot queries read an unlocked snapshot.
pub struct BookingService {
    doctors: Arc<dyn DoctorDirectory>,
    bookings: Arc<dyn BookingRepository>,
    evaluator: ConflictEvaluator,
    enumerator: SlotEnumerator,
    locks: SchedulingLocks,
}

impl BookingService {
    pub fn new(
        config: &SchedulingConfig,
        doctors: Arc<dyn DoctorDirectory>,
        bookings: Arc<dyn BookingRepository>,
    ) -> Self {
        Self {
            doctors,
            bookings,
            evaluator: ConflictEvaluator::new(),
            enumerator: SlotEnumerator::new(config.slot_granularity()),
            locks: SchedulingLocks::new(config.lock_timeout()),
        }
    }

    pub fn locks(&self) -> &SchedulingLocks {
        &self.locks
    }

    /// Evaluates and persists a booking as one unit with respect to other
    /// writers on the same doctor and date.
    #[instrument(skip(self, request), fields(doctor_id = %request.doctor_id, date = %request.date))]
    pub async fn book(
        &self,
        request: BookAppointmentRequest,
        now: NaiveDateTime,
    ) -> Result<Booking, AppointmentError> {
        require_whole_minute(request.start_time)?;
        let doctor = self.doctors.find_doctor(request.doctor_id).await?;
        self.doctors.find_appointment_type(request.appointment_type_id).await?;

        let candidate = Candidate::from(&request);

        let _guard = self.locks.acquire((doctor.id, candidate.date)).await?;

        let existing = self.bookings.fetch_bookings(doctor.id, candidate.date).await?;
        let accepted = self
            .evaluator
            .evaluate(&candidate, &doctor, &existing, now)
            .inspect_err(|rejection| debug!("Booking rejected: {}", rejection.code()))?;

        let booking = Booking::from_accepted(&candidate, accepted, now);
        self.bookings.insert(booking.clone()).await?;

        info!(
            "Booked {} for patient {} with doctor {} on {} at {}",
            booking.id, booking.patient_id, booking.doctor_id, booking.date, booking.start_time
        );

        Ok(booking)
    }

    /// Delete-and-recreate: the new slot is evaluated against the target day
    /// with the original booking left out, and gets a fresh id.
    #[instrument(skip(self, request))]
    pub async fn reschedule(
        &self,
        booking_id: Uuid,
        request: RescheduleAppointmentRequest,
        now: NaiveDateTime,
    ) -> Result<Booking, AppointmentError> {
        require_whole_minute(request.start_time)?;
        let current = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;
        let doctor = self.doctors.find_doctor(current.doctor_id).await?;

        let _guards = self
            .locks
            .acquire_all([(doctor.id, current.date), (doctor.id, request.date)])
            .await?;

        // Re-read under the lock; a concurrent cancel may have won.
        let current = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        let existing: Vec<Booking> = self
            .bookings
            .fetch_bookings(doctor.id, request.date)
            .await?
            .into_iter()
            .filter(|b| b.id != current.id)
            .collect();

        let candidate = Candidate {
            doctor_id: doctor.id,
            patient_id: current.patient_id,
            date: request.date,
            start_time: request.start_time,
            appointment_type_id: current.appointment_type.id,
        };
        let accepted = self.evaluator.evaluate(&candidate, &doctor, &existing, now)?;

        // The replacement goes in before the original comes out.
        let replacement = Booking::from_accepted(&candidate, accepted, now);
        self.bookings.insert(replacement.clone()).await?;
        if let Err(e) = self.bookings.remove(current.id).await {
            warn!("Could not retire {} after rescheduling: {}", current.id, e);
            self.bookings.remove(replacement.id).await?;
            return Err(e);
        }

        info!(
            "Rescheduled {} to {} ({} at {})",
            current.id, replacement.id, replacement.date, replacement.start_time
        );

        Ok(replacement)
    }

    /// Removes the booking; later evaluations no longer see it.
    #[instrument(skip(self))]
    pub async fn cancel(&self, booking_id: Uuid) -> Result<Booking, AppointmentError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        let _guard = self.locks.acquire((booking.doctor_id, booking.date)).await?;

        let removed = self
            .bookings
            .remove(booking_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        info!("Cancelled booking {} on {}", removed.id, removed.date);
        Ok(removed)
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> Result<Booking, AppointmentError> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    /// Free start times for one doctor, day and appointment type. Reads a
    /// snapshot without locking; a later `book` re-checks everything.
    pub async fn available_times(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        appointment_type_id: Uuid,
        now: NaiveDateTime,
    ) -> Result<Vec<NaiveTime>, AppointmentError> {
        let doctor = self.doctors.find_doctor(doctor_id).await?;
        let appointment_type = self.doctors.find_appointment_type(appointment_type_id).await?;
        let existing = self.bookings.fetch_bookings(doctor_id, date).await?;

        self.enumerator
            .enumerate_free_slots(&doctor, date, &appointment_type, &existing, now)
            .map_err(|e| {
                warn!("Slot query for doctor {} on {} refused: {}", doctor_id, date, e);
                AppointmentError::from(e)
            })
    }

    /// A booking is past once its start is earlier than `now`.
    pub async fn patient_appointments(
        &self,
        patient_id: Uuid,
        now: NaiveDateTime,
    ) -> Result<PatientAppointments, AppointmentError> {
        let (past, upcoming) = self
            .bookings
            .fetch_for_patient(patient_id)
            .await?
            .into_iter()
            .partition(|b| b.starts_at() < now);

        Ok(PatientAppointments { upcoming, past })
    }
}

fn require_whole_minute(start_time: NaiveTime) -> Result<(), AppointmentError> {
    if start_time.second() != 0 || start_time.nanosecond() != 0 {
        return Err(AppointmentError::InvalidInput(
            "Appointment times are whole minutes.".to_string(),
        ));
    }
    Ok(())
}
