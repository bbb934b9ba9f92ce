use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use doctor_cell::models::{Doctor, TimeSlot};

use crate::models::{Accepted, Booking, BookingRejection, Candidate};

/// The single admission decision for a candidate booking. Pure: callers
/// persist an `Accepted` result themselves, under the per-doctor-day lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictEvaluator;

impl ConflictEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Runs the checks in a fixed order and stops at the first failure:
    /// type offered, not in the past, within working hours, no overlap.
    ///
    /// `existing` must already be restricted to the candidate's doctor and date.
    pub fn evaluate(
        &self,
        candidate: &Candidate,
        doctor: &Doctor,
        existing: &[Booking],
        now: NaiveDateTime,
    ) -> Result<Accepted, BookingRejection> {
        let appointment_type = doctor
            .offered_type(candidate.appointment_type_id)
            .cloned()
            .ok_or_else(|| BookingRejection::UnsupportedAppointmentType {
                doctor_name: doctor.full_name(),
                appointment_type_id: candidate.appointment_type_id,
            })?;

        self.check_not_past(candidate.date, candidate.start_time, now)?;

        let slot = self.check_working_hours(
            doctor,
            candidate.date,
            candidate.start_time,
            appointment_type.duration_minutes,
        )?;

        self.check_no_overlap(&slot, existing)?;

        debug!(
            "Candidate {} {}-{} admitted for doctor {}",
            candidate.date, slot.start, slot.end, doctor.id
        );

        Ok(Accepted { slot, appointment_type })
    }

    /// A start exactly at `now` is still bookable.
    pub fn check_not_past(
        &self,
        date: NaiveDate,
        start_time: NaiveTime,
        now: NaiveDateTime,
    ) -> Result<(), BookingRejection> {
        if date.and_time(start_time) < now {
            return Err(BookingRejection::PastDateTime);
        }
        Ok(())
    }

    /// Builds the candidate slot and checks it against the doctor's envelope.
    /// Non-working days and slots that would run past midnight fall outside it too.
    pub fn check_working_hours(
        &self,
        doctor: &Doctor,
        date: NaiveDate,
        start_time: NaiveTime,
        duration_minutes: u32,
    ) -> Result<TimeSlot, BookingRejection> {
        let window = &doctor.availability;
        let outside = || {
            let (daily_start, daily_end) = window.display_hours();
            BookingRejection::OutsideWorkingHours { daily_start, daily_end }
        };

        if !window.works_on(date) {
            return Err(outside());
        }

        let slot = TimeSlot::starting_at(start_time, duration_minutes).ok_or_else(outside)?;
        if !window.contains(&slot) {
            return Err(outside());
        }

        Ok(slot)
    }

    /// Reports the earliest-starting booking the slot overlaps.
    pub fn check_no_overlap(&self, slot: &TimeSlot, existing: &[Booking]) -> Result<(), BookingRejection> {
        match existing
            .iter()
            .filter(|b| slot.overlaps(&b.slot()))
            .min_by_key(|b| b.start_time)
        {
            Some(conflict) => Err(BookingRejection::overlapping(conflict)),
            None => Ok(()),
        }
    }
}
