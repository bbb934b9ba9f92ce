use std::num::NonZeroU32;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use doctor_cell::models::{AppointmentType, Doctor, TimeSlot};

use crate::models::{Booking, SlotQueryError};
use crate::services::conflict::ConflictEvaluator;

/// Scans a doctor's day at a fixed step and keeps the starts the
/// `ConflictEvaluator` would admit. The result is advisory; nothing is reserved.
#[derive(Debug, Clone)]
pub struct SlotEnumerator {
    granularity: Duration,
    evaluator: ConflictEvaluator,
}

impl SlotEnumerator {
    pub fn new(granularity_minutes: NonZeroU32) -> Self {
        Self {
            granularity: Duration::minutes(i64::from(granularity_minutes.get())),
            evaluator: ConflictEvaluator::new(),
        }
    }

    pub fn granularity_minutes(&self) -> i64 {
        self.granularity.num_minutes()
    }

    /// Ascending start times at which `appointment_type` fits for `doctor` on
    /// `date`. `existing` must already be restricted to that doctor and date.
    pub fn enumerate_free_slots(
        &self,
        doctor: &Doctor,
        date: NaiveDate,
        appointment_type: &AppointmentType,
        existing: &[Booking],
        now: NaiveDateTime,
    ) -> Result<Vec<NaiveTime>, SlotQueryError> {
        // The doctor's own copy decides the duration, same as at booking time.
        let offered = doctor
            .offered_type(appointment_type.id)
            .ok_or(SlotQueryError::UnsupportedAppointmentType)?;

        if date < now.date() {
            return Err(SlotQueryError::PastDate);
        }

        let window = &doctor.availability;
        if !window.works_on(date) {
            debug!("Doctor {} does not work on {}", doctor.id, date);
            return Ok(Vec::new());
        }

        let mut free = Vec::new();
        let mut cursor = window.daily_start();

        while let Some(slot) = TimeSlot::starting_at(cursor, offered.duration_minutes) {
            if !window.contains(&slot) {
                break;
            }

            let admissible = self.evaluator.check_not_past(date, slot.start, now).is_ok()
                && self.evaluator.check_no_overlap(&slot, existing).is_ok();
            if admissible {
                free.push(slot.start);
            }

            let (next, wrapped_secs) = cursor.overflowing_add_signed(self.granularity);
            if wrapped_secs != 0 {
                break;
            }
            cursor = next;
        }

        debug!(
            "{} free {}-minute slots for doctor {} on {}",
            free.len(),
            offered.duration_minutes,
            doctor.id,
            date
        );

        Ok(free)
    }
}

impl Default for SlotEnumerator {
    fn default() -> Self {
        Self::new(shared_config::SchedulingConfig::default().slot_granularity())
    }
}
