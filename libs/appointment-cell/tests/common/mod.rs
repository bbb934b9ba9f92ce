#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use uuid::Uuid;

use appointment_cell::models::{Booking, Candidate};
use appointment_cell::repository::InMemoryBookingRepository;
use appointment_cell::services::BookingService;
use doctor_cell::models::{AppointmentType, AvailabilityWindow, ClinicDirectory, Doctor};
use doctor_cell::services::InMemoryDoctorDirectory;
use shared_utils::test_utils::{date, instant, time, TestConfig};

pub struct Clinic {
    pub checkup: AppointmentType,
    pub consultation: AppointmentType,
    pub vaccination: AppointmentType,
    /// In the catalog but not offered by `house`.
    pub surgery: AppointmentType,
    pub house: Doctor,
}

pub fn clinic() -> Clinic {
    let checkup = AppointmentType::new("Checkup", 30).unwrap();
    let consultation = AppointmentType::new("Consultation", 60).unwrap();
    let vaccination = AppointmentType::new("Vaccination", 15).unwrap();
    let surgery = AppointmentType::new("Surgery consult", 90).unwrap();

    let house = doctor(
        "Gregory",
        "House",
        time(9, 0),
        time(17, 0),
        vec![checkup.clone(), consultation.clone(), vaccination.clone()],
    );

    Clinic {
        checkup,
        consultation,
        vaccination,
        surgery,
        house,
    }
}

pub fn doctor(
    first_name: &str,
    last_name: &str,
    daily_start: NaiveTime,
    daily_end: NaiveTime,
    offered_types: Vec<AppointmentType>,
) -> Doctor {
    Doctor {
        id: Uuid::new_v4(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        specialty: "General Practice".to_string(),
        availability: AvailabilityWindow::new(daily_start, daily_end).unwrap(),
        offered_types,
    }
}

pub fn weekdays_only(mut doctor: Doctor) -> Doctor {
    doctor.availability = doctor.availability.on_days([
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ]);
    doctor
}

/// Monday, 2 March 2026.
pub fn monday() -> NaiveDate {
    date(2026, 3, 2)
}

pub fn saturday() -> NaiveDate {
    date(2026, 3, 7)
}

/// The working morning before the clinic opens on `monday()`.
pub fn early_monday() -> NaiveDateTime {
    instant(monday(), 7, 0)
}

pub fn candidate(doctor: &Doctor, day: NaiveDate, start: NaiveTime, appointment_type: &AppointmentType) -> Candidate {
    Candidate {
        doctor_id: doctor.id,
        patient_id: Uuid::new_v4(),
        date: day,
        start_time: start,
        appointment_type_id: appointment_type.id,
    }
}

pub fn booking(doctor: &Doctor, day: NaiveDate, start: NaiveTime, appointment_type: &AppointmentType) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        doctor_id: doctor.id,
        patient_id: Uuid::new_v4(),
        date: day,
        start_time: start,
        appointment_type: appointment_type.clone(),
        created_at: instant(day, 6, 0),
    }
}

pub struct Harness {
    pub clinic: Clinic,
    pub directory: Arc<InMemoryDoctorDirectory>,
    pub repository: Arc<InMemoryBookingRepository>,
    pub service: Arc<BookingService>,
}

pub fn harness() -> Harness {
    harness_with(TestConfig::default())
}

pub fn harness_with(config: TestConfig) -> Harness {
    let clinic = clinic();
    let directory = Arc::new(InMemoryDoctorDirectory::new(ClinicDirectory {
        appointment_types: vec![clinic.surgery.clone()],
        doctors: vec![clinic.house.clone()],
    }));
    let repository = Arc::new(InMemoryBookingRepository::new());
    let service = Arc::new(BookingService::new(
        &config.to_scheduling_config(),
        directory.clone(),
        repository.clone(),
    ));

    Harness {
        clinic,
        directory,
        repository,
        service,
    }
}
