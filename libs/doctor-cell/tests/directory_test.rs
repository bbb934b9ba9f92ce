use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;

use doctor_cell::models::{AppointmentType, DoctorError};
use doctor_cell::services::{DoctorDirectory, DoctorService, InMemoryDoctorDirectory};
use shared_utils::test_utils::{MockClinicData, TestConfig};

fn directory_with(checkup_id: Uuid, doctor_id: Uuid) -> InMemoryDoctorDirectory {
    let raw = json!({
        "doctors": [
            MockClinicData::doctor_json(
                doctor_id,
                "Gregory",
                "House",
                "09:00",
                "17:00",
                vec![MockClinicData::appointment_type_json(checkup_id, "Checkup", 30)],
            )
        ]
    });
    InMemoryDoctorDirectory::from_json_str(&raw.to_string()).unwrap()
}

#[tokio::test]
async fn test_offered_types_join_the_catalog() {
    let checkup_id = Uuid::new_v4();
    let directory = directory_with(checkup_id, Uuid::new_v4());

    let checkup = directory.find_appointment_type(checkup_id).await.unwrap();
    assert_eq!(checkup.duration_minutes, 30);
    assert_matches!(
        directory.find_appointment_type(Uuid::new_v4()).await,
        Err(DoctorError::AppointmentTypeNotFound)
    );
}

#[tokio::test]
async fn test_replacing_a_type_updates_offered_copies() {
    let checkup_id = Uuid::new_v4();
    let doctor_id = Uuid::new_v4();
    let directory = directory_with(checkup_id, doctor_id);

    directory
        .replace_appointment_type(AppointmentType::with_id(checkup_id, "Extended checkup", 45).unwrap())
        .await;

    let doctor = directory.find_doctor(doctor_id).await.unwrap();
    assert_eq!(doctor.offered_type(checkup_id).unwrap().duration_minutes, 45);
    assert_eq!(directory.find_appointment_type(checkup_id).await.unwrap().name, "Extended checkup");
}

#[tokio::test]
async fn test_malformed_directory_file_is_a_load_error() {
    assert_matches!(
        InMemoryDoctorDirectory::from_json_str("{\"doctors\": 3}"),
        Err(DoctorError::DirectoryLoad(_))
    );

    let inverted = json!({
        "doctors": [MockClinicData::doctor_json(Uuid::new_v4(), "A", "B", "17:00", "09:00", vec![])]
    });
    assert!(InMemoryDoctorDirectory::from_json_str(&inverted.to_string()).is_err());
}

#[tokio::test]
async fn test_service_without_directory_path_starts_empty() {
    let service = DoctorService::from_config(&TestConfig::default().to_scheduling_config()).unwrap();

    assert!(service.list_doctors().await.unwrap().is_empty());
    assert_matches!(service.get_doctor(Uuid::new_v4()).await, Err(DoctorError::NotFound));
}

#[tokio::test]
async fn test_service_resolves_types_and_offering_doctors() {
    let checkup_id = Uuid::new_v4();
    let doctor_id = Uuid::new_v4();
    let service = DoctorService::new(std::sync::Arc::new(directory_with(checkup_id, doctor_id)));

    assert_eq!(service.get_appointment_type(checkup_id).await.unwrap().name, "Checkup");

    let summaries = service.doctors_for_appointment_type(checkup_id).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, doctor_id);
    assert_eq!(summaries[0].name, "Gregory House - General Practice");
}

#[tokio::test]
async fn test_service_loads_directory_from_configured_path() {
    use std::io::Write;

    let doctor_id = Uuid::new_v4();
    let raw = json!({
        "doctors": [MockClinicData::doctor_json(doctor_id, "James", "Wilson", "08:00", "12:00", vec![])]
    });
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(raw.to_string().as_bytes()).unwrap();

    let mut config = TestConfig::default().to_scheduling_config();
    config.clinic_directory_path = Some(file.path().to_path_buf());

    let service = DoctorService::from_config(&config).unwrap();
    assert_eq!(service.get_doctor(doctor_id).await.unwrap().last_name, "Wilson");

    config.clinic_directory_path = Some(file.path().with_extension("missing"));
    assert_matches!(DoctorService::from_config(&config).err(), Some(DoctorError::DirectoryLoad(_)));
}
