use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{AppointmentType, ClinicDirectory, Doctor, DoctorError};

/// Read access to doctors and the appointment-type catalog. Persistence
/// lives behind this trait.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn find_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError>;

    async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError>;

    async fn find_appointment_type(&self, appointment_type_id: Uuid) -> Result<AppointmentType, DoctorError>;

    /// Doctors whose offered types include `appointment_type_id`.
    async fn doctors_offering(&self, appointment_type_id: Uuid) -> Result<Vec<Doctor>, DoctorError>;
}

#[derive(Debug, Default)]
struct DirectoryState {
    doctors: Vec<Doctor>,
    appointment_types: HashMap<Uuid, AppointmentType>,
}

#[derive(Debug, Default)]
pub struct InMemoryDoctorDirectory {
    state: RwLock<DirectoryState>,
}

impl InMemoryDoctorDirectory {
    pub fn new(directory: ClinicDirectory) -> Self {
        let mut appointment_types: HashMap<Uuid, AppointmentType> = directory
            .appointment_types
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        for doctor in &directory.doctors {
            for offered in &doctor.offered_types {
                appointment_types.entry(offered.id).or_insert_with(|| offered.clone());
            }
        }

        Self {
            state: RwLock::new(DirectoryState {
                doctors: directory.doctors,
                appointment_types,
            }),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, DoctorError> {
        let directory: ClinicDirectory =
            serde_json::from_str(raw).map_err(|e| DoctorError::DirectoryLoad(e.to_string()))?;
        Ok(Self::new(directory))
    }

    pub fn from_path(path: &Path) -> Result<Self, DoctorError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DoctorError::DirectoryLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }

    pub async fn add_doctor(&self, doctor: Doctor) {
        let mut state = self.state.write().await;
        for offered in &doctor.offered_types {
            state.appointment_types.entry(offered.id).or_insert_with(|| offered.clone());
        }
        state.doctors.retain(|d| d.id != doctor.id);
        state.doctors.push(doctor);
    }

    /// Replaces a catalog entry and every doctor's offered copy of it. Existing
    /// bookings keep the snapshot they were created with.
    pub async fn replace_appointment_type(&self, appointment_type: AppointmentType) {
        let mut state = self.state.write().await;
        for doctor in state.doctors.iter_mut() {
            for offered in doctor.offered_types.iter_mut() {
                if offered.id == appointment_type.id {
                    *offered = appointment_type.clone();
                }
            }
        }
        debug!("Appointment type {} replaced in catalog", appointment_type.id);
        state.appointment_types.insert(appointment_type.id, appointment_type);
    }
}

#[async_trait]
impl DoctorDirectory for InMemoryDoctorDirectory {
    async fn find_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        let state = self.state.read().await;
        state
            .doctors
            .iter()
            .find(|d| d.id == doctor_id)
            .cloned()
            .ok_or(DoctorError::NotFound)
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        let state = self.state.read().await;
        let mut doctors = state.doctors.clone();
        doctors.sort_by(|a, b| a.last_name.cmp(&b.last_name).then_with(|| a.first_name.cmp(&b.first_name)));
        Ok(doctors)
    }

    async fn find_appointment_type(&self, appointment_type_id: Uuid) -> Result<AppointmentType, DoctorError> {
        let state = self.state.read().await;
        state
            .appointment_types
            .get(&appointment_type_id)
            .cloned()
            .ok_or(DoctorError::AppointmentTypeNotFound)
    }

    async fn doctors_offering(&self, appointment_type_id: Uuid) -> Result<Vec<Doctor>, DoctorError> {
        Ok(self
            .list_doctors()
            .await?
            .into_iter()
            .filter(|d| d.offers(appointment_type_id))
            .collect())
    }
}
