use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::SchedulingConfig;

use crate::models::{AppointmentType, Doctor, DoctorError, DoctorSummary};
use crate::services::directory::{DoctorDirectory, InMemoryDoctorDirectory};

pub struct DoctorService {
    directory: Arc<dyn DoctorDirectory>,
}

impl DoctorService {
    pub fn new(directory: Arc<dyn DoctorDirectory>) -> Self {
        Self { directory }
    }

    /// Builds the service from `CLINIC_DIRECTORY_PATH`, or an empty directory
    /// when none is configured.
    pub fn from_config(config: &SchedulingConfig) -> Result<Self, DoctorError> {
        let directory = match &config.clinic_directory_path {
            Some(path) => {
                let directory = InMemoryDoctorDirectory::from_path(path)?;
                info!("Loaded clinic directory from {}", path.display());
                directory
            }
            None => {
                warn!("No clinic directory configured, doctor list is empty");
                InMemoryDoctorDirectory::default()
            }
        };
        Ok(Self::new(Arc::new(directory)))
    }

    pub fn directory(&self) -> Arc<dyn DoctorDirectory> {
        Arc::clone(&self.directory)
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor {}", doctor_id);
        self.directory.find_doctor(doctor_id).await
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        self.directory.list_doctors().await
    }

    pub async fn get_appointment_type(&self, appointment_type_id: Uuid) -> Result<AppointmentType, DoctorError> {
        self.directory.find_appointment_type(appointment_type_id).await
    }

    /// Doctors a patient can pick once they have chosen an appointment type.
    pub async fn doctors_for_appointment_type(
        &self,
        appointment_type_id: Uuid,
    ) -> Result<Vec<DoctorSummary>, DoctorError> {
        // Unknown type ids are reported rather than answered with an empty list.
        self.directory.find_appointment_type(appointment_type_id).await?;

        let doctors = self.directory.doctors_offering(appointment_type_id).await?;
        debug!("{} doctors offer appointment type {}", doctors.len(), appointment_type_id);
        Ok(doctors.iter().map(DoctorSummary::from).collect())
    }
}
