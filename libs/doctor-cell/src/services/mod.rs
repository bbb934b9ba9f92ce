pub mod directory;
pub mod doctor;

pub use directory::{DoctorDirectory, InMemoryDoctorDirectory};
pub use doctor::DoctorService;
