use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Doctor, DoctorError, DoctorOrder, NewDoctor};

/// Persistence seam for the doctor directory.
#[async_trait]
pub trait DoctorStore: Send + Sync {
    /// Stores a new row; the store assigns `id` and `created_at`.
    async fn insert(&self, doctor: NewDoctor) -> Result<Doctor, DoctorError>;

    async fn list(&self, order: DoctorOrder) -> Result<Vec<Doctor>, DoctorError>;

    async fn get(&self, id: Uuid) -> Result<Option<Doctor>, DoctorError>;
}

/// Directory name order shared by every backend: case-insensitive, then
/// byte order so names differing only in case stay stable.
pub fn sort_by_name(doctors: &mut [Doctor]) {
    doctors.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[derive(Default)]
pub struct InMemoryDoctorStore {
    // Insertion order; breaks `created_at` ties.
    doctors: RwLock<Vec<Doctor>>,
}

impl InMemoryDoctorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DoctorStore for InMemoryDoctorStore {
    async fn insert(&self, doctor: NewDoctor) -> Result<Doctor, DoctorError> {
        let doctor = Doctor {
            id: Uuid::new_v4(),
            name: doctor.name,
            specialization: doctor.specialization,
            created_at: Utc::now(),
        };

        self.doctors.write().await.push(doctor.clone());
        Ok(doctor)
    }

    async fn list(&self, order: DoctorOrder) -> Result<Vec<Doctor>, DoctorError> {
        let doctors = self.doctors.read().await;

        let listed = match order {
            DoctorOrder::Name => {
                let mut listed = doctors.clone();
                sort_by_name(&mut listed);
                listed
            }
            DoctorOrder::CreatedAtDesc => {
                let mut listed: Vec<Doctor> = doctors.iter().rev().cloned().collect();
                listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                listed
            }
        };

        Ok(listed)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Doctor>, DoctorError> {
        let doctors = self.doctors.read().await;
        Ok(doctors.iter().find(|d| d.id == id).cloned())
    }
}
