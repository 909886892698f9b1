use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use shared_config::{AppConfig, StorageBackend};
use shared_realtime::{ChangeEvent, ChangeKind, ChangeNotifier, ChangeTable};
use shared_utils::validation::required_text;

use crate::models::{CreateDoctorRequest, Doctor, DoctorError, DoctorOrder, NewDoctor};
use crate::services::store::{DoctorStore, InMemoryDoctorStore};
use crate::services::supabase::SupabaseDoctorStore;

pub struct DoctorService {
    store: Arc<dyn DoctorStore>,
    notifier: ChangeNotifier,
}

impl DoctorService {
    pub fn new(store: Arc<dyn DoctorStore>, notifier: ChangeNotifier) -> Self {
        Self { store, notifier }
    }

    pub fn in_memory(notifier: ChangeNotifier) -> Self {
        Self::new(Arc::new(InMemoryDoctorStore::new()), notifier)
    }

    pub fn from_config(config: &AppConfig, notifier: ChangeNotifier) -> Self {
        let store: Arc<dyn DoctorStore> = match config.storage_backend {
            StorageBackend::Memory => Arc::new(InMemoryDoctorStore::new()),
            StorageBackend::Supabase => Arc::new(SupabaseDoctorStore::new(config)),
        };
        Self::new(store, notifier)
    }

    /// Register a doctor. Name and specialization are stored trimmed.
    #[instrument(skip(self, request))]
    pub async fn add_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        let new_doctor = NewDoctor {
            name: required_text("Doctor name", &request.name)?,
            specialization: required_text("Specialization", &request.specialization)?,
        };

        let doctor = self.store.insert(new_doctor).await?;
        info!("Doctor {} registered ({})", doctor.id, doctor.specialization);

        self.notifier.publish(ChangeEvent::new(ChangeTable::Doctors, ChangeKind::Insert, doctor.id));

        Ok(doctor)
    }

    pub async fn list_doctors(&self, order: DoctorOrder) -> Result<Vec<Doctor>, DoctorError> {
        let doctors = self.store.list(order).await?;
        debug!("Listed {} doctors ordered by {:?}", doctors.len(), order);
        Ok(doctors)
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        self.store
            .get(doctor_id)
            .await?
            .ok_or(DoctorError::NotFound(doctor_id))
    }
}
