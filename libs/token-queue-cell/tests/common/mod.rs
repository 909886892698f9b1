#![allow(dead_code)]

use std::sync::Arc;

use doctor_cell::{CreateDoctorRequest, Doctor, DoctorService};
use shared_realtime::ChangeNotifier;
use shared_utils::test_utils::TestPatient;
use token_queue_cell::{AllocateTokenRequest, TokenQueueService};
use uuid::Uuid;

/// In-memory directory and ledger sharing one notifier.
pub struct TestClinic {
    pub doctors: Arc<DoctorService>,
    pub tokens: Arc<TokenQueueService>,
    pub notifier: ChangeNotifier,
}

impl TestClinic {
    pub fn new() -> Self {
        let notifier = ChangeNotifier::new(1024);
        let doctors = Arc::new(DoctorService::in_memory(notifier.clone()));
        let tokens = Arc::new(TokenQueueService::in_memory(Arc::clone(&doctors), notifier.clone()));

        Self {
            doctors,
            tokens,
            notifier,
        }
    }

    pub async fn add_doctor(&self, name: &str, specialization: &str) -> Doctor {
        self.doctors
            .add_doctor(CreateDoctorRequest {
                name: name.to_string(),
                specialization: specialization.to_string(),
            })
            .await
            .expect("doctor should be created")
    }
}

pub fn token_request(doctor_id: Uuid, patient: &TestPatient) -> AllocateTokenRequest {
    AllocateTokenRequest {
        doctor_id,
        patient_name: patient.name.clone(),
        patient_phone: patient.phone.clone(),
    }
}
