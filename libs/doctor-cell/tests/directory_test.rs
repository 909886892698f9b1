use assert_matches::assert_matches;
use uuid::Uuid;

use doctor_cell::*;
use shared_realtime::{ChangeKind, ChangeNotifier, ChangeTable};

fn request(name: &str, specialization: &str) -> CreateDoctorRequest {
    CreateDoctorRequest {
        name: name.to_string(),
        specialization: specialization.to_string(),
    }
}

#[tokio::test]
async fn add_doctor_stores_trimmed_fields() {
    let service = DoctorService::in_memory(ChangeNotifier::default());

    let doctor = service
        .add_doctor(request("  Dr. A ", " Cardiologist  "))
        .await
        .unwrap();

    assert_eq!(doctor.name, "Dr. A");
    assert_eq!(doctor.specialization, "Cardiologist");
    assert_eq!(service.get_doctor(doctor.id).await.unwrap(), doctor);
}

#[tokio::test]
async fn blank_fields_are_rejected_without_insert() {
    let service = DoctorService::in_memory(ChangeNotifier::default());

    let result = service.add_doctor(request("   ", "Cardiologist")).await;
    assert_matches!(result, Err(DoctorError::Validation(_)));

    let result = service.add_doctor(request("Dr. A", "")).await;
    assert_matches!(result, Err(DoctorError::Validation(_)));

    let doctors = service.list_doctors(DoctorOrder::Name).await.unwrap();
    assert!(doctors.is_empty());
}

#[tokio::test]
async fn duplicate_names_are_allowed() {
    let service = DoctorService::in_memory(ChangeNotifier::default());

    let first = service.add_doctor(request("Dr. Rao", "ENT")).await.unwrap();
    let second = service.add_doctor(request("Dr. Rao", "ENT")).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(service.list_doctors(DoctorOrder::Name).await.unwrap().len(), 2);
}

#[tokio::test]
async fn list_orders_by_name_case_insensitively() {
    let service = DoctorService::in_memory(ChangeNotifier::default());
    for name in ["dr. Mehta", "Dr. Bose", "Dr. Kapoor"] {
        service.add_doctor(request(name, "General")).await.unwrap();
    }

    let names: Vec<String> = service
        .list_doctors(DoctorOrder::Name)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.name)
        .collect();

    assert_eq!(names, vec!["Dr. Bose", "Dr. Kapoor", "dr. Mehta"]);
}

#[tokio::test]
async fn list_orders_newest_first() {
    let service = DoctorService::in_memory(ChangeNotifier::default());
    for name in ["First", "Second", "Third"] {
        service.add_doctor(request(name, "General")).await.unwrap();
    }

    let names: Vec<String> = service
        .list_doctors(DoctorOrder::CreatedAtDesc)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.name)
        .collect();

    assert_eq!(names, vec!["Third", "Second", "First"]);
}

#[tokio::test]
async fn unknown_doctor_is_not_found() {
    let service = DoctorService::in_memory(ChangeNotifier::default());
    let missing = Uuid::new_v4();

    assert_matches!(service.get_doctor(missing).await, Err(DoctorError::NotFound(id)) if id == missing);
}

#[tokio::test]
async fn insert_notifies_doctor_subscribers() {
    let notifier = ChangeNotifier::new(8);
    let mut subscription = notifier.subscribe(ChangeTable::Doctors, None);
    let service = DoctorService::in_memory(notifier);

    let doctor = service.add_doctor(request("Dr. A", "Cardiologist")).await.unwrap();

    let event = subscription.recv().await.unwrap();
    assert_eq!(event.kind, ChangeKind::Insert);
    assert_eq!(event.record_id, Some(doctor.id.to_string()));
}
