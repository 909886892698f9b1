mod common;

use std::collections::BTreeSet;

use assert_matches::assert_matches;
use chrono::Duration;
use futures::future::join_all;
use uuid::Uuid;

use shared_realtime::{ChangeFilter, ChangeKind, ChangeTable};
use shared_utils::test_utils::{test_date, TestPatient};
use token_queue_cell::*;

use common::{token_request, TestClinic};

#[tokio::test]
async fn front_desk_scenario_numbers_and_positions() {
    let clinic = TestClinic::new();
    let doctor = clinic.add_doctor("Dr. A", "Cardiologist").await;
    let date = test_date();

    let asha = clinic
        .tokens
        .allocate_token_on(date, token_request(doctor.id, &TestPatient::asha()))
        .await
        .unwrap();
    assert_eq!((asha.token_number, asha.queue_position), (1, 1));
    assert_eq!(asha.token_date, date);

    let vikram = clinic
        .tokens
        .allocate_token_on(date, token_request(doctor.id, &TestPatient::vikram()))
        .await
        .unwrap();
    assert_eq!((vikram.token_number, vikram.queue_position), (2, 2));

    clinic.tokens.mark_complete(asha.token_id).await.unwrap();

    let tokens = clinic.tokens.list_tokens(doctor.id, date).await.unwrap();
    let vikram_row = tokens.iter().find(|t| t.id == vikram.token_id).unwrap();
    assert_eq!(vikram_row.queue_position, 2);

    // One token still open, so the next patient is second in line.
    let third = clinic
        .tokens
        .allocate_token_on(date, token_request(doctor.id, &TestPatient::numbered(3)))
        .await
        .unwrap();
    assert_eq!((third.token_number, third.queue_position), (3, 2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn fifty_concurrent_allocations_get_distinct_numbers() {
    let clinic = TestClinic::new();
    let doctor = clinic.add_doctor("Dr. A", "Cardiologist").await;
    let date = test_date();

    let handles: Vec<_> = (1..=50)
        .map(|n| {
            let tokens = clinic.tokens.clone();
            let request = token_request(doctor.id, &TestPatient::numbered(n));
            tokio::spawn(async move { tokens.allocate_token_on(date, request).await })
        })
        .collect();

    let receipts: Vec<TokenReceipt> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    let numbers: BTreeSet<u32> = receipts.iter().map(|r| r.token_number).collect();
    let positions: BTreeSet<u32> = receipts.iter().map(|r| r.queue_position).collect();
    let expected: BTreeSet<u32> = (1..=50).collect();
    assert_eq!(numbers, expected);
    assert_eq!(positions, expected);

    let listed: Vec<u32> = clinic
        .tokens
        .list_tokens(doctor.id, date)
        .await
        .unwrap()
        .iter()
        .map(|t| t.token_number)
        .collect();
    assert_eq!(listed, (1..=50).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_doctors_keep_separate_sequences() {
    let clinic = TestClinic::new();
    let first = clinic.add_doctor("Dr. A", "Cardiologist").await;
    let second = clinic.add_doctor("Dr. B", "Dermatologist").await;
    let date = test_date();

    let handles: Vec<_> = (1..=40)
        .map(|n| {
            let tokens = clinic.tokens.clone();
            let doctor_id = if n % 2 == 0 { first.id } else { second.id };
            let request = token_request(doctor_id, &TestPatient::numbered(n));
            tokio::spawn(async move { tokens.allocate_token_on(date, request).await })
        })
        .collect();

    for joined in join_all(handles).await {
        joined.unwrap().unwrap();
    }

    for doctor_id in [first.id, second.id] {
        let numbers: Vec<u32> = clinic
            .tokens
            .list_tokens(doctor_id, date)
            .await
            .unwrap()
            .iter()
            .map(|t| t.token_number)
            .collect();
        assert_eq!(numbers, (1..=20).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn other_doctors_and_dates_do_not_affect_numbering() {
    let clinic = TestClinic::new();
    let doctor = clinic.add_doctor("Dr. A", "Cardiologist").await;
    let other = clinic.add_doctor("Dr. B", "Dermatologist").await;
    let date = test_date();
    let next_day = date + Duration::days(1);

    for n in 1..=3 {
        clinic
            .tokens
            .allocate_token_on(date, token_request(other.id, &TestPatient::numbered(n)))
            .await
            .unwrap();
        clinic
            .tokens
            .allocate_token_on(next_day, token_request(doctor.id, &TestPatient::numbered(n)))
            .await
            .unwrap();
    }

    let receipt = clinic
        .tokens
        .allocate_token_on(date, token_request(doctor.id, &TestPatient::asha()))
        .await
        .unwrap();
    assert_eq!((receipt.token_number, receipt.queue_position), (1, 1));

    let next_day_numbers: Vec<u32> = clinic
        .tokens
        .list_tokens(doctor.id, next_day)
        .await
        .unwrap()
        .iter()
        .map(|t| t.token_number)
        .collect();
    assert_eq!(next_day_numbers, vec![1, 2, 3]);
}

#[tokio::test]
async fn short_phone_is_rejected_without_a_row() {
    let clinic = TestClinic::new();
    let doctor = clinic.add_doctor("Dr. A", "Cardiologist").await;

    let result = clinic
        .tokens
        .allocate_token_on(test_date(), token_request(doctor.id, &TestPatient::new("Asha", "12345")))
        .await;

    assert_matches!(result, Err(TokenQueueError::Validation(msg)) if msg.contains("10 digits"));
    assert!(clinic.tokens.list_tokens(doctor.id, test_date()).await.unwrap().is_empty());
}

#[tokio::test]
async fn blank_patient_name_is_rejected() {
    let clinic = TestClinic::new();
    let doctor = clinic.add_doctor("Dr. A", "Cardiologist").await;

    let result = clinic
        .tokens
        .allocate_token_on(test_date(), token_request(doctor.id, &TestPatient::new("   ", "9876543210")))
        .await;

    assert_matches!(result, Err(TokenQueueError::Validation(_)));
    assert!(clinic.tokens.list_tokens(doctor.id, test_date()).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_doctor_is_rejected_without_a_row() {
    let clinic = TestClinic::new();
    let missing = Uuid::new_v4();

    let result = clinic
        .tokens
        .allocate_token_on(test_date(), token_request(missing, &TestPatient::asha()))
        .await;

    assert_matches!(result, Err(TokenQueueError::UnknownDoctor(id)) if id == missing);
    assert!(clinic.tokens.list_tokens(missing, test_date()).await.unwrap().is_empty());
}

#[tokio::test]
async fn receipt_carries_doctor_and_trimmed_patient() {
    let clinic = TestClinic::new();
    let doctor = clinic.add_doctor("Dr. A", "Cardiologist").await;

    let receipt = clinic
        .tokens
        .allocate_token(token_request(doctor.id, &TestPatient::new("  Asha  ", " 9876543210 ")))
        .await
        .unwrap();

    assert_eq!(receipt.doctor_name, "Dr. A");
    assert_eq!(receipt.patient_name, "Asha");
    assert_eq!(receipt.token_date, clinic.tokens.today());

    let stored = clinic.tokens.list_tokens(doctor.id, receipt.token_date).await.unwrap();
    assert_eq!(stored[0].patient_phone, "9876543210");
    assert_eq!(stored[0].status, TokenStatus::Active);
}

#[tokio::test]
async fn allocation_notifies_the_doctors_queue() {
    let clinic = TestClinic::new();
    let doctor = clinic.add_doctor("Dr. A", "Cardiologist").await;
    let mut subscription = clinic
        .notifier
        .subscribe(ChangeTable::Tokens, Some(ChangeFilter::eq("doctor_id", doctor.id)));

    let receipt = clinic
        .tokens
        .allocate_token_on(test_date(), token_request(doctor.id, &TestPatient::asha()))
        .await
        .unwrap();

    let event = subscription.recv().await.unwrap();
    assert_eq!(event.kind, ChangeKind::Insert);
    assert_eq!(event.record_id, Some(receipt.token_id.to_string()));
    assert_eq!(event.fields["token_date"], "2024-01-01");
}
