use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::{AppConfig, StorageBackend};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub storage_backend: StorageBackend,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            storage_backend: StorageBackend::Memory,
        }
    }
}

impl TestConfig {
    /// Supabase-backed config pointing at a mock server.
    pub fn supabase(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            storage_backend: StorageBackend::Supabase,
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            storage_backend: self.storage_backend,
            // Keep retry sleeps short in tests.
            allocation_retry_base_ms: 1,
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestPatient {
    pub name: String,
    pub phone: String,
}

impl TestPatient {
    pub fn new(name: &str, phone: &str) -> Self {
        Self {
            name: name.to_string(),
            phone: phone.to_string(),
        }
    }

    pub fn asha() -> Self {
        Self::new("Asha", "9876543210")
    }

    pub fn vikram() -> Self {
        Self::new("Vikram", "9123456780")
    }

    /// Distinct, valid patient for load tests.
    pub fn numbered(n: usize) -> Self {
        Self::new(&format!("Patient {}", n), &format!("9{:09}", n))
    }
}

pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

/// PostgREST-shaped rows for wiremock responses.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn doctor_response(id: Uuid, name: &str, specialization: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "specialization": specialization,
            "created_at": "2024-01-01T08:00:00Z"
        })
    }

    pub fn token_response(
        id: Uuid,
        doctor_id: Uuid,
        token_number: u32,
        queue_position: u32,
        status: &str,
    ) -> Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "patient_name": "Asha",
            "patient_phone": "9876543210",
            "token_number": token_number,
            "token_date": "2024-01-01",
            "queue_position": queue_position,
            "status": status,
            "created_at": "2024-01-01T09:00:00Z"
        })
    }

    pub fn generate_token_response(token_id: Uuid, token_number: u32, queue_position: u32) -> Value {
        json!([{
            "token_id": token_id,
            "token_number": token_number,
            "token_date": "2024-01-01",
            "queue_position": queue_position
        }])
    }

    pub fn error_response(code: &str, message: &str) -> Value {
        json!({
            "code": code,
            "message": message,
            "details": null,
            "hint": null
        })
    }
}
