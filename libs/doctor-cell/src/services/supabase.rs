use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Doctor, DoctorError, DoctorOrder, NewDoctor};
use crate::services::store::{sort_by_name, DoctorStore};

/// Directory backed by the PostgREST `doctors` table.
pub struct SupabaseDoctorStore {
    supabase: SupabaseClient,
}

impl SupabaseDoctorStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }
}

fn storage_error(context: &str, err: anyhow::Error) -> DoctorError {
    error!("{}: {}", context, err);
    DoctorError::Storage(err.to_string())
}

#[async_trait]
impl DoctorStore for SupabaseDoctorStore {
    async fn insert(&self, doctor: NewDoctor) -> Result<Doctor, DoctorError> {
        let body = json!({
            "name": doctor.name,
            "specialization": doctor.specialization,
        });

        let mut rows: Vec<Doctor> = self.supabase
            .request_returning(Method::POST, "/rest/v1/doctors", Some(body))
            .await
            .map_err(|e| storage_error("Failed to insert doctor", e))?;

        if rows.is_empty() {
            return Err(DoctorError::Storage("Insert returned no doctor row".to_string()));
        }

        Ok(rows.swap_remove(0))
    }

    async fn list(&self, order: DoctorOrder) -> Result<Vec<Doctor>, DoctorError> {
        let order_clause = match order {
            DoctorOrder::Name => "name.asc",
            DoctorOrder::CreatedAtDesc => "created_at.desc",
        };
        let path = format!("/rest/v1/doctors?select=*&order={}", order_clause);
        debug!("Listing doctors ordered by {}", order_clause);

        let mut doctors: Vec<Doctor> = self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| storage_error("Failed to list doctors", e))?;

        // Database collation may differ from the directory's name order.
        if order == DoctorOrder::Name {
            sort_by_name(&mut doctors);
        }

        Ok(doctors)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Doctor>, DoctorError> {
        let path = format!("/rest/v1/doctors?id=eq.{}&select=*", id);

        let rows: Vec<Doctor> = self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| storage_error("Failed to fetch doctor", e))?;

        Ok(rows.into_iter().next())
    }
}
