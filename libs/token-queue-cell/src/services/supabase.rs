use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, error, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{SupabaseApiError, SupabaseClient};

use crate::services::ledger::TokenLedger;
use crate::{Token, TokenAllocation, TokenQueueError, TokenRequest, TokenStatus};

/// SQLSTATEs meaning another writer got there first.
const CONFLICT_CODES: &[&str] = &["23505", "40001", "40P01"];
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Ledger backed by the `tokens` table and the `generate_token` function.
pub struct SupabaseTokenLedger {
    supabase: SupabaseClient,
}

impl SupabaseTokenLedger {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn fetch_token(&self, token_id: Uuid) -> Result<Option<Token>, TokenQueueError> {
        let path = format!("/rest/v1/tokens?id=eq.{}&select=*", token_id);
        let rows: Vec<Token> = self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(storage_error)?;

        Ok(rows.into_iter().next())
    }
}

fn storage_error(err: anyhow::Error) -> TokenQueueError {
    error!("Token ledger request failed: {}", err);
    TokenQueueError::Storage(err.to_string())
}

fn classify_allocation_error(err: anyhow::Error, doctor_id: Uuid) -> TokenQueueError {
    match err.downcast_ref::<SupabaseApiError>() {
        Some(api) if api.has_code(CONFLICT_CODES) => {
            warn!("generate_token lost a race: {}", api.message);
            TokenQueueError::AllocationConflict
        }
        Some(api) if api.has_code(&[FOREIGN_KEY_VIOLATION]) => TokenQueueError::UnknownDoctor(doctor_id),
        Some(api) => TokenQueueError::AllocationFailed(api.message.clone()),
        None => TokenQueueError::AllocationFailed(err.to_string()),
    }
}

#[async_trait]
impl TokenLedger for SupabaseTokenLedger {
    async fn allocate(
        &self,
        request: &TokenRequest,
        token_date: NaiveDate,
    ) -> Result<TokenAllocation, TokenQueueError> {
        let params = json!({
            "p_doctor_id": request.doctor_id,
            "p_patient_name": request.patient_name,
            "p_patient_phone": request.patient_phone,
            "p_token_date": token_date,
        });

        let rows: Vec<TokenAllocation> = self.supabase
            .rpc("generate_token", params)
            .await
            .map_err(|e| classify_allocation_error(e, request.doctor_id))?;

        rows.into_iter().next().ok_or_else(|| {
            TokenQueueError::AllocationFailed("generate_token returned no token".to_string())
        })
    }

    async fn list(&self, doctor_id: Uuid, token_date: NaiveDate) -> Result<Vec<Token>, TokenQueueError> {
        let path = format!(
            "/rest/v1/tokens?doctor_id=eq.{}&token_date=eq.{}&order=token_number.asc&select=*",
            doctor_id, token_date
        );
        debug!("Fetching tokens for doctor {} on {}", doctor_id, token_date);

        self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(storage_error)
    }

    async fn mark_complete(&self, token_id: Uuid) -> Result<Token, TokenQueueError> {
        // Conditional on the current status, so the flip happens at most once.
        let path = format!("/rest/v1/tokens?id=eq.{}&status=eq.active", token_id);
        let updated: Vec<Token> = self.supabase
            .request_returning(
                Method::PATCH,
                &path,
                Some(json!({ "status": TokenStatus::Completed })),
            )
            .await
            .map_err(storage_error)?;

        if let Some(token) = updated.into_iter().next() {
            return Ok(token);
        }

        match self.fetch_token(token_id).await? {
            Some(token) => Err(TokenQueueError::InvalidTransition {
                from: token.status,
                to: TokenStatus::Completed,
            }),
            None => Err(TokenQueueError::NotFound(token_id)),
        }
    }
}
