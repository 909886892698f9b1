use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use doctor_cell::DoctorService;
use shared_config::{AppConfig, StorageBackend};
use shared_realtime::{ChangeEvent, ChangeKind, ChangeNotifier, ChangeTable};
use shared_utils::validation::{patient_phone, required_text};

use crate::services::allocation::{retry_on_conflict, RetryPolicy};
use crate::services::clock::TokenClock;
use crate::services::ledger::{InMemoryTokenLedger, TokenLedger};
use crate::services::supabase::SupabaseTokenLedger;
use crate::{
    AllocateTokenRequest, QueueView, Token, TokenAllocation, TokenQueueError, TokenReceipt,
    TokenRequest,
};

/// Token issuance, the per-doctor queue projection and completion.
pub struct TokenQueueService {
    ledger: Arc<dyn TokenLedger>,
    doctors: Arc<DoctorService>,
    notifier: ChangeNotifier,
    clock: TokenClock,
    retry: RetryPolicy,
}

impl TokenQueueService {
    pub fn new(
        ledger: Arc<dyn TokenLedger>,
        doctors: Arc<DoctorService>,
        notifier: ChangeNotifier,
        clock: TokenClock,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            ledger,
            doctors,
            notifier,
            clock,
            retry,
        }
    }

    pub fn in_memory(doctors: Arc<DoctorService>, notifier: ChangeNotifier) -> Self {
        Self::new(
            Arc::new(InMemoryTokenLedger::new()),
            doctors,
            notifier,
            TokenClock::utc(),
            RetryPolicy::default(),
        )
    }

    pub fn from_config(config: &AppConfig, doctors: Arc<DoctorService>, notifier: ChangeNotifier) -> Self {
        let ledger: Arc<dyn TokenLedger> = match config.storage_backend {
            StorageBackend::Memory => Arc::new(InMemoryTokenLedger::new()),
            StorageBackend::Supabase => Arc::new(SupabaseTokenLedger::new(config)),
        };

        Self::new(
            ledger,
            doctors,
            notifier,
            TokenClock::from_config(config),
            RetryPolicy::from_config(config),
        )
    }

    /// The clinic's current calendar day.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Issue a token for today, as stamped by the server clock.
    pub async fn allocate_token(&self, request: AllocateTokenRequest) -> Result<TokenReceipt, TokenQueueError> {
        let token_date = self.today();
        self.allocate_token_on(token_date, request).await
    }

    #[instrument(skip(self, request), fields(doctor_id = %request.doctor_id))]
    pub async fn allocate_token_on(
        &self,
        token_date: NaiveDate,
        request: AllocateTokenRequest,
    ) -> Result<TokenReceipt, TokenQueueError> {
        let request = TokenRequest {
            doctor_id: request.doctor_id,
            patient_name: required_text("Patient name", &request.patient_name)?,
            patient_phone: patient_phone(&request.patient_phone)?,
        };

        let doctor = self.doctors.get_doctor(request.doctor_id).await?;

        let allocation: TokenAllocation = retry_on_conflict(&self.retry, || {
            self.ledger.allocate(&request, token_date)
        })
        .await?;

        info!(
            "Token #{} issued for doctor {} on {} at queue position {}",
            allocation.token_number, doctor.id, allocation.token_date, allocation.queue_position
        );

        self.notifier.publish(
            ChangeEvent::new(ChangeTable::Tokens, ChangeKind::Insert, allocation.token_id)
                .with_field("doctor_id", doctor.id)
                .with_field("token_date", allocation.token_date)
                .with_field("status", "active"),
        );

        Ok(TokenReceipt {
            token_id: allocation.token_id,
            token_number: allocation.token_number,
            token_date: allocation.token_date,
            queue_position: allocation.queue_position,
            doctor_id: doctor.id,
            doctor_name: doctor.name,
            patient_name: request.patient_name,
        })
    }

    pub async fn list_tokens(&self, doctor_id: Uuid, token_date: NaiveDate) -> Result<Vec<Token>, TokenQueueError> {
        let tokens = self.ledger.list(doctor_id, token_date).await?;
        debug!("Loaded {} tokens for doctor {} on {}", tokens.len(), doctor_id, token_date);
        Ok(tokens)
    }

    /// Queue for one doctor and day (today when `token_date` is `None`).
    pub async fn queue_view(
        &self,
        doctor_id: Uuid,
        token_date: Option<NaiveDate>,
    ) -> Result<QueueView, TokenQueueError> {
        let token_date = token_date.unwrap_or_else(|| self.today());
        let tokens = self.list_tokens(doctor_id, token_date).await?;
        Ok(QueueView::from_tokens(doctor_id, token_date, tokens))
    }

    /// Mark a token served. Queue positions of every token stay as issued.
    #[instrument(skip(self))]
    pub async fn mark_complete(&self, token_id: Uuid) -> Result<Token, TokenQueueError> {
        let token = self.ledger.mark_complete(token_id).await?;
        info!("Token #{} for doctor {} completed", token.token_number, token.doctor_id);

        self.notifier.publish(
            ChangeEvent::new(ChangeTable::Tokens, ChangeKind::Update, token.id)
                .with_field("doctor_id", token.doctor_id)
                .with_field("token_date", token.token_date)
                .with_field("status", token.status),
        );

        Ok(token)
    }
}
