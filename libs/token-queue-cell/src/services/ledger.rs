use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::{
    QueueKey, Token, TokenAllocation, TokenQueueError, TokenRequest, TokenStatus,
};

/// Persistence seam for issued tokens.
///
/// `allocate` must be atomic per `(doctor_id, token_date)`: concurrent calls
/// for one key never share a `token_number`, and calls for different keys
/// must not wait on each other. Implementations report a lost race as
/// [`TokenQueueError::AllocationConflict`] and leave no row behind.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    async fn allocate(
        &self,
        request: &TokenRequest,
        token_date: NaiveDate,
    ) -> Result<TokenAllocation, TokenQueueError>;

    /// Tokens for one doctor and day, ordered by `token_number`.
    async fn list(&self, doctor_id: Uuid, token_date: NaiveDate) -> Result<Vec<Token>, TokenQueueError>;

    /// Flip `active` to `completed`, returning the updated row.
    async fn mark_complete(&self, token_id: Uuid) -> Result<Token, TokenQueueError>;
}

#[derive(Debug, Default)]
struct DayQueue {
    tokens: Vec<Token>,
}

impl DayQueue {
    fn next_token_number(&self) -> u32 {
        self.tokens.iter().map(|t| t.token_number).max().unwrap_or(0) + 1
    }

    fn next_queue_position(&self) -> u32 {
        let open = self
            .tokens
            .iter()
            .filter(|t| t.status == TokenStatus::Active)
            .count();
        open as u32 + 1
    }
}

/// Arena of independently locked day queues.
///
/// The arena lock is only held to look up or create a queue; issuing a token
/// holds that queue's own lock, so different doctors and dates never contend.
#[derive(Default)]
pub struct InMemoryTokenLedger {
    queues: Mutex<HashMap<QueueKey, Arc<Mutex<DayQueue>>>>,
    index: RwLock<HashMap<Uuid, QueueKey>>,
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    async fn queue_for(&self, key: QueueKey) -> Arc<Mutex<DayQueue>> {
        let mut queues = self.queues.lock().await;
        Arc::clone(queues.entry(key).or_default())
    }

    async fn existing_queue(&self, key: &QueueKey) -> Option<Arc<Mutex<DayQueue>>> {
        self.queues.lock().await.get(key).cloned()
    }
}

#[async_trait]
impl TokenLedger for InMemoryTokenLedger {
    async fn allocate(
        &self,
        request: &TokenRequest,
        token_date: NaiveDate,
    ) -> Result<TokenAllocation, TokenQueueError> {
        let key = QueueKey::new(request.doctor_id, token_date);
        let queue = self.queue_for(key).await;
        let mut day = queue.lock().await;

        let token = Token {
            id: Uuid::new_v4(),
            doctor_id: request.doctor_id,
            patient_name: request.patient_name.clone(),
            patient_phone: request.patient_phone.clone(),
            token_number: day.next_token_number(),
            token_date,
            queue_position: day.next_queue_position(),
            status: TokenStatus::Active,
            created_at: Utc::now(),
        };

        let allocation = TokenAllocation {
            token_id: token.id,
            token_number: token.token_number,
            token_date,
            queue_position: token.queue_position,
        };

        day.tokens.push(token);
        self.index.write().await.insert(allocation.token_id, key);

        debug!(
            "Issued token #{} (position {}) for doctor {} on {}",
            allocation.token_number, allocation.queue_position, request.doctor_id, token_date
        );
        Ok(allocation)
    }

    async fn list(&self, doctor_id: Uuid, token_date: NaiveDate) -> Result<Vec<Token>, TokenQueueError> {
        let Some(queue) = self.existing_queue(&QueueKey::new(doctor_id, token_date)).await else {
            return Ok(Vec::new());
        };

        let day = queue.lock().await;
        let mut tokens = day.tokens.clone();
        tokens.sort_by_key(|t| t.token_number);
        Ok(tokens)
    }

    async fn mark_complete(&self, token_id: Uuid) -> Result<Token, TokenQueueError> {
        let key = self
            .index
            .read()
            .await
            .get(&token_id)
            .copied()
            .ok_or(TokenQueueError::NotFound(token_id))?;

        let queue = self
            .existing_queue(&key)
            .await
            .ok_or(TokenQueueError::NotFound(token_id))?;
        let mut day = queue.lock().await;

        let token = day
            .tokens
            .iter_mut()
            .find(|t| t.id == token_id)
            .ok_or(TokenQueueError::NotFound(token_id))?;

        if !token.status.can_transition_to(&TokenStatus::Completed) {
            return Err(TokenQueueError::InvalidTransition {
                from: token.status,
                to: TokenStatus::Completed,
            });
        }

        token.status = TokenStatus::Completed;
        Ok(token.clone())
    }
}
