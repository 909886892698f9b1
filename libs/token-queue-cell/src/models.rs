use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    Active,
    Completed,
}

impl TokenStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TokenStatus::Completed)
    }

    pub fn can_transition_to(&self, target: &TokenStatus) -> bool {
        matches!((self, target), (TokenStatus::Active, TokenStatus::Completed))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStatus::Active => "active",
            TokenStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One patient's ticket in a doctor's queue for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_name: String,
    pub patient_phone: String,
    /// Dense 1-based sequence per `(doctor_id, token_date)`.
    pub token_number: u32,
    pub token_date: NaiveDate,
    /// Open tokens ahead of this one at issuance, plus one. Never renumbered.
    pub queue_position: u32,
    pub status: TokenStatus,
    pub created_at: DateTime<Utc>,
}

/// Numbering scope: sequences never interact across keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueKey {
    pub doctor_id: Uuid,
    pub token_date: NaiveDate,
}

impl QueueKey {
    pub fn new(doctor_id: Uuid, token_date: NaiveDate) -> Self {
        Self { doctor_id, token_date }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocateTokenRequest {
    pub doctor_id: Uuid,
    pub patient_name: String,
    pub patient_phone: String,
}

/// Trimmed and validated allocation input handed to a ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRequest {
    pub doctor_id: Uuid,
    pub patient_name: String,
    pub patient_phone: String,
}

/// What the allocation step assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAllocation {
    pub token_id: Uuid,
    pub token_number: u32,
    pub token_date: NaiveDate,
    pub queue_position: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenReceipt {
    pub token_id: Uuid,
    pub token_number: u32,
    pub token_date: NaiveDate,
    pub queue_position: u32,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub patient_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounts {
    pub active: usize,
    pub completed: usize,
    pub total: usize,
}

/// A doctor's queue for one day, split by status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueView {
    pub doctor_id: Uuid,
    pub token_date: NaiveDate,
    pub active: Vec<Token>,
    pub completed: Vec<Token>,
    pub counts: QueueCounts,
}

impl QueueView {
    /// Partition tokens already ordered by `token_number`.
    pub fn from_tokens(doctor_id: Uuid, token_date: NaiveDate, tokens: Vec<Token>) -> Self {
        let total = tokens.len();
        let (completed, active): (Vec<Token>, Vec<Token>) = tokens
            .into_iter()
            .partition(|token| token.status.is_terminal());

        let counts = QueueCounts {
            active: active.len(),
            completed: completed.len(),
            total,
        };

        Self {
            doctor_id,
            token_date,
            active,
            completed,
            counts,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueQuery {
    pub doctor_id: Uuid,
    pub date: Option<NaiveDate>,
}
