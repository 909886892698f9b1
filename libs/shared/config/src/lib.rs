use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_VAR: &str = "SUPABASE_ANON_PUBLIC_KEY";

/// Where doctors and tokens are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Supabase,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            "supabase" => Ok(StorageBackend::Supabase),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_key: Option<String>,
    pub storage_backend: StorageBackend,
    pub clinic_utc_offset_minutes: i32,
    pub allocation_max_attempts: u32,
    pub allocation_retry_base_ms: u64,
    pub change_channel_capacity: usize,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_service_key: None,
            storage_backend: StorageBackend::Memory,
            clinic_utc_offset_minutes: 0,
            allocation_max_attempts: 3,
            allocation_retry_base_ms: 25,
            change_channel_capacity: 256,
            server_port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            supabase_url: env::var(SUPABASE_URL_VAR)
                .unwrap_or_else(|_| {
                    warn!("{} not set, using empty value", SUPABASE_URL_VAR);
                    String::new()
                }),
            supabase_anon_key: env::var(SUPABASE_ANON_KEY_VAR)
                .unwrap_or_else(|_| {
                    warn!("{} not set, using empty value", SUPABASE_ANON_KEY_VAR);
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            storage_backend: parse_var("STORAGE_BACKEND", defaults.storage_backend),
            clinic_utc_offset_minutes: parse_var("CLINIC_UTC_OFFSET_MINUTES", defaults.clinic_utc_offset_minutes)
                .clamp(-MAX_UTC_OFFSET_MINUTES, MAX_UTC_OFFSET_MINUTES),
            allocation_max_attempts: parse_var("ALLOCATION_MAX_ATTEMPTS", defaults.allocation_max_attempts).max(1),
            allocation_retry_base_ms: parse_var("ALLOCATION_RETRY_BASE_MS", defaults.allocation_retry_base_ms),
            change_channel_capacity: parse_var("CHANGE_CHANNEL_CAPACITY", defaults.change_channel_capacity).max(1),
            server_port: parse_var("SERVER_PORT", defaults.server_port),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing Supabase environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        match self.storage_backend {
            StorageBackend::Memory => true,
            StorageBackend::Supabase => {
                !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
            }
        }
    }

    /// Names the variables the selected backend still needs.
    pub fn ensure_configured(&self) -> Result<(), String> {
        if self.is_configured() {
            return Ok(());
        }

        Err(format!(
            "{} and {} are required for the supabase backend",
            SUPABASE_URL_VAR, SUPABASE_ANON_KEY_VAR
        ))
    }
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("{} has invalid value {:?} ({}), using default {:?}", name, raw, e, default);
            default
        }),
        Err(_) => default,
    }
}
