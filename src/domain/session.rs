//! Short-lived server-side session state for the name -> form -> result flow.

use crate::domain::ml::prediction::PredictionResponse;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

pub const DEFAULT_PATIENT_NAME: &str = "Unknown Patient";

/// One browser session, keyed by an opaque id
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: Uuid,
    pub patient_name: Option<String>,
    pub patient_data: Option<Map<String, Value>>,
    pub prediction: Option<PredictionResponse>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_name: None,
            patient_data: None,
            prediction: None,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn display_name(&self) -> &str {
        self.patient_name.as_deref().unwrap_or(DEFAULT_PATIENT_NAME)
    }
}

/// Repository for session records
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Create and store a fresh, empty session
    async fn create(&self) -> Result<SessionRecord>;

    /// Fetch a live session; expired sessions are treated as absent
    async fn get(&self, id: Uuid) -> Result<Option<SessionRecord>>;

    /// Set the patient name on a live session, leaving other fields untouched
    async fn set_patient_name(&self, id: Uuid, name: String) -> Result<()>;

    /// Store the submitted inputs and their prediction on a live session,
    /// leaving the patient name untouched
    async fn record_prediction(
        &self,
        id: Uuid,
        patient_data: Option<Map<String, Value>>,
        prediction: PredictionResponse,
    ) -> Result<()>;

    /// Drop expired sessions, returning how many were removed
    async fn purge_expired(&self) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let record = SessionRecord::new(now, Duration::seconds(60));
        assert!(!record.is_expired(now));
        assert!(!record.is_expired(now + Duration::seconds(59)));
        assert!(record.is_expired(now + Duration::seconds(60)));
    }

    #[test]
    fn test_display_name_default() {
        let mut record = SessionRecord::new(Utc::now(), Duration::seconds(1));
        assert_eq!(record.display_name(), DEFAULT_PATIENT_NAME);
        record.patient_name = Some("Ada".to_string());
        assert_eq!(record.display_name(), "Ada");
    }
}
