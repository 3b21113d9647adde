//! In-Memory Repository Implementations
//!
//! Thread-safe, in-memory implementation of [`SessionRepository`].
//!
//! # Limitations
//!
//! - Sessions are lost on restart
//! - Not shared across multiple instances

use crate::domain::ml::prediction::PredictionResponse;
use crate::domain::session::{SessionRecord, SessionRepository};
use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<Uuid, SessionRecord>>>,
    ttl: Duration,
}

impl InMemorySessionRepository {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Applies `apply` to a live session while holding the write lock
    async fn update<F>(&self, id: Uuid, apply: F) -> Result<()>
    where
        F: FnOnce(&mut SessionRecord) + Send,
    {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(record) if !record.is_expired(Utc::now()) => {
                apply(record);
                Ok(())
            }
            _ => bail!("Session {} does not exist", id),
        }
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new(Duration::hours(1))
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self) -> Result<SessionRecord> {
        let record = SessionRecord::new(Utc::now(), self.ttl);
        self.sessions
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<SessionRecord>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(&id)
            .filter(|record| !record.is_expired(Utc::now()))
            .cloned())
    }

    async fn set_patient_name(&self, id: Uuid, name: String) -> Result<()> {
        self.update(id, |record| record.patient_name = Some(name)).await
    }

    async fn record_prediction(
        &self,
        id: Uuid,
        patient_data: Option<Map<String, Value>>,
        prediction: PredictionResponse,
    ) -> Result<()> {
        self.update(id, |record| {
            record.patient_data = patient_data;
            record.prediction = Some(prediction);
        })
        .await
    }

    async fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| !record.is_expired(now));
        Ok(before - sessions.len())
    }
}
