#![cfg(feature = "std")]

//! Read-only access to finished match records, as consumed by profile and
//! history views. Storage itself lives elsewhere; this module fixes the
//! contract and ships an in-memory store.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::config::RECENT_MATCHES_LIMIT;

/// One participant as recorded at the end of a match.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchPlayer {
    pub uid: String,
    pub name: String,
    /// Rating after the match.
    pub rating: f64,
    /// Rating variation caused by the match.
    pub rv: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingTrend {
    Gain,
    Unchanged,
    Loss,
}

impl MatchPlayer {
    pub fn display_rating(&self) -> i64 {
        self.rating.round() as i64
    }

    pub fn rating_trend(&self) -> RatingTrend {
        if self.rv > 0.0 {
            RatingTrend::Gain
        } else if self.rv < 0.0 {
            RatingTrend::Loss
        } else {
            RatingTrend::Unchanged
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchRecord {
    pub id: String,
    pub black: MatchPlayer,
    pub white: MatchPlayer,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl MatchRecord {
    pub fn involves(&self, uid: &str) -> bool {
        self.black.uid == uid || self.white.uid == uid
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{collection}/{id} not found")]
    NotFound { collection: &'static str, id: String },
}

#[async_trait::async_trait]
pub trait MatchStore: Send + Sync {
    /// Fetch one record; a missing id is `StoreError::NotFound`.
    async fn get_by_id(&self, id: &str) -> Result<MatchRecord, StoreError>;

    /// Most recent records where `uid` played either colour, newest first.
    async fn list_by_player_id(&self, uid: &str) -> Result<Vec<MatchRecord>, StoreError>;
}

#[derive(Default)]
pub struct InMemoryMatchStore {
    records: RwLock<HashMap<String, MatchRecord>>,
}

impl InMemoryMatchStore {
    pub const COLLECTION: &'static str = "matches";

    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record under its id.
    pub fn insert(&self, record: MatchRecord) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.insert(record.id.clone(), record);
    }
}

#[async_trait::async_trait]
impl MatchStore for InMemoryMatchStore {
    async fn get_by_id(&self, id: &str) -> Result<MatchRecord, StoreError> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.get(id).cloned().ok_or_else(|| StoreError::NotFound {
            collection: Self::COLLECTION,
            id: id.to_owned(),
        })
    }

    async fn list_by_player_id(&self, uid: &str) -> Result<Vec<MatchRecord>, StoreError> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        let mut found: Vec<MatchRecord> = records
            .values()
            .filter(|r| r.involves(uid))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        found.truncate(RECENT_MATCHES_LIMIT);
        Ok(found)
    }
}
