use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    analytics::AnalyticsSource,
    error::AnalyticsError,
    models::Record,
};

/// In-memory stand-in for the analytics API. Counts project-list fetches so
/// cache behavior is observable.
#[derive(Default)]
pub struct FakeSource {
    pub projects: Mutex<Vec<Record>>,
    pub cards: Mutex<HashMap<String, Vec<Record>>>,
    pub cards_by_id: Mutex<HashMap<i64, Record>>,
    pub list_calls: AtomicU64,
    pub fail: bool,
}

impl FakeSource {
    pub fn list_call_count(&self) -> u64 {
        self.list_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AnalyticsSource for FakeSource {
    async fn list_projects(&self) -> Result<Vec<Record>, AnalyticsError> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail {
            return Err(AnalyticsError::UnexpectedPayload);
        }
        Ok(self.projects.lock().await.clone())
    }

    async fn project_cards(&self, project: &str) -> Result<Vec<Record>, AnalyticsError> {
        if self.fail {
            return Err(AnalyticsError::UnexpectedPayload);
        }
        Ok(self
            .cards
            .lock()
            .await
            .get(project)
            .cloned()
            .unwrap_or_default())
    }

    async fn card(&self, card_id: i64) -> Result<Option<Record>, AnalyticsError> {
        if self.fail {
            return Err(AnalyticsError::UnexpectedPayload);
        }
        Ok(self.cards_by_id.lock().await.get(&card_id).cloned())
    }
}
