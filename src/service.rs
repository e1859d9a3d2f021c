//! # Lookup Service
//!
//! Wraps the analytics source, caches the project table, and turns raw rows
//! into `Card`s.
//!
//! ## Caching
//! - Project table and derived user list are fetched once and reused for
//!   the process lifetime
//! - `/refresh-cache` evicts both; the next access re-fetches
//! - Failed fetches are not cached, so a flaky upstream only costs a retry
//!
//! ## Failure policy
//! Every upstream fetch is best-effort: errors are logged and collapsed
//! into "not found" / empty. The column layout upstream is not stable, so
//! a shape mismatch is treated as absence, not as a hard error.
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::warn;

use crate::{
    analytics::AnalyticsSource,
    models::{Card, Record},
    normalize::{self, DATE_COLUMNS, USER_MATCH_COLUMNS},
};

pub struct PadService {
    source: Arc<dyn AnalyticsSource>,
    projects_cache: RwLock<Option<Vec<Record>>>,
    users_cache: RwLock<Option<Vec<String>>>,
}

impl PadService {
    pub fn new(source: Arc<dyn AnalyticsSource>) -> Self {
        Self {
            source,
            projects_cache: RwLock::new(None),
            users_cache: RwLock::new(None),
        }
    }

    /// The full project table, memoized.
    pub async fn get_projects(&self) -> Vec<Record> {
        if let Some(projects) = self.projects_cache.read().await.clone() {
            return projects;
        }

        match self.source.list_projects().await {
            Ok(projects) => {
                *self.projects_cache.write().await = Some(projects.clone());
                projects
            }
            Err(e) => {
                warn!("Error fetching projects: {e}");
                Vec::new()
            }
        }
    }

    /// Distinct usernames from the project table, sorted. Empty when the
    /// table has no `user_name` column.
    pub async fn get_users(&self) -> Vec<String> {
        if let Some(users) = self.users_cache.read().await.clone() {
            return users;
        }

        let projects = self.get_projects().await;

        let mut users: Vec<String> = projects
            .iter()
            .filter_map(|project| project.get("user_name"))
            .filter(|value| !value.is_null())
            .map(normalize::value_to_string)
            .collect();
        users.sort();
        users.dedup();

        *self.users_cache.write().await = Some(users.clone());
        users
    }

    /// Project names for the landing form, newest project first.
    pub async fn project_names(&self) -> Vec<String> {
        let mut projects = self.get_projects().await;
        projects.sort_by(|a, b| {
            normalize::pick_i64(b, &["id"]).cmp(&normalize::pick_i64(a, &["id"]))
        });

        projects
            .iter()
            .filter_map(|project| project.get("project_name"))
            .filter(|value| !value.is_null())
            .map(normalize::value_to_string)
            .collect()
    }

    /// Most recent card submitted by `username`, matched case-insensitively.
    /// Scoped to one project when `project_name` is given, otherwise every
    /// project's cards are scanned.
    pub async fn get_latest_card_by_user(
        &self,
        username: &str,
        project_name: Option<&str>,
    ) -> Option<Card> {
        let mut cards = match project_name {
            Some(project) => match self.source.project_cards(project).await {
                Ok(cards) => cards,
                Err(e) => {
                    warn!("Error fetching cards: {e}");
                    return None;
                }
            },
            None => self.all_project_cards().await?,
        };

        if cards.is_empty() {
            return None;
        }

        let user_col = find_column(&cards, USER_MATCH_COLUMNS)?;

        let needle = username.to_lowercase();
        cards.retain(|row| {
            row.get(user_col)
                .and_then(Value::as_str)
                .is_some_and(|name| name.to_lowercase() == needle)
        });

        if cards.is_empty() {
            return None;
        }

        sort_newest_first(&mut cards);
        Some(normalize::card_from_record(&cards[0]))
    }

    /// One card fetched directly by id.
    pub async fn get_card_by_id(&self, card_id: i64) -> Option<Card> {
        match self.source.card(card_id).await {
            Ok(record) => record.as_ref().map(normalize::card_from_record),
            Err(e) => {
                warn!("Error fetching card {card_id}: {e}");
                None
            }
        }
    }

    /// Up to `limit` most recent cards in a project, newest first.
    pub async fn get_recent_cards_in_project(&self, project_name: &str, limit: usize) -> Vec<Card> {
        let mut cards = match self.source.project_cards(project_name).await {
            Ok(cards) => cards,
            Err(e) => {
                warn!("Error fetching recent cards: {e}");
                return Vec::new();
            }
        };

        sort_newest_first(&mut cards);

        cards
            .iter()
            .take(limit)
            .map(normalize::card_from_record)
            .collect()
    }

    /// Most recent single card in a project.
    pub async fn get_latest_card_in_project(&self, project_name: &str) -> Option<Card> {
        let mut cards = match self.source.project_cards(project_name).await {
            Ok(cards) => cards,
            Err(e) => {
                warn!("Error fetching latest card in project: {e}");
                return None;
            }
        };

        if cards.is_empty() {
            return None;
        }

        sort_newest_first(&mut cards);
        Some(normalize::card_from_record(&cards[0]))
    }

    /// Evict both memoized collections. The next access re-fetches.
    pub async fn clear_cache(&self) {
        *self.projects_cache.write().await = None;
        *self.users_cache.write().await = None;
    }

    /// Every project's cards concatenated. A single project failing to
    /// fetch does not sink the whole scan.
    async fn all_project_cards(&self) -> Option<Vec<Record>> {
        let projects = self.get_projects().await;
        let project_ids: Vec<i64> = projects
            .iter()
            .filter_map(|project| normalize::pick_i64(project, &["id"]))
            .collect();

        let mut all_cards = Vec::new();
        for project_id in project_ids {
            match self.source.project_cards(&project_id.to_string()).await {
                Ok(cards) => all_cards.extend(cards),
                Err(_) => continue,
            }
        }

        if all_cards.is_empty() {
            None
        } else {
            Some(all_cards)
        }
    }
}

/// First candidate column present in any of the rows.
fn find_column<'a>(rows: &[Record], candidates: &'a [&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .find(|col| rows.iter().any(|row| row.contains_key(*col)))
}

fn sort_newest_first(rows: &mut [Record]) {
    if let Some(date_col) = find_column(rows, DATE_COLUMNS) {
        // ISO-8601 strings order lexicographically, missing dates sink to the end
        rows.sort_by(|a, b| date_value(b, date_col).cmp(date_value(a, date_col)));
    }
}

fn date_value<'a>(row: &'a Record, col: &str) -> &'a str {
    row.get(col).and_then(Value::as_str).unwrap_or("")
}
