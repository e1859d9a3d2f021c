use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{Path, Query, State},
    response::{Html, IntoResponse},
};
use serde::Deserialize;
use serde_json::json;

use crate::{render, state::AppState};

const RECENT_CARD_LIMIT: usize = 3;

#[derive(Deserialize)]
pub struct SearchForm {
    project: String,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Deserialize)]
pub struct CheckNewerParams {
    project: String,
    current_id: i64,
}

pub async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let users = state.pad.get_users().await;
    let projects = state.pad.project_names().await;

    Html(render::index_page(&projects, &users))
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SearchForm>,
) -> Html<String> {
    let username = form
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());

    let (card, error_msg) = match username {
        Some(user) => (
            state
                .pad
                .get_latest_card_by_user(user, Some(&form.project))
                .await,
            format!(
                "No cards found for user '{user}' in project '{}'",
                form.project
            ),
        ),
        None => (
            state.pad.get_latest_card_in_project(&form.project).await,
            format!("No cards found in project '{}'", form.project),
        ),
    };

    let recent_cards = state
        .pad
        .get_recent_cards_in_project(&form.project, RECENT_CARD_LIMIT)
        .await;

    let error = if card.is_some() {
        None
    } else {
        Some(error_msg)
    };

    Html(render::card_result(
        card.as_ref(),
        username,
        error.as_deref(),
        &recent_cards,
    ))
}

pub async fn card_handler(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<i64>,
) -> Html<String> {
    let Some(card) = state.pad.get_card_by_id(card_id).await else {
        return Html(render::card_result(
            None,
            None,
            Some(&format!("Card {card_id} not found")),
            &[],
        ));
    };

    let recent_cards = state
        .pad
        .get_recent_cards_in_project(&card.project_name, RECENT_CARD_LIMIT)
        .await;

    Html(render::card_result(Some(&card), None, None, &recent_cards))
}

pub async fn check_newer_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CheckNewerParams>,
) -> Html<String> {
    let latest = state.pad.get_latest_card_in_project(&params.project).await;

    match latest {
        Some(card) if card.id != params.current_id => {
            Html(render::newer_alert(&params.project, card.id))
        }
        _ => Html(String::new()),
    }
}

pub async fn refresh_cache_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.pad.clear_cache().await;

    Json(json!({ "status": "ok", "message": "Cache cleared" }))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::{config::Config, fake_source::FakeSource, service::PadService};

    fn state_with(source: Arc<FakeSource>) -> Arc<AppState> {
        Arc::new(AppState {
            config: Config {
                port: 8000,
                api_url: "http://localhost".to_string(),
            },
            pad: PadService::new(source),
        })
    }

    fn card_row(id: i64, date: &str) -> crate::models::Record {
        match json!({
            "id": id,
            "user_name": "tech1",
            "date_of_creation": date,
            "project_name": "Demo",
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_check_newer_alerts_on_different_id() {
        let source = Arc::new(FakeSource::default());
        source.cards.lock().await.insert(
            "Demo".to_string(),
            vec![card_row(8, "2024-05-01T00:00:00Z")],
        );
        let state = state_with(source);

        let Html(body) = check_newer_handler(
            State(state),
            Query(CheckNewerParams {
                project: "Demo".to_string(),
                current_id: 5,
            }),
        )
        .await;

        assert!(body.contains("Demo"));
        assert!(body.contains('8'));
    }

    #[tokio::test]
    async fn test_check_newer_empty_when_id_matches() {
        let source = Arc::new(FakeSource::default());
        source.cards.lock().await.insert(
            "Demo".to_string(),
            vec![card_row(8, "2024-05-01T00:00:00Z")],
        );
        let state = state_with(source);

        let Html(body) = check_newer_handler(
            State(state),
            Query(CheckNewerParams {
                project: "Demo".to_string(),
                current_id: 8,
            }),
        )
        .await;

        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_check_newer_empty_when_project_has_no_cards() {
        let state = state_with(Arc::new(FakeSource::default()));

        let Html(body) = check_newer_handler(
            State(state),
            Query(CheckNewerParams {
                project: "Demo".to_string(),
                current_id: 1,
            }),
        )
        .await;

        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_search_reports_missing_user() {
        let state = state_with(Arc::new(FakeSource::default()));

        let Html(body) = search_handler(
            State(state),
            Form(SearchForm {
                project: "Demo".to_string(),
                username: Some("tech1".to_string()),
            }),
        )
        .await;

        assert!(body.contains("No cards found for user &#39;tech1&#39; in project &#39;Demo&#39;"));
    }

    #[tokio::test]
    async fn test_search_blank_username_falls_back_to_project() {
        let source = Arc::new(FakeSource::default());
        source.cards.lock().await.insert(
            "Demo".to_string(),
            vec![card_row(4, "2024-05-01T00:00:00Z")],
        );
        let state = state_with(source);

        let Html(body) = search_handler(
            State(state),
            Form(SearchForm {
                project: "Demo".to_string(),
                username: Some("   ".to_string()),
            }),
        )
        .await;

        assert!(body.contains("Card #4"));
    }

    #[tokio::test]
    async fn test_card_handler_not_found() {
        let state = state_with(Arc::new(FakeSource::default()));

        let Html(body) = card_handler(State(state), Path(77)).await;

        assert!(body.contains("Card 77 not found"));
    }
}
