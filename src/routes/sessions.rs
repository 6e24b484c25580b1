use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use tracing::info;
use uuid::Uuid;

use crate::models::{AppState, CreateSessionResponse, SidebarResponse};
use crate::routes::ui::render_transcript;
use crate::session::SessionView;
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(end_session))
        .route("/api/sessions/{id}/sidebar", post(toggle_sidebar))
        .route("/api/sessions/{id}/transcript", get(get_transcript))
        .with_state(state)
}

async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let (session_id, _) = state.sessions.create().await;
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionView>> {
    let handle = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {}", id)))?;
    let view = handle.lock().await.view();
    Ok(Json(view))
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.sessions.end(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {}", id)))
    }
}

async fn toggle_sidebar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Json<SidebarResponse> {
    let handle = state.sessions.get_or_create(id).await;
    let sidebar = handle.lock().await.toggle_sidebar();
    info!(session_id = %id, sidebar = ?sidebar, "Sidebar toggled");
    Json(SidebarResponse {
        session_id: id,
        sidebar,
    })
}

async fn get_transcript(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Html<String>> {
    let handle = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {}", id)))?;
    let session = handle.lock().await;
    Ok(Html(render_transcript(&session)))
}
