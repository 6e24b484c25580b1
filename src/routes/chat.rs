use axum::{
    extract::{Multipart, Path, State},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::agents::execute_turn;
use crate::documents::{load_document, Upload};
use crate::models::{AppState, FileSummary, TurnResponse};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/sessions/{id}/turns", post(post_turn))
        .with_state(state)
}

/// The multipart form of one turn
struct TurnForm {
    file_name: String,
    data: Bytes,
    message: Option<String>,
}

async fn read_turn_form(multipart: &mut Multipart) -> AppResult<TurnForm> {
    let mut file: Option<(String, Bytes)> = None;
    let mut message: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::InvalidRequest(format!("Failed to read file '{}': {}", name, e))
                })?;
                file = Some((name, data));
            }
            Some("message") => {
                let text = field.text().await.map_err(|e| {
                    AppError::InvalidRequest(format!("Failed to read message: {}", e))
                })?;
                message = Some(text);
            }
            other => {
                warn!(field = ?other, "Ignoring unexpected multipart field");
            }
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| AppError::InvalidRequest("Missing 'file' field".to_string()))?;
    if file_name.is_empty() {
        return Err(AppError::InvalidRequest("Uploaded file has no name".to_string()));
    }

    Ok(TurnForm {
        file_name,
        data,
        // A blank chat box submits nothing.
        message: message.filter(|m| !m.trim().is_empty()),
    })
}

/// Upload a file and optionally ask about it.
///
/// POST /api/sessions/{id}/turns
///
/// The file is extracted on every turn. Without a message nothing is
/// appended to the session.
///
/// The session lock is held for the whole model call, so a second turn for
/// the same session waits until the first one has its reply. Bound the wait
/// with `LLM_TIMEOUT_SECS`; other sessions are unaffected.
async fn post_turn(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<TurnResponse>> {
    let form = read_turn_form(&mut multipart).await?;
    info!(
        session_id = %session_id,
        file = %form.file_name,
        size = form.data.len(),
        has_message = form.message.is_some(),
        "Turn request received"
    );

    let upload = Upload::new(form.file_name, form.data)?;
    let name = upload.name().to_string();
    let kind = upload.kind();
    let size = upload.size();

    let stager = state.stager.clone();
    let document = tokio::task::spawn_blocking(move || load_document(upload, &stager))
        .await
        .map_err(|e| AppError::Internal(format!("Extraction task failed: {}", e)))??;

    let file = FileSummary {
        name,
        kind,
        size,
        characters: document.len(),
    };

    let Some(message) = form.message else {
        return Ok(Json(TurnResponse::validated(session_id, file)));
    };

    let handle = state.sessions.get_or_create(session_id).await;
    let mut session = handle.lock().await;
    let outcome = execute_turn(&mut session, &state.agent, &document, &message).await;

    Ok(Json(TurnResponse::answered(session_id, file, outcome)))
}
