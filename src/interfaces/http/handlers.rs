use super::AppState;
use super::pages;
use super::session_cookie::{session_id, set_session_cookie};
use crate::domain::errors::InferenceError;
use crate::domain::session::{DEFAULT_PATIENT_NAME, SessionRecord};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::{Value, json};
use tracing::{error, info, warn};

/// Failure surfaced as `{"error": message}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        error!(error = %err, "Session store failure");
        ApiError::internal("Session store unavailable")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Existing live session for this request, or a new one (flagged `true`)
async fn load_or_create_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(SessionRecord, bool), ApiError> {
    if let Some(id) = session_id(headers) {
        if let Some(record) = state.sessions.get(id).await? {
            return Ok((record, false));
        }
    }
    Ok((state.sessions.create().await?, true))
}

async fn existing_session(state: &AppState, headers: &HeaderMap) -> Option<SessionRecord> {
    let id = session_id(headers)?;
    match state.sessions.get(id).await {
        Ok(record) => record,
        Err(e) => {
            error!(error = %e, "Failed to read session");
            None
        }
    }
}

fn with_cookie(mut response: Response, record: &SessionRecord, is_new: bool) -> Response {
    if is_new {
        set_session_cookie(&mut response, record.id);
    }
    response
}

pub async fn index() -> Html<String> {
    Html(pages::patient_name_page())
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn assessment(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let name = existing_session(&state, &headers)
        .await
        .map(|record| record.display_name().to_string())
        .unwrap_or_else(|| DEFAULT_PATIENT_NAME.to_string());
    Html(pages::assessment_page(&name))
}

pub async fn set_patient(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Malformed JSON body: {}", e)))?;
    let name = payload
        .get("patient_name")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PATIENT_NAME)
        .to_string();

    let (record, is_new) = load_or_create_session(&state, &headers).await?;
    state.sessions.set_patient_name(record.id, name).await?;

    info!(session = %record.id, "Patient registered");
    Ok(with_cookie(
        Json(json!({ "success": true })).into_response(),
        &record,
        is_new,
    ))
}

pub async fn predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Malformed JSON body: {}", e)))?;

    let result = state.inference.classify_json(&payload).map_err(|e| {
        warn!(error = %e, "Prediction rejected");
        e
    })?;
    let response = result.to_response();

    let (record, is_new) = load_or_create_session(&state, &headers).await?;
    state
        .sessions
        .record_prediction(record.id, payload.as_object().cloned(), response.clone())
        .await?;

    info!(
        session = %record.id,
        prediction = response.prediction,
        probability = response.probability,
        risk_level = %response.risk_level,
        "Prediction served"
    );
    Ok(with_cookie(Json(response).into_response(), &record, is_new))
}

pub async fn results(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let record = existing_session(&state, &headers).await;
    Html(pages::results_page(record.as_ref()))
}
