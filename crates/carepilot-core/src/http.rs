use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::{
    content::{self, AppointmentSlot},
    places::{GeoPoint, Place},
    registry::SessionRegistry,
    session::ChatSession,
    types::{ChatHistoryItem, Identity, Message, ReminderDraft, SessionReply},
};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
}

#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    #[serde(default)]
    pub identity: Option<Identity>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectOptionRequest {
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct SymptomCheckRequest {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentRequest {
    pub slot_id: u32,
}

#[derive(Debug, Deserialize)]
pub struct HealthTipRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ProviderSelectRequest {
    pub name: String,
    pub category: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Serialize)]
struct SessionOpened {
    session_id: Uuid,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct ClosedResponse {
    closed: bool,
}

#[derive(Serialize)]
struct SuggestionResponse {
    suggestion: Option<String>,
}

#[derive(Serialize)]
struct LoginResponse {
    identity: Option<Identity>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/login", get(remembered_login))
        .route("/api/slots", get(list_slots))
        .route("/api/sessions", post(open_session))
        .route("/api/sessions/{id}", delete(close_session))
        .route(
            "/api/sessions/{id}/messages",
            get(list_messages).post(send_message),
        )
        .route("/api/sessions/{id}/options", post(select_option))
        .route("/api/sessions/{id}/symptom-check", post(complete_symptom_check))
        .route("/api/sessions/{id}/appointment", post(complete_appointment))
        .route("/api/sessions/{id}/reminder", post(complete_reminder))
        .route("/api/sessions/{id}/health-tip", post(complete_health_tip))
        .route("/api/sessions/{id}/provider", post(select_provider))
        .route("/api/sessions/{id}/cancel", post(cancel_mode))
        .route("/api/sessions/{id}/suggestion", get(suggest_reply))
        .route("/api/sessions/{id}/providers", get(nearby_providers))
        .route("/api/sessions/{id}/history", get(list_history))
        .route("/api/sessions/{id}/history/{item_id}", post(load_history_item))
        .route(
            "/api/sessions/{id}/history-panel",
            post(open_history_panel).delete(close_history_panel),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> &'static str {
    "CarePilot API"
}

async fn health() -> &'static str {
    "ok"
}

async fn remembered_login(State(state): State<AppState>) -> Json<LoginResponse> {
    Json(LoginResponse {
        identity: state.registry.remembered_login().await,
    })
}

async fn list_slots() -> Json<&'static [AppointmentSlot]> {
    Json(content::APPOINTMENT_SLOTS)
}

async fn open_session(
    State(state): State<AppState>,
    Json(request): Json<OpenSessionRequest>,
) -> Json<SessionOpened> {
    let (session_id, session) = state.registry.open(request.identity).await;
    Json(SessionOpened {
        session_id,
        messages: session.transcript().await,
    })
}

async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClosedResponse>, (StatusCode, String)> {
    if state.registry.close(id).await {
        Ok(Json(ClosedResponse { closed: true }))
    } else {
        Err(unknown_session(id))
    }
}

async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, (StatusCode, String)> {
    let session = session_or_404(&state, id).await?;
    Ok(Json(session.transcript().await))
}

async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SessionReply>, (StatusCode, String)> {
    let session = session_or_404(&state, id).await?;
    Ok(Json(session.send_text(&request.content).await))
}

async fn select_option(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectOptionRequest>,
) -> Result<Json<SessionReply>, (StatusCode, String)> {
    let session = session_or_404(&state, id).await?;
    Ok(Json(session.select_option(&request.label).await))
}

async fn complete_symptom_check(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SymptomCheckRequest>,
) -> Result<Json<SessionReply>, (StatusCode, String)> {
    let session = session_or_404(&state, id).await?;
    Ok(Json(session.complete_symptom_check(&request.description).await))
}

async fn complete_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AppointmentRequest>,
) -> Result<Json<SessionReply>, (StatusCode, String)> {
    let session = session_or_404(&state, id).await?;
    Ok(Json(session.complete_appointment(request.slot_id).await))
}

async fn complete_reminder(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<ReminderDraft>,
) -> Result<Json<SessionReply>, (StatusCode, String)> {
    let session = session_or_404(&state, id).await?;
    Ok(Json(session.complete_reminder(draft).await))
}

async fn complete_health_tip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<HealthTipRequest>,
) -> Result<Json<SessionReply>, (StatusCode, String)> {
    let session = session_or_404(&state, id).await?;
    Ok(Json(session.complete_health_tip(&request.content).await))
}

async fn select_provider(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ProviderSelectRequest>,
) -> Result<Json<SessionReply>, (StatusCode, String)> {
    let session = session_or_404(&state, id).await?;
    Ok(Json(
        session
            .complete_nearby(&request.name, &request.category, &request.address)
            .await,
    ))
}

async fn cancel_mode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionReply>, (StatusCode, String)> {
    let session = session_or_404(&state, id).await?;
    Ok(Json(session.cancel_mode().await))
}

async fn suggest_reply(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuggestionResponse>, (StatusCode, String)> {
    let session = session_or_404(&state, id).await?;
    Ok(Json(SuggestionResponse {
        suggestion: session.suggest_reply().await,
    }))
}

async fn nearby_providers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<Vec<Place>>, (StatusCode, String)> {
    let session = session_or_404(&state, id).await?;
    let origin = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
        _ => None,
    };
    Ok(Json(session.nearby_providers(origin).await))
}

async fn list_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChatHistoryItem>>, (StatusCode, String)> {
    let session = session_or_404(&state, id).await?;
    Ok(Json(session.history_items().await))
}

async fn load_history_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<SessionReply>, (StatusCode, String)> {
    let session = session_or_404(&state, id).await?;
    let reply = session
        .load_history_item(item_id)
        .await
        .map_err(|error| (StatusCode::NOT_FOUND, error.to_string()))?;
    Ok(Json(reply))
}

async fn open_history_panel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionReply>, (StatusCode, String)> {
    let session = session_or_404(&state, id).await?;
    Ok(Json(session.open_history().await))
}

async fn close_history_panel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionReply>, (StatusCode, String)> {
    let session = session_or_404(&state, id).await?;
    Ok(Json(session.close_history().await))
}

async fn session_or_404(
    state: &AppState,
    id: Uuid,
) -> Result<Arc<ChatSession>, (StatusCode, String)> {
    state.registry.get(id).await.ok_or_else(|| unknown_session(id))
}

fn unknown_session(id: Uuid) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("unknown session {id}"))
}
