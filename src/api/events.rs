use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::api::extract::{optional, required, AppJson, AppPath};
use crate::api::middleware::{AdminUser, AppState, AuthUser};
use crate::error::{AppError, Result};
use crate::models::event::{CreateEventData, Event};
use crate::services::mailer;

#[derive(Debug, Serialize)]
pub struct EventResponse {
    #[serde(rename = "_id")]
    pub key: Uuid,
    #[serde(flatten)]
    pub event: Event,
    pub registered_members: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

fn not_found() -> AppError {
    AppError::NotFound("Event not found".to_string())
}

async fn with_registrations(state: &AppState, events: Vec<Event>) -> Result<Vec<EventResponse>> {
    let ids: Vec<Uuid> = events.iter().map(|e| e.id).collect();

    let mut registered: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (event_id, user_id) in Event::registrations(&state.pool, &ids).await? {
        registered.entry(event_id).or_default().push(user_id);
    }

    Ok(events
        .into_iter()
        .map(|event| EventResponse {
            key: event.id,
            registered_members: registered.remove(&event.id).unwrap_or_default(),
            event,
        })
        .collect())
}

async fn list_events(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<EventResponse>>> {
    let events = Event::list(&state.pool).await?;
    Ok(Json(with_registrations(&state, events).await?))
}

async fn get_event(
    State(state): State<AppState>,
    _auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<EventResponse>> {
    let event = Event::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;

    let mut events = with_registrations(&state, vec![event]).await?;
    events.pop().map(Json).ok_or_else(not_found)
}

async fn create_event(
    State(state): State<AppState>,
    AdminUser { user: admin }: AdminUser,
    AppJson(req): AppJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let title = required(req.title, "title")?;
    let date = req
        .date
        .ok_or_else(|| AppError::Validation("date is required".to_string()))?;

    let event = Event::create(
        &state.pool,
        CreateEventData {
            title,
            date,
            description: optional(req.description),
        },
    )
    .await?;

    tracing::info!(event_id = %event.id, created_by = %admin.id, "Event created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Event created successfully!", "id": event.id })),
    ))
}

async fn delete_event(
    State(state): State<AppState>,
    AdminUser { user: admin }: AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>> {
    if !Event::delete(&state.pool, id).await? {
        return Err(not_found());
    }

    tracing::info!(event_id = %id, deleted_by = %admin.id, "Event deleted");

    Ok(Json(json!({ "message": "Event deleted successfully" })))
}

/// Register the caller and send a confirmation email
async fn register(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>> {
    let event = Event::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;

    if !Event::add_attendee(&state.pool, id, user.id).await? {
        return Err(AppError::Validation("Already registered".to_string()));
    }

    tracing::info!(event_id = %id, user_id = %user.id, "Registered for event");

    state
        .mailer
        .dispatch(mailer::event_registration(user.email, &event.title));

    Ok(Json(json!({ "message": "Registered successfully" })))
}

async fn cancel(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>> {
    if !Event::remove_attendee(&state.pool, id, user.id).await? {
        return Err(AppError::Validation("Not registered".to_string()));
    }

    tracing::info!(event_id = %id, user_id = %user.id, "Event registration cancelled");

    Ok(Json(json!({ "message": "Registration cancelled" })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/events/:id", get(get_event).delete(delete_event))
        .route("/api/events/:id/register", post(register))
        .route("/api/events/:id/cancel", post(cancel))
}
