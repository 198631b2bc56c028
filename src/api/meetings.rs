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
use crate::models::meeting::{
    CreateMeetingData, Meeting, MeetingMode, Participant, UpdateMeetingData,
    DEFAULT_MEETING_TYPE,
};

#[derive(Debug, Serialize)]
pub struct MeetingResponse {
    #[serde(rename = "_id")]
    pub key: Uuid,
    #[serde(flatten)]
    pub meeting: Meeting,
    pub date_time: Option<String>,
    pub attendee_count: usize,
    pub participants: Vec<Participant>,
}

impl MeetingResponse {
    fn new(meeting: Meeting, participants: Vec<Participant>) -> Self {
        Self {
            key: meeting.id,
            date_time: meeting.date_time(),
            attendee_count: participants.len(),
            participants,
            meeting,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateMeetingRequest {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub meeting_type: Option<String>,
    pub meeting_mode: Option<MeetingMode>,
    pub meet_link: Option<String>,
    pub fee: Option<f64>,
    pub organizer_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMeetingRequest {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub meeting_type: Option<String>,
    pub meeting_mode: Option<MeetingMode>,
    pub meet_link: Option<String>,
    pub fee: Option<f64>,
    pub organizer_id: Option<Uuid>,
}

fn not_found() -> AppError {
    AppError::NotFound("Meeting not found".to_string())
}

fn validate_fee(fee: f64) -> Result<f64> {
    if fee.is_finite() && fee >= 0.0 {
        Ok(fee)
    } else {
        Err(AppError::Validation("fee cannot be negative".to_string()))
    }
}

async fn list_meetings(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<MeetingResponse>>> {
    let meetings = Meeting::list(&state.pool).await?;
    let ids: Vec<Uuid> = meetings.iter().map(|m| m.id).collect();

    let mut by_meeting: HashMap<Uuid, Vec<Participant>> = HashMap::new();
    for participant in Meeting::participants(&state.pool, &ids).await? {
        by_meeting
            .entry(participant.meeting_id)
            .or_default()
            .push(participant);
    }

    let response = meetings
        .into_iter()
        .map(|meeting| {
            let participants = by_meeting.remove(&meeting.id).unwrap_or_default();
            MeetingResponse::new(meeting, participants)
        })
        .collect();

    Ok(Json(response))
}

async fn get_meeting(
    State(state): State<AppState>,
    _auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MeetingResponse>> {
    let meeting = Meeting::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;
    let participants = Meeting::participants(&state.pool, &[id]).await?;

    Ok(Json(MeetingResponse::new(meeting, participants)))
}

async fn create_meeting(
    State(state): State<AppState>,
    AdminUser { user: admin }: AdminUser,
    AppJson(req): AppJson<CreateMeetingRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let title = required(req.title, "title")?;
    let date = req
        .date
        .ok_or_else(|| AppError::Validation("date is required".to_string()))?;
    let fee = validate_fee(req.fee.unwrap_or(0.0))?;

    let meeting = Meeting::create(
        &state.pool,
        CreateMeetingData {
            title,
            date,
            time: optional(req.time),
            location: optional(req.location),
            description: optional(req.description),
            meeting_type: optional(req.meeting_type)
                .unwrap_or_else(|| DEFAULT_MEETING_TYPE.to_string()),
            meeting_mode: req.meeting_mode.unwrap_or_default(),
            meet_link: optional(req.meet_link),
            fee,
            organized_by: Some(req.organizer_id.unwrap_or(admin.id)),
        },
    )
    .await?;

    tracing::info!(meeting_id = %meeting.id, created_by = %admin.id, "Meeting created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Meeting created successfully!", "id": meeting.id })),
    ))
}

async fn update_meeting(
    State(state): State<AppState>,
    AdminUser { user: admin }: AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateMeetingRequest>,
) -> Result<Json<Value>> {
    let title = match req.title {
        Some(title) if title.trim().is_empty() => {
            return Err(AppError::Validation("title cannot be blank".to_string()))
        }
        other => other.map(|t| t.trim().to_string()),
    };

    let data = UpdateMeetingData {
        title,
        date: req.date,
        time: req.time,
        location: req.location,
        description: req.description,
        meeting_type: optional(req.meeting_type),
        meeting_mode: req.meeting_mode,
        meet_link: req.meet_link,
        fee: req.fee.map(validate_fee).transpose()?,
        organized_by: req.organizer_id,
    };

    Meeting::update(&state.pool, id, data)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(meeting_id = %id, updated_by = %admin.id, "Meeting updated");

    Ok(Json(json!({ "message": "Meeting updated successfully" })))
}

async fn delete_meeting(
    State(state): State<AppState>,
    AdminUser { user: admin }: AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>> {
    if !Meeting::delete(&state.pool, id).await? {
        return Err(not_found());
    }

    tracing::info!(meeting_id = %id, deleted_by = %admin.id, "Meeting deleted");

    Ok(Json(json!({ "message": "Meeting deleted successfully" })))
}

async fn register(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>> {
    Meeting::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;

    if !Meeting::add_attendee(&state.pool, id, user.id).await? {
        return Err(AppError::Validation("Already registered".to_string()));
    }

    tracing::info!(meeting_id = %id, user_id = %user.id, "Registered for meeting");

    Ok(Json(json!({ "message": "Registered successfully" })))
}

async fn cancel(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>> {
    if !Meeting::remove_attendee(&state.pool, id, user.id).await? {
        return Err(AppError::Validation("Not registered".to_string()));
    }

    tracing::info!(meeting_id = %id, user_id = %user.id, "Meeting registration cancelled");

    Ok(Json(json!({ "message": "Registration cancelled" })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/meetings", get(list_meetings).post(create_meeting))
        .route(
            "/api/meetings/:id",
            get(get_meeting).put(update_meeting).delete(delete_meeting),
        )
        .route("/api/meetings/:id/register", post(register))
        .route("/api/meetings/:id/cancel", post(cancel))
}
