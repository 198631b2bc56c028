use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::extract::{optional, required, AppJson, AppPath};
use crate::api::middleware::{AppState, AuthUser};
use crate::error::{AppError, Result};
use crate::models::learning_credit::{CreateLearningCreditData, LearningCredit, LearningSummary};

const DEFAULT_SOURCE: &str = "Other";

#[derive(Debug, Deserialize)]
pub struct CreateLearningRequest {
    pub topic: Option<String>,
    pub source: Option<String>,
    pub duration_hours: Option<f64>,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

fn validate_hours(hours: Option<f64>) -> Result<f64> {
    match hours {
        Some(h) if h.is_finite() && h > 0.0 => Ok(h),
        Some(_) => Err(AppError::Validation(
            "duration_hours must be greater than zero".to_string(),
        )),
        None => Err(AppError::Validation(
            "duration_hours is required".to_string(),
        )),
    }
}

async fn create_credit(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppJson(req): AppJson<CreateLearningRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let topic = required(req.topic, "topic")?;
    let duration_hours = validate_hours(req.duration_hours)?;

    let credit = LearningCredit::create(
        &state.pool,
        CreateLearningCreditData {
            member_id: user.id,
            topic,
            source: optional(req.source).unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            duration_hours,
            date: req.date.unwrap_or_else(|| Utc::now().date_naive()),
            notes: optional(req.notes),
        },
    )
    .await?;

    tracing::info!(
        credit_id = %credit.id,
        member_id = %user.id,
        hours = credit.duration_hours,
        "Learning credit logged"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Learning credit added", "credit_id": credit.id })),
    ))
}

async fn list_credits(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
) -> Result<Json<Vec<LearningCredit>>> {
    let credits = LearningCredit::list_for_member(&state.pool, user.id).await?;
    Ok(Json(credits))
}

async fn summary(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
) -> Result<Json<LearningSummary>> {
    let summary = LearningCredit::summary_for_member(&state.pool, user.id).await?;
    Ok(Json(summary))
}

async fn delete_credit(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>> {
    if !LearningCredit::delete_for_member(&state.pool, id, user.id).await? {
        return Err(AppError::NotFound("Learning credit not found".to_string()));
    }

    tracing::info!(credit_id = %id, member_id = %user.id, "Learning credit deleted");

    Ok(Json(json!({ "message": "Learning credit deleted" })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/learning", get(list_credits).post(create_credit))
        .route("/api/learning/summary", get(summary))
        .route("/api/learning/:id", delete(delete_credit))
}
