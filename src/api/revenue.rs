use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::api::extract::{
    optional, optional_param, required_id, AppJson, AppPath, AppQuery,
};
use crate::api::middleware::{AdminUser, AppState, AuthUser};
use crate::api::response::{keyed, WithKey};
use crate::error::{AppError, Result};
use crate::models::notification::{CreateNotificationData, Notification, NotificationKind};
use crate::models::referral::Referral;
use crate::models::revenue::{CreateRevenueData, Revenue, RevenueFilter, DEFAULT_REVENUE_TYPE};
use crate::models::user::User;
use crate::services::analytics::{monthly_totals, TimeWindow};
use crate::services::mailer;

#[derive(Debug, Deserialize)]
pub struct ListRevenueQuery {
    pub filter: Option<String>,
    pub member_id: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRevenueRequest {
    pub amount: Option<f64>,
    pub member_id: Option<String>,
    #[serde(rename = "type")]
    pub revenue_type: Option<String>,
    pub referral_id: Option<String>,
    pub notes: Option<String>,
    pub appreciation_message: Option<String>,
    pub appreciation_reason: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRevenueRequest {
    pub amount: Option<f64>,
    pub notes: Option<String>,
}

fn not_found() -> AppError {
    AppError::NotFound("Revenue not found".to_string())
}

fn validate_amount(amount: f64) -> Result<f64> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(AppError::Validation(
            "amount must be greater than zero".to_string(),
        ))
    }
}

async fn list_revenue(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppQuery(params): AppQuery<ListRevenueQuery>,
) -> Result<Json<Vec<WithKey<Revenue>>>> {
    let window: Option<TimeWindow> = optional_param(params.filter, "filter")?;
    let filter = RevenueFilter {
        created_since: window.and_then(|w| w.start(Utc::now())),
        member_id: optional_param(params.member_id, "member_id")?,
        category: optional(params.category),
        start_date: optional_param::<NaiveDate>(params.start_date, "startDate")?,
        end_date: optional_param::<NaiveDate>(params.end_date, "endDate")?,
        visible_to: (!user.is_admin()).then_some(user.id),
    };

    let rows = Revenue::list(&state.pool, &filter).await?;
    Ok(Json(keyed(rows)))
}

async fn get_revenue(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<WithKey<Revenue>>> {
    let revenue = Revenue::find_by_id(&state.pool, id)
        .await?
        .filter(|r| user.is_admin() || r.involves(user.id))
        .ok_or_else(not_found)?;

    Ok(Json(revenue.into()))
}

/// Record a thank-you slip for business given by `member_id`
async fn create_revenue(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppJson(req): AppJson<CreateRevenueRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let amount = req
        .amount
        .ok_or_else(|| AppError::Validation("amount is required".to_string()))
        .and_then(validate_amount)?;
    let member_id = required_id(req.member_id.as_deref(), "member_id")?;
    let referral_id = match optional(req.referral_id) {
        Some(raw) => Some(required_id(Some(&raw), "referral_id")?),
        None => None,
    };

    let giver = User::find_by_id(&state.pool, member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    if let Some(referral_id) = referral_id {
        Referral::find_by_id(&state.pool, referral_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Referral not found".to_string()))?;
    }

    let mut tx = state.pool.begin().await?;

    let revenue = Revenue::create(
        &mut tx,
        CreateRevenueData {
            amount,
            revenue_type: optional(req.revenue_type)
                .unwrap_or_else(|| DEFAULT_REVENUE_TYPE.to_string()),
            member_id: giver.id,
            created_by: user.id,
            referral_id,
            notes: optional(req.notes),
            appreciation_message: optional(req.appreciation_message),
            appreciation_reason: optional(req.appreciation_reason),
            date: req.date.unwrap_or_else(|| Utc::now().date_naive()),
        },
    )
    .await?;

    Notification::create_in(
        &mut tx,
        CreateNotificationData {
            user_id: giver.id,
            kind: NotificationKind::ThankYou,
            message: format!(
                "{} sent you a thank-you slip for \u{20b9}{:.2}",
                user.name, revenue.amount
            ),
            subject: Some(format!("New Thank You Slip from {}", user.name)),
            content: revenue.notes.clone(),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        revenue_id = %revenue.id,
        amount = revenue.amount,
        member_id = %giver.id,
        created_by = %user.id,
        "Thank-you slip recorded"
    );

    state.mailer.dispatch(mailer::thank_you_slip(
        giver.email,
        &user.name,
        revenue.amount,
        revenue.notes.as_deref(),
    ));

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Revenue added successfully!", "id": revenue.id })),
    ))
}

async fn update_revenue(
    State(state): State<AppState>,
    AdminUser { user: admin }: AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateRevenueRequest>,
) -> Result<Json<Value>> {
    let amount = req.amount.map(validate_amount).transpose()?;

    Revenue::update(&state.pool, id, amount, req.notes)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(revenue_id = %id, updated_by = %admin.id, "Revenue updated");

    Ok(Json(json!({ "message": "Revenue updated" })))
}

async fn delete_revenue(
    State(state): State<AppState>,
    AdminUser { user: admin }: AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>> {
    if !Revenue::delete(&state.pool, id).await? {
        return Err(not_found());
    }

    tracing::info!(revenue_id = %id, deleted_by = %admin.id, "Revenue deleted");

    Ok(Json(json!({ "message": "Revenue deleted" })))
}

async fn total_revenue(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Value>> {
    let total = Revenue::total_since(&state.pool, None).await?;
    Ok(Json(json!({ "total": total })))
}

/// Amounts summed by month name, e.g. {"January": 1500.0}
async fn monthly_revenue(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<BTreeMap<String, f64>>> {
    let rows = Revenue::amounts_by_date(&state.pool).await?;
    Ok(Json(monthly_totals(&rows)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/revenue", get(list_revenue).post(create_revenue))
        .route("/api/revenue/total", get(total_revenue))
        .route("/api/revenue/monthly", get(monthly_revenue))
        .route(
            "/api/revenue/:id",
            get(get_revenue).put(update_revenue).delete(delete_revenue),
        )
}
