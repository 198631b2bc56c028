use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::extract::{optional_param, AppQuery};
use crate::api::middleware::{AdminUser, AppState};
use crate::error::Result;
use crate::models::activity::MemberActivity;
use crate::models::event::Event;
use crate::models::meeting::Meeting;
use crate::models::referral::Referral;
use crate::models::revenue::Revenue;
use crate::services::analytics::{
    growth_chart, performance_chart, GrowthPoint, PerformancePoint, TimeWindow,
};
use crate::services::engagement::{status_for, EngagementStatus};

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub filter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub referrals_given: i64,
    pub referrals_received: i64,
    pub revenue_generated: f64,
    pub meetings_attended: i64,
    pub events_participation: i64,
    pub member_growth: i64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub summary: Summary,
    pub growth_chart: Vec<GrowthPoint>,
    pub performance_chart: Vec<PerformancePoint>,
}

#[derive(Debug, Serialize)]
pub struct MemberEngagement {
    pub id: Uuid,
    pub name: String,
    pub referrals: i64,
    pub meetings: i64,
    pub events: i64,
    pub one_to_ones: i64,
    pub points: i64,
    pub status: EngagementStatus,
}

impl From<MemberActivity> for MemberEngagement {
    fn from(activity: MemberActivity) -> Self {
        let points = activity.counts().points();
        Self {
            id: activity.id,
            name: activity.name,
            referrals: activity.referrals,
            meetings: activity.meetings,
            events: activity.events,
            one_to_ones: activity.one_to_ones,
            points,
            status: status_for(points),
        }
    }
}

/// Chapter-wide totals and monthly charts for the selected window
async fn overview(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppQuery(params): AppQuery<AnalyticsQuery>,
) -> Result<Json<AnalyticsResponse>> {
    let window = optional_param::<TimeWindow>(params.filter, "filter")?.unwrap_or_default();
    let start = window.start(Utc::now());
    let pool = &state.pool;

    // Every referral has exactly one giver and one receiver.
    let referrals = Referral::count_since(pool, start).await?;
    let revenue_generated = Revenue::total_since(pool, start).await?;
    let meetings_attended = Meeting::attendance_since(pool, start).await?;
    let events_participation = Event::registrations_since(pool, start).await?;

    let signups = MemberActivity::monthly_signups(pool, start).await?;
    let referral_months = Referral::monthly_counts(pool, start).await?;
    let revenue_months = Revenue::monthly_sums(pool, start).await?;

    let summary = Summary {
        referrals_given: referrals,
        referrals_received: referrals,
        revenue_generated,
        meetings_attended,
        events_participation,
        member_growth: signups.iter().map(|(_, count)| count).sum(),
    };

    tracing::debug!(filter = ?window, "Analytics computed");

    Ok(Json(AnalyticsResponse {
        summary,
        growth_chart: growth_chart(&signups),
        performance_chart: performance_chart(&referral_months, &revenue_months),
    }))
}

/// Members ranked by engagement points
async fn engagement(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<MemberEngagement>>> {
    let activity = MemberActivity::list_members(&state.pool).await?;
    Ok(Json(rank(activity)))
}

fn rank(activity: Vec<MemberActivity>) -> Vec<MemberEngagement> {
    let mut ranked: Vec<MemberEngagement> = activity.into_iter().map(Into::into).collect();
    ranked.sort_by(|a, b| b.points.cmp(&a.points));
    ranked
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/analytics", get(overview))
        .route("/api/analytics/engagement", get(engagement))
}
