use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::extract::{optional, AppQuery};
use crate::api::middleware::{AppState, AuthUser};
use crate::error::Result;
use crate::models::user::User;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Member lookup across name, contact and business fields
async fn search(
    State(state): State<AppState>,
    _auth: AuthUser,
    AppQuery(params): AppQuery<SearchQuery>,
) -> Result<Json<Vec<User>>> {
    let Some(term) = optional(params.q) else {
        return Ok(Json(Vec::new()));
    };

    let users = User::search(&state.pool, &term).await?;
    tracing::debug!(term = %term, matches = users.len(), "Member search");

    Ok(Json(users))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/search", get(search))
}
