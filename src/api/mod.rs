// HTTP endpoints, one router per resource

pub mod analytics;
pub mod auth;
pub mod events;
pub mod extract;
pub mod guests;
pub mod health;
pub mod learning;
pub mod meetings;
pub mod middleware;
pub mod notifications;
pub mod one_to_ones;
pub mod referrals;
pub mod response;
pub mod revenue;
pub mod search;
pub mod users;

use axum::Router;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

use middleware::AppState;

/// The served application: routes behind trailing-slash normalization
pub type App = NormalizePath<Router>;

/// Builds the full application.
///
/// `/api/revenue/` and `/api/revenue` reach the same handler. The slash is
/// trimmed before routing, so the layer wraps the router instead of being
/// added with `Router::layer`.
pub fn app(state: AppState) -> App {
    let router = Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(referrals::router())
        .merge(revenue::router())
        .merge(meetings::router())
        .merge(events::router())
        .merge(guests::router())
        .merge(learning::router())
        .merge(one_to_ones::router())
        .merge(notifications::router())
        .merge(search::router())
        .merge(analytics::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
