use axum::extract::FromRef;
use secrecy::ExposeSecret;
use sqlx::PgPool;

use crate::config::Config;
use crate::services::mailer::Mailer;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub mailer: Mailer,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let mailer = Mailer::new(config.mail.clone());
        Self {
            pool,
            config,
            mailer,
        }
    }

    pub fn jwt_secret(&self) -> &[u8] {
        self.config.jwt_secret.expose_secret().as_bytes()
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> PgPool {
        state.pool.clone()
    }
}
