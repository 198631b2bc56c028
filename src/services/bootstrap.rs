use secrecy::ExposeSecret;
use sqlx::PgPool;

use crate::config::Config;
use crate::models::user::{normalize_email, CreateUserData, MembershipPlan, Role, User};
use crate::services::password;

#[derive(Debug, PartialEq, Eq)]
pub enum BootstrapOutcome {
    NotConfigured,
    AlreadyPresent,
    Created,
}

#[derive(thiserror::Error, Debug)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Password hashing failed: {0}")]
    Password(#[from] password::PasswordError),
}

/// Creates the configured administrator account on first start.
///
/// Needs both `ADMIN_EMAIL` and `ADMIN_PASSWORD`; an existing account with
/// that email is left untouched.
pub async fn ensure_admin(pool: &PgPool, config: &Config) -> Result<BootstrapOutcome, BootstrapError> {
    let (Some(email), Some(admin_password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(BootstrapOutcome::NotConfigured);
    };
    let email = normalize_email(email);

    if let Some(existing) = User::find_by_email(pool, &email).await? {
        if !existing.is_admin() {
            tracing::warn!(user_id = %existing.id, "Bootstrap admin email belongs to a non-admin user");
        }
        return Ok(BootstrapOutcome::AlreadyPresent);
    }

    let password_hash = password::hash_password_async(admin_password.expose_secret().clone()).await?;
    let user = User::create(
        pool,
        CreateUserData {
            name: "Administrator".to_string(),
            email,
            password_hash,
            role: Role::Admin,
            business_category: None,
            phone: None,
            chapter: config.default_chapter.clone(),
            membership_plan: MembershipPlan::Lifetime,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "Bootstrap administrator created");

    Ok(BootstrapOutcome::Created)
}
