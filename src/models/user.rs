use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipPlan {
    Lifetime,
    #[serde(rename = "6 Months")]
    SixMonths,
    #[serde(rename = "12 Months")]
    TwelveMonths,
}

impl MembershipPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipPlan::Lifetime => "Lifetime",
            MembershipPlan::SixMonths => "6 Months",
            MembershipPlan::TwelveMonths => "12 Months",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String, // "member" or "admin"
    pub business_category: Option<String>,
    pub business_name: Option<String>,
    pub services_offered: Option<String>,
    pub phone: Option<String>,
    pub chapter: String,
    pub membership_plan: String,
    pub photo: Option<String>, // base64 encoded image
    pub created_at: DateTime<Utc>,
}

/// Compact listing used by pickers in the front-end
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MemberSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub business_category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateUserData {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub business_category: Option<String>,
    pub phone: Option<String>,
    pub chapter: String,
    pub membership_plan: MembershipPlan,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUserData {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub business_category: Option<String>,
    pub business_name: Option<String>,
    pub services_offered: Option<String>,
    pub chapter: Option<String>,
    pub photo: Option<String>,
    pub membership_plan: Option<MembershipPlan>,
    pub role: Option<Role>,
}

/// Trims and lower-cases an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin.as_str()
    }

    /// Creates a new user record
    pub async fn create(pool: &PgPool, data: CreateUserData) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO users (name, email, password_hash, role, business_category, phone, chapter, membership_plan)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.role.as_str())
        .bind(&data.business_category)
        .bind(&data.phone)
        .bind(&data.chapter)
        .bind(data.membership_plan.as_str())
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by (already normalized) email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM users WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists users, optionally filtered by a name substring and business category
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM users WHERE TRUE");

        if let Some(search) = search {
            query
                .push(" AND name ILIKE ")
                .push_bind(format!("%{}%", escape_like(search)));
        }
        if let Some(category) = category {
            query.push(" AND business_category = ").push_bind(category.to_string());
        }
        query.push(" ORDER BY name ASC");

        query.build_query_as::<Self>().fetch_all(pool).await
    }

    pub async fn list_summaries(pool: &PgPool) -> Result<Vec<MemberSummary>, sqlx::Error> {
        sqlx::query_as::<_, MemberSummary>(
            r#"
            SELECT id, name, email, role, business_category
            FROM users
            ORDER BY name ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Free-text search across contact and business fields
    pub async fn search(pool: &PgPool, term: &str) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = format!("%{}%", escape_like(term));

        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM users
            WHERE name ILIKE $1
               OR email ILIKE $1
               OR phone ILIKE $1
               OR business_name ILIKE $1
               OR business_category ILIKE $1
               OR services_offered ILIKE $1
            ORDER BY name ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(pool)
        .await
    }

    /// Recipients of a broadcast; `None` means every member
    pub async fn list_by_role(pool: &PgPool, role: Option<Role>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM users
            WHERE ($1::text IS NULL OR role = $1)
            ORDER BY name ASC
            "#,
        )
        .bind(role.map(|r| r.as_str()))
        .fetch_all(pool)
        .await
    }

    /// Applies a partial profile update; returns `None` when the user is gone
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUserData,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                business_category = COALESCE($4, business_category),
                business_name = COALESCE($5, business_name),
                services_offered = COALESCE($6, services_offered),
                chapter = COALESCE($7, chapter),
                photo = COALESCE($8, photo),
                membership_plan = COALESCE($9, membership_plan),
                role = COALESCE($10, role)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.phone)
        .bind(data.business_category)
        .bind(data.business_name)
        .bind(data.services_offered)
        .bind(data.chapter)
        .bind(data.photo)
        .bind(data.membership_plan.map(|p| p.as_str()))
        .bind(data.role.map(|r| r.as_str()))
        .fetch_optional(pool)
        .await
    }

    pub async fn update_password(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users SET password_hash = $2 WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Deletes a user; returns whether a row was removed
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Escapes LIKE wildcards in user input
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
