//! Member repository implementation.

use sqlx::PgPool;

use gout_core::error::{AppError, ErrorKind};
use gout_core::result::AppResult;
use gout_core::types::MemberId;
use gout_entity::member::Member;

/// Repository for member account lookup and registration.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    /// Create a new member repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a member by ID.
    pub async fn find_by_id(&self, id: MemberId) -> AppResult<Option<Member>> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find member", e))
    }

    /// Find a member by login email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Member>> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find member by email", e)
            })
    }

    /// Create a new member account.
    pub async fn create(&self, member: &Member) -> AppResult<Member> {
        let result = sqlx::query_as::<_, Member>(
            "INSERT INTO members (id, email, first_name, last_name, password_hash, role, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(member.id)
        .bind(&member.email)
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(&member.password_hash)
        .bind(member.role)
        .bind(member.created_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(created) => Ok(created),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => {
                Err(AppError::validation("Email is already registered"))
            }
            Err(e) => Err(AppError::with_source(
                ErrorKind::Database,
                "Failed to create member",
                e,
            )),
        }
    }
}
