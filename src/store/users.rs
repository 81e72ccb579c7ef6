use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::err::Error;
use crate::models::{SessionData, UserData};

pub struct UserStore<'a> {
    pool: &'a PgPool,
}

impl<'a> UserStore<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, uuid: Uuid) -> Result<Option<UserData>, Error> {
        let user = sqlx::query_as::<_, UserData>("SELECT * FROM users WHERE uuid = $1 LIMIT 1")
            .bind(uuid)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserData>, Error> {
        let user = sqlx::query_as::<_, UserData>("SELECT * FROM users WHERE username = $1 LIMIT 1")
            .bind(username)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Checks both registration uniqueness constraints in one query.
    pub async fn credentials_taken(
        &self,
        username: &str,
        id_card_number: &str,
    ) -> Result<bool, Error> {
        let existing = sqlx::query_as::<_, UserData>(
            "SELECT * FROM users WHERE username = $1 OR id_card_number = $2 LIMIT 1",
        )
        .bind(username)
        .bind(id_card_number)
        .fetch_optional(self.pool)
        .await?;
        Ok(existing.is_some())
    }

    pub async fn insert(&self, user: &UserData) -> Result<(), Error> {
        sqlx::query("INSERT INTO users VALUES ($1, $2, $3, $4, $5)")
            .bind(user.uuid)
            .bind(&user.username)
            .bind(&user.id_card_number)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .execute(self.pool)
            .await
            .map_err(|err| {
                // races with a concurrent registration land here
                crate::err::on_unique_violation(
                    err,
                    Error::validation("A user with this username or ID card already exists"),
                )
            })?;
        Ok(())
    }
}

pub struct SessionStore<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionStore<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, session: &SessionData) -> Result<(), Error> {
        sqlx::query("INSERT INTO user_sessions VALUES ($1, $2, $3, $4, $5)")
            .bind(&session.token)
            .bind(&session.refresh_token)
            .bind(session.belongs_to)
            .bind(session.expires_at)
            .bind(session.refresh_expires_at)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<SessionData>, Error> {
        let session = sqlx::query_as::<_, SessionData>(
            "SELECT * FROM user_sessions WHERE token = $1 LIMIT 1",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;
        Ok(session)
    }

    pub async fn delete_by_token(&self, token: &str) -> Result<(), Error> {
        sqlx::query("DELETE FROM user_sessions WHERE token = $1")
            .bind(token)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Swaps in a fresh access token for a live refresh token. Returns the
    /// rotated session, or `None` if the refresh token is unknown or past
    /// its own expiry.
    pub async fn rotate_access(
        &self,
        refresh_token: &str,
        new_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<SessionData>, Error> {
        let session = sqlx::query_as::<_, SessionData>(
            "UPDATE user_sessions SET token = $1, expires_at = $2 \
             WHERE refresh_token = $3 AND refresh_expires_at > $4 RETURNING *",
        )
        .bind(new_token)
        .bind(expires_at)
        .bind(refresh_token)
        .bind(Utc::now())
        .fetch_optional(self.pool)
        .await?;
        Ok(session)
    }

    /// Revokes the session owning this refresh token. Returns how many rows
    /// went away, so callers can tell a no-op from a real logout.
    pub async fn delete_by_refresh(&self, refresh_token: &str) -> Result<u64, Error> {
        let res = sqlx::query("DELETE FROM user_sessions WHERE refresh_token = $1")
            .bind(refresh_token)
            .execute(self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}
