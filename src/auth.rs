use axum::headers::authorization::Bearer;
use axum::headers::Authorization;
use axum::{Extension, Json, TypedHeader};
use chrono::{DateTime, Duration, Utc};
use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::Pbkdf2;
use rand::{thread_rng, Rng};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::err::Error;
use crate::models::{SessionData, UserData};
use crate::store::{SessionStore, UserStore};
use crate::{proceeds, Payload};

const MIN_PASSWORD_LEN: usize = 6;
const ACCESS_TOKEN_LIFETIME_MINUTES: i64 = 30;
const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 7;

/// 32 random bytes, hashed and hex-encoded. Used for both halves of the
/// session token pair.
fn fresh_token() -> String {
    let bytes: [u8; 32] = thread_rng().gen();
    let mut hasher: Sha256 = Digest::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Resolves the calling user from the bearer token, or fails with 401.
/// Expired sessions are removed as soon as they are seen. Every protected
/// handler goes through here before touching any data.
pub async fn current_user(
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    pg: &PgPool,
) -> Result<UserData, Error> {
    let token = match &bearer {
        Some(TypedHeader(Authorization(bearer))) => bearer.token().to_string(),
        None => {
            return Err(Error::InvalidSession {
                message: "Missing bearer token".to_string(),
            })
        }
    };
    if token.is_empty() {
        return Err(Error::InvalidSession {
            message: "Missing bearer token".to_string(),
        });
    }

    let sessions = SessionStore::new(pg);
    let session = match sessions.find_by_token(&token).await? {
        Some(session) => session,
        None => {
            return Err(Error::InvalidSession {
                message: "Unknown session token".to_string(),
            })
        }
    };

    if Utc::now().gt(&session.expires_at) {
        sessions.delete_by_token(&token).await?;
        return Err(Error::InvalidSession {
            message: "Session has expired".to_string(),
        });
    }

    let user = UserStore::new(pg).find(session.belongs_to).await?;
    user.ok_or(Error::InvalidSession {
        message: "Session does not belong to a known user".to_string(),
    })
}

pub async fn register(
    Extension(pg): Extension<PgPool>,
    Json(body): Json<RegisterUser>,
) -> Payload<RegisteredUser> {
    if body.username.is_empty() || body.id_card_number.is_empty() {
        return Err(Error::validation(
            "username and id_card_number are required",
        ));
    }
    if body.password.len() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }

    let users = UserStore::new(&pg);
    if users
        .credentials_taken(&body.username, &body.id_card_number)
        .await?
    {
        return Err(Error::validation(
            "A user with this username or ID card already exists",
        ));
    }

    let user = UserData {
        uuid: Uuid::new_v4(),
        username: body.username,
        id_card_number: body.id_card_number,
        password_hash: Pbkdf2
            .hash_password(body.password.as_bytes(), &SaltString::generate(&mut OsRng))?
            .to_string(),
        created_at: Utc::now(),
    };
    users.insert(&user).await?;

    log::info!("Registered user `{}`", user.username);
    proceeds(RegisteredUser { user_id: user.uuid })
}

pub async fn login(
    Extension(pg): Extension<PgPool>,
    Json(login): Json<LoginUser>,
) -> Payload<SessionTokens> {
    // one generic failure for unknown user and wrong password alike
    let rejected = || Error::AuthenticationFailure {
        message: "Invalid username or password".to_string(),
    };

    if login.password.is_empty() {
        return Err(rejected());
    }

    let user = UserStore::new(&pg)
        .find_by_username(&login.username)
        .await?
        .ok_or_else(rejected)?;

    let hash = PasswordHash::new(&user.password_hash)?;
    if Pbkdf2
        .verify_password(login.password.as_bytes(), &hash)
        .is_err()
    {
        return Err(rejected());
    }

    let session = SessionData {
        token: fresh_token(),
        refresh_token: fresh_token(),
        belongs_to: user.uuid,
        expires_at: Utc::now() + Duration::minutes(ACCESS_TOKEN_LIFETIME_MINUTES),
        refresh_expires_at: Utc::now() + Duration::days(REFRESH_TOKEN_LIFETIME_DAYS),
    };
    SessionStore::new(&pg).insert(&session).await?;

    proceeds(SessionTokens {
        access_token: session.token,
        refresh_token: session.refresh_token,
        expires_at: session.expires_at,
    })
}

pub async fn refresh(
    Extension(pg): Extension<PgPool>,
    Json(body): Json<RefreshSession>,
) -> Payload<RefreshedSession> {
    let expires_at = Utc::now() + Duration::minutes(ACCESS_TOKEN_LIFETIME_MINUTES);
    let session = SessionStore::new(&pg)
        .rotate_access(&body.refresh, &fresh_token(), expires_at)
        .await?;

    match session {
        Some(session) => proceeds(RefreshedSession {
            access_token: session.token,
            expires_at: session.expires_at,
        }),
        None => Err(Error::AuthenticationFailure {
            message: "Unknown or expired refresh token".to_string(),
        }),
    }
}

pub async fn logout(
    Extension(pg): Extension<PgPool>,
    Json(body): Json<DropSession>,
) -> Payload<SessionDropped> {
    let dropped = SessionStore::new(&pg)
        .delete_by_refresh(&body.refresh)
        .await?;

    if dropped < 1 {
        return Err(Error::validation("Invalid token"));
    }
    proceeds(SessionDropped { drop_success: true })
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUser {
    pub username: String,
    pub password: String,
    pub id_card_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUser {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    username: String,
    password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionTokens {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshSession {
    refresh: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshedSession {
    access_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DropSession {
    refresh: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionDropped {
    pub drop_success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_tokens_are_unique_hex() {
        let a = fresh_token();
        let b = fresh_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
