use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;

use serde::Serialize;

pub async fn handler404(path: Uri) -> (StatusCode, Json<Error>) {
    (
        StatusCode::NOT_FOUND,
        Json(Error::NotFound {
            message: format!("Invalid path: {}", path),
        }),
    )
}

/// Envelope for every successful JSON response.
#[derive(Debug, Clone, Serialize)]
pub struct Success<V> {
    success: bool,
    #[serde(flatten)]
    value: V,
}

impl<V: Serialize> Success<V> {
    pub fn of(value: V) -> Self {
        Self {
            success: true,
            value,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "error")]
pub enum Error {
    /// Malformed or missing input. Never changes state.
    Validation { message: String },
    /// A uniqueness invariant would be violated.
    Conflict { message: String },
    /// Unknown resource, or a resource owned by somebody else. The two are
    /// deliberately indistinguishable.
    NotFound { message: String },
    /// Bad credentials. The message never reveals whether the user exists.
    AuthenticationFailure { message: String },
    /// Missing, unknown or expired session token.
    InvalidSession { message: String },
    InternalError { kind: &'static str, message: String },
}

impl Error {
    pub fn validation<S: Into<String>>(msg: S) -> Error {
        Error::Validation {
            message: msg.into(),
        }
    }

    pub fn conflict<S: Into<String>>(msg: S) -> Error {
        Error::Conflict {
            message: msg.into(),
        }
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Error {
        Error::NotFound {
            message: msg.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::AuthenticationFailure { .. } => StatusCode::UNAUTHORIZED,
            Error::InvalidSession { .. } => StatusCode::UNAUTHORIZED,
            Error::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::InternalError {
            kind: "DatabaseError",
            message: err.to_string(),
        }
    }
}

impl From<pbkdf2::password_hash::Error> for Error {
    fn from(err: pbkdf2::password_hash::Error) -> Self {
        Self::InternalError {
            kind: "PasswordHashError",
            message: err.to_string(),
        }
    }
}

/// Translates a Postgres unique violation (SQLSTATE 23505) into `conflict`,
/// leaving every other database error on the internal path.
pub fn on_unique_violation(err: sqlx::Error, conflict: Error) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => conflict,
        _ => Error::from(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            Error::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::conflict("dup").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            Error::not_found("gone").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::AuthenticationFailure {
                message: "no".to_string()
            }
            .status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::InvalidSession {
                message: "no".to_string()
            }
            .status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::InternalError {
                kind: "DatabaseError",
                message: "boom".to_string()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn non_unique_database_errors_stay_internal() {
        let err = on_unique_violation(sqlx::Error::RowNotFound, Error::conflict("dup"));
        assert!(matches!(err, Error::InternalError { .. }));
    }

    #[test]
    fn errors_serialize_with_a_tag() {
        let json = serde_json::to_value(Error::not_found("missing")).unwrap();
        assert_eq!(json["error"], "NotFound");
        assert_eq!(json["message"], "missing");
    }

    #[test]
    fn success_envelope_flattens_the_value() {
        #[derive(Serialize)]
        struct Body {
            detail: &'static str,
        }
        let json = serde_json::to_value(Success::of(Body { detail: "done" })).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["detail"], "done");
    }
}
