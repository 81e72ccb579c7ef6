use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::current_user;
use crate::err::Error;
use crate::models::SubjectData;
use crate::store::SubjectStore;
use crate::{proceeds, BearerAuth, Payload};

pub async fn list(bearer: BearerAuth, Extension(pg): Extension<PgPool>) -> Payload<SubjectList> {
    let user = current_user(bearer, &pg).await?;
    let subjects = SubjectStore::new(&pg).list_owned(user.uuid).await?;
    proceeds(SubjectList { subjects })
}

pub async fn create(
    bearer: BearerAuth,
    Extension(pg): Extension<PgPool>,
    Json(body): Json<CreateSubject>,
) -> Payload<SubjectData> {
    let user = current_user(bearer, &pg).await?;
    if body.name.trim().is_empty() {
        return Err(Error::validation("`name` must not be empty"));
    }

    // owner comes from the session, never from the payload
    let subject = SubjectStore::new(&pg)
        .insert(user.uuid, body.name.trim(), body.code.as_deref())
        .await?;
    proceeds(subject)
}

pub async fn retrieve(
    bearer: BearerAuth,
    Path(id): Path<Uuid>,
    Extension(pg): Extension<PgPool>,
) -> Payload<SubjectData> {
    let user = current_user(bearer, &pg).await?;
    let subject = SubjectStore::new(&pg).find_owned(id, user.uuid).await?;
    proceeds(subject)
}

pub async fn update(
    bearer: BearerAuth,
    Path(id): Path<Uuid>,
    Extension(pg): Extension<PgPool>,
    Json(body): Json<UpdateSubject>,
) -> Payload<SubjectData> {
    let user = current_user(bearer, &pg).await?;
    let subjects = SubjectStore::new(&pg);
    let existing = subjects.find_owned(id, user.uuid).await?;

    let name = match &body.name {
        Some(name) if name.trim().is_empty() => {
            return Err(Error::validation("`name` must not be empty"))
        }
        Some(name) => name.trim().to_string(),
        None => existing.name,
    };
    let code = body.code.or(existing.code);

    let subject = subjects
        .update(id, user.uuid, &name, code.as_deref())
        .await?;
    proceeds(subject)
}

pub async fn remove(
    bearer: BearerAuth,
    Path(id): Path<Uuid>,
    Extension(pg): Extension<PgPool>,
) -> Result<StatusCode, Error> {
    let user = current_user(bearer, &pg).await?;
    SubjectStore::new(&pg).delete(id, user.uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectList {
    pub subjects: Vec<SubjectData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubject {
    pub name: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSubject {
    pub name: Option<String>,
    pub code: Option<String>,
}
