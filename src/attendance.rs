use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::current_user;
use crate::err::Error;
use crate::models::{AttendanceData, Status};
use crate::stats::{calculate_stats, AttendanceStats};
use crate::store::{AttendanceStore, SubjectStore};
use crate::{proceeds, BearerAuth, Payload};

fn parse_date(raw: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| Error::validation(format!("`{}` is not a valid date (expected YYYY-MM-DD)", raw)))
}

/// Marks (or re-marks) a subject on a date. Upsert semantics: marking the
/// same day twice keeps one row with the latest status.
pub async fn mark(
    bearer: BearerAuth,
    Extension(pg): Extension<PgPool>,
    Json(body): Json<MarkAttendance>,
) -> Payload<AttendanceData> {
    let user = current_user(bearer, &pg).await?;

    let (subject_id, date, status) = match (body.subject, body.date, body.status) {
        (Some(subject), Some(date), Some(status)) => (subject, date, status),
        _ => return Err(Error::validation("subject, date and status are required")),
    };
    let date = parse_date(&date)?;
    let status = Status::try_from(status.as_str()).map_err(Error::validation)?;

    let subject = SubjectStore::new(&pg)
        .find_owned(subject_id, user.uuid)
        .await?;
    let record = AttendanceStore::new(&pg)
        .upsert(subject.uuid, date, status)
        .await?;
    proceeds(record)
}

/// Removes the mark for a (subject, date) pair. Idempotent.
pub async fn unmark(
    bearer: BearerAuth,
    Extension(pg): Extension<PgPool>,
    Json(body): Json<UnmarkAttendance>,
) -> Result<StatusCode, Error> {
    let user = current_user(bearer, &pg).await?;

    let (subject_id, date) = match (body.subject, body.date) {
        (Some(subject), Some(date)) => (subject, date),
        _ => return Err(Error::validation("subject and date are required")),
    };
    let date = parse_date(&date)?;

    let subject = SubjectStore::new(&pg)
        .find_owned(subject_id, user.uuid)
        .await?;
    AttendanceStore::new(&pg).delete(subject.uuid, date).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Full attendance history for one subject, newest day first. Feeds the
/// calendar view.
pub async fn subject_records(
    bearer: BearerAuth,
    Path(subject_id): Path<Uuid>,
    Extension(pg): Extension<PgPool>,
) -> Payload<RecordList> {
    let user = current_user(bearer, &pg).await?;
    let subject = SubjectStore::new(&pg)
        .find_owned(subject_id, user.uuid)
        .await?;
    let records = AttendanceStore::new(&pg)
        .list_for_subject(subject.uuid)
        .await?;
    proceeds(RecordList { records })
}

pub async fn subject_stats(
    bearer: BearerAuth,
    Path(subject_id): Path<Uuid>,
    Extension(pg): Extension<PgPool>,
) -> Payload<AttendanceStats> {
    let user = current_user(bearer, &pg).await?;
    let subject = SubjectStore::new(&pg)
        .find_owned(subject_id, user.uuid)
        .await?;
    let records = AttendanceStore::new(&pg)
        .list_for_subject(subject.uuid)
        .await?;
    proceeds(calculate_stats(&records))
}

/// Dashboard number: attendance across every subject the caller owns.
pub async fn overall_stats(
    bearer: BearerAuth,
    Extension(pg): Extension<PgPool>,
) -> Payload<AttendanceStats> {
    let user = current_user(bearer, &pg).await?;
    let records = AttendanceStore::new(&pg).list_for_owner(user.uuid).await?;
    proceeds(calculate_stats(&records))
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkAttendance {
    pub subject: Option<Uuid>,
    pub date: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnmarkAttendance {
    pub subject: Option<Uuid>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordList {
    pub records: Vec<AttendanceData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_parse_iso_only() {
        assert!(parse_date("2024-02-29").is_ok());
        assert!(parse_date("29/02/2024").is_err());
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("").is_err());
    }
}
