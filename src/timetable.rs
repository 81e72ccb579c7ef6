use std::collections::HashSet;

use axum::extract::Path;
use axum::{Extension, Json};
use chrono::{Datelike, Local, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::current_user;
use crate::err::Error;
use crate::models::{TimetableData, Weekday};
use crate::reconcile::plan_sync;
use crate::store::{SubjectStore, TimetableStore};
use crate::{proceeds, BearerAuth, Payload};

/// Upserts a single schedule slot, times included.
pub async fn add_entry(
    bearer: BearerAuth,
    Path(subject_id): Path<Uuid>,
    Extension(pg): Extension<PgPool>,
    Json(body): Json<AddTimetableEntry>,
) -> Payload<TimetableData> {
    let user = current_user(bearer, &pg).await?;
    let subject = SubjectStore::new(&pg)
        .find_owned(subject_id, user.uuid)
        .await?;

    let entry = TimetableStore::new(&pg)
        .upsert(subject.uuid, body.day_of_week, body.start_time, body.end_time)
        .await?;
    proceeds(entry)
}

/// Reconciles the stored schedule against a submitted set of weekday codes:
/// afterwards the subject has exactly one entry per submitted day and none
/// outside the set. Days that survive the sync keep their times; days the
/// sync creates get none (times only arrive via the single-slot endpoint).
pub async fn bulk_sync(
    bearer: BearerAuth,
    Path(subject_id): Path<Uuid>,
    Extension(pg): Extension<PgPool>,
    Json(body): Json<BulkDays>,
) -> Payload<SyncOutcome> {
    let user = current_user(bearer, &pg).await?;
    let subject = SubjectStore::new(&pg)
        .find_owned(subject_id, user.uuid)
        .await?;

    let days = match body.days {
        Some(days) if !days.is_empty() => days,
        _ => return Err(Error::validation("Please provide a non-empty list of days")),
    };
    let mut target: HashSet<Weekday> = HashSet::new();
    for raw in &days {
        target.insert(Weekday::try_from(raw.as_str()).map_err(Error::validation)?);
    }

    let timetable = TimetableStore::new(&pg);
    let existing: Vec<Weekday> = timetable
        .list_for_subject(subject.uuid)
        .await?
        .into_iter()
        .map(|e| e.day_of_week)
        .collect();

    let plan = plan_sync(&existing, &target);
    let removed = timetable.delete_days(subject.uuid, &plan.delete).await?;
    for day in &plan.create {
        timetable.insert_missing(subject.uuid, *day).await?;
    }

    log::debug!(
        "Synced timetable of subject `{}`: {} created, {} removed",
        subject.uuid,
        plan.create.len(),
        removed
    );
    proceeds(SyncOutcome {
        detail: "Timetable updated successfully",
        created: plan.create.len() as u64,
        removed,
    })
}

/// Weekly schedule for one subject, MON first.
pub async fn subject_schedule(
    bearer: BearerAuth,
    Path(subject_id): Path<Uuid>,
    Extension(pg): Extension<PgPool>,
) -> Payload<ScheduleList> {
    let user = current_user(bearer, &pg).await?;
    let subject = SubjectStore::new(&pg)
        .find_owned(subject_id, user.uuid)
        .await?;
    let entries = TimetableStore::new(&pg)
        .list_for_subject(subject.uuid)
        .await?;
    proceeds(ScheduleList { entries })
}

/// Every class of the caller that falls on today's weekday, by the server's
/// local clock.
pub async fn today_classes(
    bearer: BearerAuth,
    Extension(pg): Extension<PgPool>,
) -> Payload<ScheduleList> {
    let user = current_user(bearer, &pg).await?;
    let today = Weekday::from(Local::now().weekday());
    let entries = TimetableStore::new(&pg)
        .list_for_owner_on(user.uuid, today)
        .await?;
    proceeds(ScheduleList { entries })
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddTimetableEntry {
    pub day_of_week: Weekday,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkDays {
    pub days: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub detail: &'static str,
    pub created: u64,
    pub removed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleList {
    pub entries: Vec<TimetableData>,
}
