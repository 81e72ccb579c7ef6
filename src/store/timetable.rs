use chrono::{NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::err::Error;
use crate::models::{TimetableData, Weekday};

pub struct TimetableStore<'a> {
    pool: &'a PgPool,
}

impl<'a> TimetableStore<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert keyed on (subject, day_of_week). Overwrites the stored times
    /// with whatever was submitted, including `None`.
    pub async fn upsert(
        &self,
        subject: Uuid,
        day: Weekday,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
    ) -> Result<TimetableData, Error> {
        let now = Utc::now();
        let entry = sqlx::query_as::<_, TimetableData>(
            "INSERT INTO timetable_entries \
             (uuid, subject, day_of_week, start_time, end_time, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) \
             ON CONFLICT (subject, day_of_week) \
             DO UPDATE SET start_time = EXCLUDED.start_time, \
                           end_time = EXCLUDED.end_time, \
                           updated_at = EXCLUDED.updated_at \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(subject)
        .bind(day)
        .bind(start_time)
        .bind(end_time)
        .bind(now)
        .fetch_one(self.pool)
        .await?;
        Ok(entry)
    }

    /// Creates an entry with no times unless the day already has one, in
    /// which case the existing row (times included) is left untouched. This
    /// is the write half of bulk sync.
    pub async fn insert_missing(&self, subject: Uuid, day: Weekday) -> Result<(), Error> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO timetable_entries \
             (uuid, subject, day_of_week, start_time, end_time, created_at, updated_at) \
             VALUES ($1, $2, $3, NULL, NULL, $4, $4) \
             ON CONFLICT (subject, day_of_week) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(subject)
        .bind(day)
        .bind(now)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Drops the given days for a subject. The delete half of bulk sync.
    pub async fn delete_days(&self, subject: Uuid, days: &[Weekday]) -> Result<u64, Error> {
        if days.is_empty() {
            return Ok(0);
        }
        let codes: Vec<String> = days.iter().map(|d| d.as_str().to_string()).collect();
        let res = sqlx::query(
            "DELETE FROM timetable_entries WHERE subject = $1 AND day_of_week = ANY($2)",
        )
        .bind(subject)
        .bind(codes)
        .execute(self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    /// Schedule for one subject in calendar order, MON first.
    pub async fn list_for_subject(&self, subject: Uuid) -> Result<Vec<TimetableData>, Error> {
        let mut entries = sqlx::query_as::<_, TimetableData>(
            "SELECT * FROM timetable_entries WHERE subject = $1",
        )
        .bind(subject)
        .fetch_all(self.pool)
        .await?;
        entries.sort_by_key(|e| e.day_of_week.ordinal());
        Ok(entries)
    }

    /// Entries across all of the user's subjects that fall on `day`.
    pub async fn list_for_owner_on(
        &self,
        owner: Uuid,
        day: Weekday,
    ) -> Result<Vec<TimetableData>, Error> {
        let entries = sqlx::query_as::<_, TimetableData>(
            "SELECT t.* FROM timetable_entries t \
             JOIN subjects s ON t.subject = s.uuid \
             WHERE s.owner = $1 AND t.day_of_week = $2 \
             ORDER BY t.start_time",
        )
        .bind(owner)
        .bind(day)
        .fetch_all(self.pool)
        .await?;
        Ok(entries)
    }
}
