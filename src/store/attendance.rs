use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::err::Error;
use crate::models::{AttendanceData, Status};

pub struct AttendanceStore<'a> {
    pool: &'a PgPool,
}

impl<'a> AttendanceStore<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Single-statement upsert keyed on (subject, date). Exactly one row per
    /// pair holds after this returns, whatever was there before.
    pub async fn upsert(
        &self,
        subject: Uuid,
        date: NaiveDate,
        status: Status,
    ) -> Result<AttendanceData, Error> {
        let now = Utc::now();
        let record = sqlx::query_as::<_, AttendanceData>(
            "INSERT INTO attendance_records (uuid, subject, date, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) \
             ON CONFLICT (subject, date) \
             DO UPDATE SET status = EXCLUDED.status, updated_at = EXCLUDED.updated_at \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(subject)
        .bind(date)
        .bind(status)
        .bind(now)
        .fetch_one(self.pool)
        .await?;
        Ok(record)
    }

    /// Idempotent: deleting a day that was never marked is not an error.
    pub async fn delete(&self, subject: Uuid, date: NaiveDate) -> Result<(), Error> {
        sqlx::query("DELETE FROM attendance_records WHERE subject = $1 AND date = $2")
            .bind(subject)
            .bind(date)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_for_subject(&self, subject: Uuid) -> Result<Vec<AttendanceData>, Error> {
        let records = sqlx::query_as::<_, AttendanceData>(
            "SELECT * FROM attendance_records WHERE subject = $1 ORDER BY date DESC",
        )
        .bind(subject)
        .fetch_all(self.pool)
        .await?;
        Ok(records)
    }

    /// Every record across every subject the user owns.
    pub async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<AttendanceData>, Error> {
        let records = sqlx::query_as::<_, AttendanceData>(
            "SELECT a.* FROM attendance_records a \
             JOIN subjects s ON a.subject = s.uuid \
             WHERE s.owner = $1 ORDER BY a.date DESC",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;
        Ok(records)
    }
}
