use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::err::{on_unique_violation, Error};
use crate::models::SubjectData;

pub struct SubjectStore<'a> {
    pool: &'a PgPool,
}

impl<'a> SubjectStore<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_owned(&self, owner: Uuid) -> Result<Vec<SubjectData>, Error> {
        let subjects = sqlx::query_as::<_, SubjectData>(
            "SELECT * FROM subjects WHERE owner = $1 ORDER BY name",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;
        Ok(subjects)
    }

    /// Resolves a subject by id *and* owner. A subject owned by somebody
    /// else produces the same `NotFound` as one that never existed.
    pub async fn find_owned(&self, uuid: Uuid, owner: Uuid) -> Result<SubjectData, Error> {
        let subject = sqlx::query_as::<_, SubjectData>(
            "SELECT * FROM subjects WHERE uuid = $1 AND owner = $2 LIMIT 1",
        )
        .bind(uuid)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;

        subject.ok_or_else(|| Error::not_found(format!("Subject `{}` does not exist", uuid)))
    }

    pub async fn insert(
        &self,
        owner: Uuid,
        name: &str,
        code: Option<&str>,
    ) -> Result<SubjectData, Error> {
        let now = Utc::now();
        let subject = sqlx::query_as::<_, SubjectData>(
            "INSERT INTO subjects (uuid, owner, name, code, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(name)
        .bind(code)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|err| {
            on_unique_violation(
                err,
                Error::conflict(format!("Subject `{}` already exists", name)),
            )
        })?;
        Ok(subject)
    }

    pub async fn update(
        &self,
        uuid: Uuid,
        owner: Uuid,
        name: &str,
        code: Option<&str>,
    ) -> Result<SubjectData, Error> {
        let subject = sqlx::query_as::<_, SubjectData>(
            "UPDATE subjects SET name = $1, code = $2, updated_at = $3 \
             WHERE uuid = $4 AND owner = $5 RETURNING *",
        )
        .bind(name)
        .bind(code)
        .bind(Utc::now())
        .bind(uuid)
        .bind(owner)
        .fetch_optional(self.pool)
        .await
        .map_err(|err| {
            on_unique_violation(
                err,
                Error::conflict(format!("Subject `{}` already exists", name)),
            )
        })?;

        subject.ok_or_else(|| Error::not_found(format!("Subject `{}` does not exist", uuid)))
    }

    /// Deletes the subject; attendance and timetable rows go with it via
    /// `ON DELETE CASCADE`.
    pub async fn delete(&self, uuid: Uuid, owner: Uuid) -> Result<(), Error> {
        let res = sqlx::query("DELETE FROM subjects WHERE uuid = $1 AND owner = $2")
            .bind(uuid)
            .bind(owner)
            .execute(self.pool)
            .await?;

        if res.rows_affected() < 1 {
            return Err(Error::not_found(format!(
                "Subject `{}` does not exist",
                uuid
            )));
        }
        Ok(())
    }
}
