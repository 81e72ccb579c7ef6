//! Per-entity data access. Every query that touches subject-scoped data
//! filters by the owning user, so a foreign-owned row is indistinguishable
//! from a missing one at this layer already.

pub mod attendance;
pub mod subjects;
pub mod timetable;
pub mod users;

pub use attendance::AttendanceStore;
pub use subjects::SubjectStore;
pub use timetable::TimetableStore;
pub use users::{SessionStore, UserStore};

use sqlx::{Executor, PgPool};

/// Applies `schema.sql` on startup. Every statement is `IF NOT EXISTS`, so
/// this is safe to run against an already populated database.
pub async fn prepare_schema(pool: &PgPool) -> anyhow::Result<()> {
    pool.execute(include_str!("../../schema.sql")).await?;
    Ok(())
}
