pub mod attendance;
pub mod auth;
pub mod err;
pub mod models;
pub mod reconcile;
pub mod stats;
pub mod store;
pub mod subjects;
pub mod timetable;

use std::env;
use std::net::SocketAddr;

use axum::handler::Handler;
use axum::headers::authorization::Bearer;
use axum::headers::Authorization;
use axum::routing::{get, post};
use axum::{Extension, Json, Router, TypedHeader};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;

use crate::err::{Error, Success};

pub type Payload<T> = Result<Json<Success<T>>, Error>;

/// Bearer header extractor shared by every protected handler. Optional so a
/// missing header surfaces as our 401, not as a framework rejection.
pub type BearerAuth = Option<TypedHeader<Authorization<Bearer>>>;

pub fn proceeds<V>(value: V) -> Payload<V>
where
    V: Serialize,
{
    Ok(Json(Success::of(value)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let db_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/rollcall".to_string());
    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&db_url)
        .await?;
    store::prepare_schema(&pool).await?;

    let app = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/subjects", get(subjects::list).post(subjects::create))
        .route(
            "/subjects/:id",
            get(subjects::retrieve)
                .put(subjects::update)
                .delete(subjects::remove),
        )
        .route(
            "/attendance/mark",
            post(attendance::mark).delete(attendance::unmark),
        )
        .route(
            "/attendance/subject/:id/records",
            get(attendance::subject_records),
        )
        .route(
            "/attendance/subject/:id/stats",
            get(attendance::subject_stats),
        )
        .route("/attendance/overall-stats", get(attendance::overall_stats))
        .route("/timetable/subject/:id/add", post(timetable::add_entry))
        .route("/timetable/subject/:id/bulk", post(timetable::bulk_sync))
        .route("/timetable/subject/:id", get(timetable::subject_schedule))
        .route("/timetable/today", get(timetable::today_classes))
        .fallback(err::handler404.into_service())
        .layer(Extension(pool));

    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()?;
    log::info!("Starting Rollcall HTTP server on http://{}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
