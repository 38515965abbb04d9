pub mod appresult;
pub mod caller;
pub mod chats;
pub mod check;
pub mod config;
pub mod db;
pub mod messages;
pub mod pictures;
pub mod profiles;

use axum::{extract::FromRef, Router};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use appresult::{AppError, AppResult, JsonBody};
pub use caller::{Caller, CallerHeader};
pub use config::Config;

use pictures::PictureStore;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub pictures: PictureStore,
    pub caller_header: CallerHeader,
}

pub fn app(state: AppState) -> Router {
    let max_upload_bytes = state.pictures.max_upload_bytes();

    Router::new()
        .nest("/chats", chats::router())
        .nest("/messages", messages::router())
        .nest("/profile", profiles::router())
        .nest("/pictures", pictures::router(max_upload_bytes))

        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
