pub mod color;
pub mod config;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod repo;
pub mod selection;
pub mod slug;
pub mod state;
pub mod widgets;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use state::AppState;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Tag routes
        .route(
            "/tags",
            post(handlers::tags::create_tag).get(handlers::tags::list_tags),
        )
        .route(
            "/tags/{tag_id}",
            get(handlers::tags::get_tag)
                .put(handlers::tags::update_tag)
                .delete(handlers::tags::delete_tag),
        )
        .route("/tags/{tag_id}/control", get(handlers::tags::tag_control))
        // Record routes
        .route(
            "/records",
            post(handlers::records::create_record).get(handlers::records::list_records),
        )
        .route(
            "/records/{record_id}",
            get(handlers::records::get_record).delete(handlers::records::delete_record),
        )
        .route(
            "/records/{record_id}/tags/{tag_id}",
            post(handlers::records::add_tag_to_record)
                .delete(handlers::records::remove_tag_from_record),
        );

    let web_routes = Router::new().route("/", get(handlers::web::index));

    Router::new()
        .nest("/api", api_routes)
        .merge(web_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub mod test_utils {
    use crate::state::AppState;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    pub async fn create_test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    pub async fn create_test_state() -> AppState {
        let pool = create_test_pool().await;
        AppState::new(pool)
    }
}
