use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/submit", post(handlers::submit_form))
        .route("/admin", get(handlers::admin_login_page).post(handlers::admin_login))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/requests", post(handlers::create_request))
        .route(
            "/api/admin/records",
            get(handlers::get_admin_records).put(handlers::put_admin_records),
        )
        .route("/-/healthy", get(handlers::healthy))
        .with_state(state)
}
