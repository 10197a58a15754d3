use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::admin;
use crate::intake;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Everything under /admin except the login page sits behind the session
    // guard; a missing or expired cookie redirects to /admin/login.
    let admin_routes = Router::new()
        .route("/admin", get(admin::handlers::handle_dashboard))
        .route("/admin/candidatures", get(admin::handlers::handle_list))
        .route(
            "/admin/candidature/:id",
            get(admin::handlers::handle_detail).post(admin::handlers::handle_update),
        )
        .route(
            "/admin/download/:id/:kind",
            get(admin::handlers::handle_download),
        )
        .route(
            "/admin/download-all/:id",
            get(admin::handlers::handle_download_all),
        )
        .route("/admin/statistiques", get(admin::handlers::handle_statistics))
        .route(
            "/admin/api/candidatures",
            get(admin::handlers::handle_api_list),
        )
        .route("/admin/logout", get(admin::auth::handle_logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin::auth::require_admin,
        ));

    Router::new()
        .route("/", get(intake::handlers::handle_home))
        .route("/postuler", post(intake::handlers::handle_postuler))
        .route("/health", get(intake::handlers::handle_health))
        .route(
            "/admin/login",
            get(admin::auth::handle_login_page).post(admin::auth::handle_login),
        )
        .merge(admin_routes)
        .with_state(state)
}
