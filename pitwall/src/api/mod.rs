//! REST APIハンドラー
//!
//! 役割（管理者・チーム・ドライバー）ごとのダッシュボード、レポート、
//! 登録・インポート操作、ログインとヘルスチェック

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod params;
pub mod reports;
pub mod team;

use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// ルーターを構築する
pub fn create_app(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    let dashboard_routes = Router::new()
        .route("/admin", get(dashboard::admin))
        .route("/team", get(dashboard::team))
        .route("/team/active-drivers", get(dashboard::team_active_drivers))
        .route("/driver", get(dashboard::driver))
        .route("/driver/team", get(dashboard::driver_team));

    let report_routes = Router::new()
        .route("/admin/status-results", get(reports::admin_status_results))
        .route("/admin/constructors-races", get(reports::admin_constructors_races))
        .route("/admin/airports", get(reports::admin_airports))
        .route("/team/status-results", get(reports::team_status_results))
        .route("/team/drivers-wins", get(reports::team_drivers_wins))
        .route("/driver/status-results", get(reports::driver_status_results))
        .route("/driver/points-by-year", get(reports::driver_points_by_year));

    let action_routes = Router::new()
        .route("/admin/create-constructor", post(admin::create_constructor))
        .route("/admin/create-driver", post(admin::create_driver))
        .route("/admin/get-constructors", get(admin::list_constructors))
        .route("/team/search-driver", get(team::search_driver))
        .route(
            "/team/import-drivers",
            post(team::import_drivers).layer(DefaultBodyLimit::max(max_upload_bytes)),
        );

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/health", get(health::health))
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/reports", report_routes)
        .nest("/api/actions", action_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
