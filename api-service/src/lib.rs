//! 96sooq 后端 API
//!
//! 移动端与 Web 端共用的后端服务：
//! - 服务信息与健康检查
//! - Supabase 数据库连接检查
//! - 用户增删改查

pub mod handlers;
pub mod routes;
pub mod service;
pub mod state;

use axum::{middleware, routing::get, Json, Router};
use common::middleware::request_id::request_id_middleware;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub use state::AppState;

pub const SERVICE_NAME: &str = "api-service";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "96sooq API",
        version = "1.0.0",
        description = "Backend API for 96sooq mobile and web apps"
    ),
    paths(
        handlers::root,
        handlers::health_check,
        handlers::database_health,
        handlers::list_users,
        handlers::create_user,
        handlers::get_user,
        handlers::update_user,
        handlers::delete_user,
    ),
    components(schemas(
        common::models::User,
        common::models::CreateUserRequest,
        common::models::UpdateUserRequest,
        handlers::RootResponse,
        handlers::HealthResponse,
        handlers::DatabaseHealth,
    )),
    tags(
        (name = "root", description = "服务信息"),
        (name = "health", description = "健康检查端点"),
        (name = "users", description = "用户管理端点")
    )
)]
pub struct ApiDoc;

/// 创建应用路由
///
/// CORS 完全放开：镜像任意来源、方法与请求头，并允许携带凭证。
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
