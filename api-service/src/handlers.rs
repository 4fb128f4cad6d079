//! Handler模块

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use common::db::QuerySpec;
use common::errors::AppError;
use common::middleware::RequestId;
use common::models::user::{CreateUserRequest, ListUsersQuery, UpdateUserRequest, User, USERS_TABLE};
use common::response::ApiResponse;
use crate::service::{UserService, UserServiceTrait};
use crate::state::AppState;
use crate::SERVICE_NAME;

const API_MESSAGE: &str = "96sooq Backend API";

/// 根端点，返回服务名称与版本
#[utoipa::path(
    get,
    path = "/",
    tag = "root",
    responses(
        (status = 200, description = "服务信息", body = RootResponse)
    )
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: API_MESSAGE.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// 健康检查端点
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "服务运行正常", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

/// 数据库连接检查
///
/// 获取 Supabase 客户端并对 `users` 表做一次单行查询。
#[utoipa::path(
    get,
    path = "/health/db",
    tag = "health",
    responses(
        (status = 200, description = "数据库连接状态", body = DatabaseHealth)
    )
)]
pub async fn database_health(State(state): State<AppState>) -> Json<DatabaseHealth> {
    let configured = state.db.provider().is_configured();
    let mut health = DatabaseHealth {
        status: "unconfigured".to_string(),
        configured,
        table: USERS_TABLE.to_string(),
        latency_ms: None,
        error: None,
        timestamp: Utc::now(),
    };

    if !configured {
        return Json(health);
    }

    let start = std::time::Instant::now();
    let probe = QuerySpec::new().select("id").limit(1);
    match state.db.query(USERS_TABLE, probe).await {
        Ok(_) => {
            health.status = "healthy".to_string();
            health.latency_ms = Some(start.elapsed().as_millis() as u64);
        }
        Err(e) => {
            tracing::warn!(error = %e, "数据库连接检查失败");
            health.status = "unhealthy".to_string();
            health.error = Some(e.to_string());
        }
    }

    Json(health)
}

/// 列出用户
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "用户列表", body = ApiResponse<Vec<User>>),
        (status = 422, description = "查询参数无效"),
        (status = 503, description = "Supabase 未配置")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ApiResponse<Vec<User>>>, AppError> {
    let service = UserService::new(state.db);
    let data = service.list(query).await?;
    Ok(Json(respond(data, &request_id)))
}

/// 创建用户
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "用户已创建", body = ApiResponse<User>),
        (status = 409, description = "用户已存在"),
        (status = 422, description = "请求体校验失败")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let service = UserService::new(state.db);
    let data = service.create(req).await?;
    Ok(Json(respond(data, &request_id)))
}

/// 根据 ID 获取用户
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(
        ("id" = String, Path, description = "用户 ID")
    ),
    responses(
        (status = 200, description = "用户详情", body = ApiResponse<User>),
        (status = 404, description = "用户未找到")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let service = UserService::new(state.db);
    let data = service.get(&id).await?;
    Ok(Json(respond(data, &request_id)))
}

/// 更新用户
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    tag = "users",
    params(
        ("id" = String, Path, description = "用户 ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "用户已更新", body = ApiResponse<User>),
        (status = 404, description = "用户未找到")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let service = UserService::new(state.db);
    let data = service.update(&id, req).await?;
    Ok(Json(respond(data, &request_id)))
}

/// 根据 ID 删除用户
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    params(
        ("id" = String, Path, description = "用户 ID")
    ),
    responses(
        (status = 200, description = "用户已删除", body = ApiResponse<bool>),
        (status = 404, description = "用户未找到")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    let service = UserService::new(state.db);
    service.delete(&id).await?;
    Ok(Json(respond(true, &request_id)))
}

fn respond<T: Serialize>(data: T, request_id: &RequestId) -> ApiResponse<T> {
    ApiResponse::ok_with_service(data, SERVICE_NAME).with_request_id(request_id.as_str())
}

/// 根端点响应
#[derive(Serialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
}

/// 健康检查响应
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// 服务状态
    pub status: String,
    /// 服务名称
    pub service: String,
    /// 服务版本
    pub version: String,
    /// 当前时间戳
    pub timestamp: DateTime<Utc>,
}

/// 数据库连接状态
#[derive(Serialize, ToSchema)]
pub struct DatabaseHealth {
    /// healthy / unhealthy / unconfigured
    pub status: String,
    /// SUPABASE_URL 与 SUPABASE_KEY 是否均已设置
    pub configured: bool,
    /// 探测使用的表
    pub table: String,
    /// 探测查询耗时（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// 错误信息（如果不健康）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 当前时间戳
    pub timestamp: DateTime<Utc>,
}
