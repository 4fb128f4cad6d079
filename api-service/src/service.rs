//! 用户服务模块
//!
//! Typed layer over the generic adapter for the `users` table.

use async_trait::async_trait;
use validator::Validate;

use common::db::{self, Direction, QuerySpec, SupabaseDb};
use common::errors::{AppError, AppResult};
use common::models::user::{
    CreateUserRequest, ListUsersQuery, UpdateUserRequest, User, UserColumn, DEFAULT_LIST_LIMIT,
    USERS_TABLE,
};

/// 用户服务 Trait
#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    /// 列出用户
    async fn list(&self, query: ListUsersQuery) -> AppResult<Vec<User>>;

    /// 创建用户
    async fn create(&self, req: CreateUserRequest) -> AppResult<User>;

    /// 根据 ID 获取用户
    async fn get(&self, id: &str) -> AppResult<User>;

    /// 更新用户
    async fn update(&self, id: &str, req: UpdateUserRequest) -> AppResult<User>;

    /// 根据 ID 删除用户
    async fn delete(&self, id: &str) -> AppResult<()>;
}

/// 用户服务
pub struct UserService {
    db: SupabaseDb,
}

impl UserService {
    pub fn new(db: SupabaseDb) -> Self {
        Self { db }
    }
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("user {} not found", id))
}

#[async_trait]
impl UserServiceTrait for UserService {
    async fn list(&self, query: ListUsersQuery) -> AppResult<Vec<User>> {
        query.validate()?;

        let mut spec = QuerySpec::new().limit(query.limit.unwrap_or(DEFAULT_LIST_LIMIT));
        if let Some(email) = query.email {
            spec = spec.eq("email", email);
        }
        if let Some(raw) = query.order_by.as_deref() {
            let column: UserColumn = raw.parse()?;
            let direction = if query.desc { Direction::Desc } else { Direction::Asc };
            spec = spec.order_by(column.as_str(), direction);
        }

        let rows = self.db.query(USERS_TABLE, spec).await?;
        db::from_records(rows)
    }

    async fn create(&self, req: CreateUserRequest) -> AppResult<User> {
        req.validate()?;

        let row = self
            .db
            .insert(USERS_TABLE, db::to_record(&req)?)
            .await?
            .ok_or_else(|| AppError::external("Supabase returned no row for the inserted user"))?;
        let user: User = db::from_record(row)?;

        tracing::info!(id = %user.id, "用户已创建");
        Ok(user)
    }

    async fn get(&self, id: &str) -> AppResult<User> {
        self.db
            .select_one(USERS_TABLE, id, "*")
            .await?
            .map(db::from_record)
            .transpose()?
            .ok_or_else(|| not_found(id))
    }

    async fn update(&self, id: &str, req: UpdateUserRequest) -> AppResult<User> {
        req.validate()?;
        if req.is_empty() {
            return Err(AppError::Validation("no fields to update".to_string()));
        }

        let row = self
            .db
            .update(USERS_TABLE, id, db::to_record(&req)?)
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(id = %id, "用户已更新");
        db::from_record(row)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.db.delete(USERS_TABLE, id).await? {
            return Err(not_found(id));
        }
        tracing::info!(id = %id, "用户已删除");
        Ok(())
    }
}
