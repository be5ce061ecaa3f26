//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod classes;
mod lessons;
mod materials;
mod schedules;
mod users;

use crate::config::AppConfig;
use crate::errors::{HesoError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按配置创建存储实例并运行迁移
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(&config.database.url, config.database.pool_size, config.database.timeout)
            .await
    }

    /// 使用指定 URL 创建存储实例，测试中用于 `sqlite::memory:`
    pub async fn from_url(url: &str) -> Result<Self> {
        Self::connect(url, 1, 30).await
    }

    async fn connect(url: &str, pool_size: u32, timeout: u64) -> Result<Self> {
        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, pool_size, timeout).await?
        } else {
            Self::connect_generic(&db_url, pool_size, timeout).await?
        };

        Migrator::up(&db, None)
            .await
            .map_err(|e| HesoError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");

        let mut opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| HesoError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let mut pool = SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(timeout));

        if in_memory {
            // 内存库只存在于单个连接中，连接不能被回收
            pool = pool
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            opt = opt
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("cache_size", "-64000")
                .pragma("temp_store", "memory")
                .pragma("wal_autocheckpoint", "1000");
            pool = pool
                .max_connections(pool_size)
                .min_connections(1)
                .test_before_acquire(true)
                .idle_timeout(Duration::from_secs(300));
        }

        let pool = pool
            .connect_with(opt)
            .await
            .map_err(|e| HesoError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(timeout))
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| HesoError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url.ends_with(".sqlite3") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(HesoError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite:, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    classes::{ClassListQuery, ClassListResponse, ClassUpdate, EnglishClass, NewClass},
    lessons::{CalendarData, Lesson, LessonInput, LessonPatch},
    materials::{Material, MaterialSummary, NewMaterial},
    schedules::{Schedule, ScheduleInput},
    users::{CreateUserRequest, User, UserRole},
};
use crate::storage::Storage;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>> {
        self.list_users_by_role_impl(role).await
    }

    async fn list_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.list_users_by_ids_impl(ids).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    // 班级模块
    async fn create_class_with_schedule(
        &self,
        class: NewClass,
        schedule: ScheduleInput,
    ) -> Result<EnglishClass> {
        self.create_class_with_schedule_impl(class, schedule).await
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<EnglishClass>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn list_classes_with_pagination(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        self.list_classes_with_pagination_impl(query).await
    }

    async fn update_class_with_schedule(
        &self,
        class_id: i64,
        update: ClassUpdate,
        schedule: ScheduleInput,
    ) -> Result<Option<EnglishClass>> {
        self.update_class_with_schedule_impl(class_id, update, schedule)
            .await
    }

    async fn delete_class(&self, class_id: i64) -> Result<bool> {
        self.delete_class_impl(class_id).await
    }

    async fn get_canonical_schedule(&self, class_id: i64) -> Result<Option<Schedule>> {
        self.get_canonical_schedule_impl(class_id).await
    }

    async fn list_used_colors(&self, exclude_class_id: Option<i64>) -> Result<HashSet<String>> {
        self.list_used_colors_impl(exclude_class_id).await
    }

    async fn count_lessons_for_class(&self, class_id: i64) -> Result<u64> {
        self.count_lessons_for_class_impl(class_id).await
    }

    // 课时模块
    async fn create_lesson(&self, class_id: i64, lesson: LessonInput) -> Result<Lesson> {
        self.create_lesson_impl(class_id, lesson).await
    }

    async fn get_lesson_by_id(&self, lesson_id: i64) -> Result<Option<Lesson>> {
        self.get_lesson_by_id_impl(lesson_id).await
    }

    async fn list_lessons_for_class(&self, class_id: i64) -> Result<Vec<Lesson>> {
        self.list_lessons_for_class_impl(class_id).await
    }

    async fn update_lesson(&self, lesson_id: i64, lesson: LessonInput) -> Result<Option<Lesson>> {
        self.update_lesson_impl(lesson_id, lesson).await
    }

    async fn delete_lesson(&self, lesson_id: i64) -> Result<bool> {
        self.delete_lesson_impl(lesson_id).await
    }

    async fn apply_lesson_patch(&self, lesson_id: i64, patch: LessonPatch) -> Result<Lesson> {
        self.apply_lesson_patch_impl(lesson_id, patch).await
    }

    async fn load_calendar_data(&self, class_id: Option<i64>) -> Result<CalendarData> {
        self.load_calendar_data_impl(class_id).await
    }

    // 资料模块
    async fn list_materials(&self) -> Result<Vec<Material>> {
        self.list_materials_impl().await
    }

    async fn create_material(&self, material: NewMaterial) -> Result<Material> {
        self.create_material_impl(material).await
    }

    async fn get_or_create_material(&self, material: NewMaterial) -> Result<Material> {
        self.get_or_create_material_impl(material).await
    }

    async fn link_material(&self, lesson_id: i64, material_id: i64) -> Result<()> {
        self.link_material_impl(lesson_id, material_id).await
    }

    async fn list_materials_for_lessons(
        &self,
        lesson_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<MaterialSummary>>> {
        self.list_materials_for_lessons_impl(lesson_ids).await
    }
}
