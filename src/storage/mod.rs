use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::models::{
    classes::{ClassListQuery, ClassListResponse, ClassUpdate, EnglishClass, NewClass},
    lessons::{CalendarData, Lesson, LessonInput, LessonPatch},
    materials::{Material, MaterialSummary, NewMaterial},
    schedules::{Schedule, ScheduleInput},
    users::{CreateUserRequest, User, UserRole},
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 按角色列出用户，按用户名排序
    async fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>>;
    // 按 ID 批量获取用户
    async fn list_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;

    /// 班级管理方法
    // 创建班级及其主安排（同一事务）
    async fn create_class_with_schedule(
        &self,
        class: NewClass,
        schedule: ScheduleInput,
    ) -> Result<EnglishClass>;
    // 通过ID获取班级信息
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<EnglishClass>>;
    // 分页列出班级，可按标题搜索
    async fn list_classes_with_pagination(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse>;
    // 更新班级、成员及主安排（同一事务）
    async fn update_class_with_schedule(
        &self,
        class_id: i64,
        update: ClassUpdate,
        schedule: ScheduleInput,
    ) -> Result<Option<EnglishClass>>;
    // 删除班级及其安排、课时、成员和资料关联
    async fn delete_class(&self, class_id: i64) -> Result<bool>;
    // 班级的主安排（id 最小）
    async fn get_canonical_schedule(&self, class_id: i64) -> Result<Option<Schedule>>;
    // 已被占用的颜色
    async fn list_used_colors(&self, exclude_class_id: Option<i64>) -> Result<HashSet<String>>;
    // 班级课时数量
    async fn count_lessons_for_class(&self, class_id: i64) -> Result<u64>;

    /// 课时管理方法
    // 创建课时并关联资料
    async fn create_lesson(&self, class_id: i64, lesson: LessonInput) -> Result<Lesson>;
    // 通过ID获取课时
    async fn get_lesson_by_id(&self, lesson_id: i64) -> Result<Option<Lesson>>;
    // 列出班级全部课时，按 (start_time, id) 排序
    async fn list_lessons_for_class(&self, class_id: i64) -> Result<Vec<Lesson>>;
    // 表单整体更新课时，资料关联整体替换
    async fn update_lesson(&self, lesson_id: i64, lesson: LessonInput) -> Result<Option<Lesson>>;
    // 删除课时
    async fn delete_lesson(&self, lesson_id: i64) -> Result<bool>;
    // 日历局部更新（同一事务），失败返回 NotFound / Validation 等错误
    async fn apply_lesson_patch(&self, lesson_id: i64, patch: LessonPatch) -> Result<Lesson>;
    // 日历所需的课时、班级、用户和资料，`class_id` 为空时加载全部
    async fn load_calendar_data(&self, class_id: Option<i64>) -> Result<CalendarData>;

    /// 资料管理方法
    // 列出全部资料
    async fn list_materials(&self) -> Result<Vec<Material>>;
    // 创建资料
    async fn create_material(&self, material: NewMaterial) -> Result<Material>;
    // 按 (标题, 类型, 内容摘要) 查找或创建资料
    async fn get_or_create_material(&self, material: NewMaterial) -> Result<Material>;
    // 关联资料到课时，已关联时忽略
    async fn link_material(&self, lesson_id: i64, material_id: i64) -> Result<()>;
    // 批量获取课时的资料
    async fn list_materials_for_lessons(
        &self,
        lesson_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<MaterialSummary>>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
