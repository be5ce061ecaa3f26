use serde::Serialize;

use super::entities::EnglishClass;
use crate::models::common::PaginatedResponse;
use crate::models::schedules::Schedule;
use crate::models::users::UserSummary;

/// 班级列表项
#[derive(Debug, Clone, Serialize)]
pub struct ClassSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub color: String,
    pub teacher: UserSummary,
    pub number_of_students: usize,
    pub schedule: Option<Schedule>,
}

pub type ClassListResponse = PaginatedResponse<ClassSummary>;

/// 班级详情（含成员与主安排）
#[derive(Debug, Clone, Serialize)]
pub struct ClassDetail {
    #[serde(flatten)]
    pub class: EnglishClass,
    pub teacher: UserSummary,
    pub students: Vec<UserSummary>,
    pub schedule: Option<Schedule>,
}

/// 创建/编辑班级表单的上下文
#[derive(Debug, Clone, Serialize)]
pub struct ClassFormContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<ClassDetail>,
    pub teachers: Vec<UserSummary>,
    pub students: Vec<UserSummary>,
    pub default_color: &'static str,
}

/// 删除确认页的上下文
#[derive(Debug, Clone, Serialize)]
pub struct ClassDeleteContext {
    pub class: ClassDetail,
    pub lesson_count: u64,
}

/// 首页
#[derive(Debug, Clone, Serialize)]
pub struct HomeResponse {
    pub system_name: String,
    pub classes: ClassListResponse,
}
