use serde::Deserialize;

use crate::models::common::PaginationQuery;

// 班级列表查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassListQuery {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

/// 班级表单（同时包含主安排字段），创建与更新共用
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassFormRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub teacher: Option<i64>,
    #[serde(default)]
    pub students: Vec<i64>,
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}
