use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entities::{Lesson, LessonLocation};
use crate::models::materials::MaterialSummary;
use crate::models::users::UserSummary;

/// 日历前端使用的事件格式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: i64,
    /// `<班级> (<序号>/<总数>) | <教师>`
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(rename = "backgroundColor")]
    pub background_color: String,
    #[serde(rename = "extendedProps")]
    pub extended_props: CalendarEventProps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEventProps {
    pub class_topic: String,
    pub description: Option<String>,
    pub meeting_link: Option<String>,
    pub location: LessonLocation,
    pub teacher_id: i64,
    pub teachers: Vec<UserSummary>,
    pub students: Vec<UserSummary>,
    pub materials: Vec<MaterialSummary>,
}

/// 日历 AJAX 接口的响应外壳 `{status, message, lesson?}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonAjaxResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson: Option<CalendarEvent>,
}

impl LessonAjaxResponse {
    pub fn success(message: impl Into<String>, lesson: CalendarEvent) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            lesson: Some(lesson),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            lesson: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonListItem {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub lesson_number: usize,
    pub total_lessons: usize,
    pub materials: Vec<MaterialSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonListResponse {
    pub class_id: i64,
    pub class_title: String,
    pub can_manage: bool,
    pub lessons: Vec<LessonListItem>,
}

/// 课时表单上下文
#[derive(Debug, Clone, Serialize)]
pub struct LessonFormContext {
    pub class_id: i64,
    pub class_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson: Option<Lesson>,
    pub selected_materials: Vec<i64>,
    pub materials: Vec<MaterialSummary>,
    pub location_choices: &'static [&'static str],
    pub status_choices: &'static [&'static str],
    /// 无编辑权限时前端禁用的字段
    pub disabled_fields: Vec<&'static str>,
}

impl LessonFormContext {
    pub const FIELDS: &'static [&'static str] = &[
        "title",
        "description",
        "start_time",
        "end_time",
        "location",
        "meeting_link",
        "status",
        "materials",
    ];
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonDeleteContext {
    pub lesson: Lesson,
    pub class_title: String,
}
