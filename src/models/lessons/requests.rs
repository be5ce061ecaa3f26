use serde::Deserialize;

use crate::models::common::de::{
    deserialize_optional_id, deserialize_optional_id_list, deserialize_some,
    deserialize_string_to_i64,
};

/// `POST /schedule/lesson_details/`
#[derive(Debug, Deserialize)]
pub struct LessonDetailsRequest {
    #[serde(rename = "lessonId", deserialize_with = "deserialize_string_to_i64")]
    pub lesson_id: i64,
}

/// 日历拖拽/弹窗提交的 JSON 局部更新
#[derive(Debug, Default, Deserialize)]
pub struct UpdateLessonRequest {
    #[serde(deserialize_with = "deserialize_string_to_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub meeting_link: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub teacher: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_id_list")]
    pub students: Option<Vec<i64>>,
    #[serde(default, deserialize_with = "deserialize_optional_id_list")]
    pub materials: Option<Vec<i64>>,
}

/// 课时创建/编辑表单
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LessonFormRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub materials: Vec<i64>,
}
