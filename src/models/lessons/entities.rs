use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::classes::EnglishClass;
use crate::models::materials::{MaterialSummary, UploadedMaterial};
use crate::models::users::UserSummary;

// 上课地点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LessonLocation {
    #[default]
    OnSite,
    Online,
}

impl LessonLocation {
    pub const ON_SITE: &'static str = "on-site";
    pub const ONLINE: &'static str = "on-line";

    pub fn as_str(&self) -> &'static str {
        match self {
            LessonLocation::OnSite => Self::ON_SITE,
            LessonLocation::Online => Self::ONLINE,
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, LessonLocation::Online)
    }

    pub fn choices() -> &'static [&'static str] {
        &[Self::ON_SITE, Self::ONLINE]
    }
}

impl std::fmt::Display for LessonLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LessonLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            Self::ON_SITE => Ok(LessonLocation::OnSite),
            // 旧前端提交的是 "online"
            Self::ONLINE | "online" => Ok(LessonLocation::Online),
            other => Err(format!(
                "Select a valid choice. {other} is not one of the available choices."
            )),
        }
    }
}

impl Serialize for LessonLocation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LessonLocation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// 课时状态，不会根据时间自动流转
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    #[default]
    Planned,
    Completed,
    Cancelled,
}

impl LessonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonStatus::Planned => "planned",
            LessonStatus::Completed => "completed",
            LessonStatus::Cancelled => "cancelled",
        }
    }

    pub fn choices() -> &'static [&'static str] {
        &["planned", "completed", "cancelled"]
    }
}

impl std::fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LessonStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "planned" => Ok(LessonStatus::Planned),
            "completed" => Ok(LessonStatus::Completed),
            "cancelled" => Ok(LessonStatus::Cancelled),
            other => Err(format!(
                "Select a valid choice. {other} is not one of the available choices."
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub class_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub meeting_link: Option<String>,
    pub location: LessonLocation,
    pub status: LessonStatus,
}

impl Lesson {
    pub fn duration(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_time > now && self.status == LessonStatus::Planned
    }

    pub fn is_completed(&self, now: DateTime<Utc>) -> bool {
        self.end_time < now && self.status == LessonStatus::Completed
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == LessonStatus::Cancelled
    }
}

/// 写入用的课时字段，创建与表单更新共用
#[derive(Debug, Clone)]
pub struct LessonInput {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub meeting_link: Option<String>,
    pub location: LessonLocation,
    pub status: LessonStatus,
    pub material_ids: Vec<i64>,
}

/// 日历接口的局部更新
///
/// `None` 表示请求中未出现该字段，对应属性保持不变。
#[derive(Debug, Clone, Default)]
pub struct LessonPatch {
    pub description: Option<Option<String>>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<LessonLocation>,
    pub meeting_link: Option<String>,
    pub teacher_id: Option<i64>,
    pub student_ids: Option<Vec<i64>>,
    pub material_ids: Option<Vec<i64>>,
    pub new_materials: Vec<UploadedMaterial>,
}

impl LessonPatch {
    /// 应用地点规则后的会议链接：非线上课一律清空，线上课未提供时沿用原值
    pub fn resolve_meeting_link(
        &self,
        resulting_location: LessonLocation,
        current: Option<&str>,
    ) -> Option<String> {
        if !resulting_location.is_online() {
            return None;
        }
        match &self.meeting_link {
            Some(link) if !link.trim().is_empty() => Some(link.trim().to_string()),
            Some(_) => None,
            None => current.map(str::to_string),
        }
    }
}

/// 组装日历事件所需的全部数据，一次查询得到
#[derive(Debug, Clone, Default)]
pub struct CalendarData {
    pub lessons: Vec<Lesson>,
    pub classes: HashMap<i64, EnglishClass>,
    pub users: HashMap<i64, UserSummary>,
    pub materials_by_lesson: HashMap<i64, Vec<MaterialSummary>>,
    /// 所有教师，作为编辑弹窗的下拉选项
    pub teachers: Vec<UserSummary>,
}

/// 按班级计算每节课的 (序号, 总数)，序号按 (start_time, id) 排序，从 1 开始
pub fn lesson_ordinals(lessons: &[Lesson]) -> HashMap<i64, (usize, usize)> {
    let mut by_class: HashMap<i64, Vec<&Lesson>> = HashMap::new();
    for lesson in lessons {
        by_class.entry(lesson.class_id).or_default().push(lesson);
    }

    let mut ordinals = HashMap::with_capacity(lessons.len());
    for (_, mut group) in by_class {
        group.sort_by_key(|l| (l.start_time, l.id));
        let total = group.len();
        for (index, lesson) in group.into_iter().enumerate() {
            ordinals.insert(lesson.id, (index + 1, total));
        }
    }
    ordinals
}

/// 日历标题 `<班级> (<n>/<m>) | <教师>`
pub fn format_lesson_title(class_title: &str, number: usize, total: usize, teacher: &str) -> String {
    format!("{class_title} ({number}/{total}) | {teacher}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_aliases() {
        assert_eq!(
            "on-line".parse::<LessonLocation>().unwrap(),
            LessonLocation::Online
        );
        assert_eq!(
            "online".parse::<LessonLocation>().unwrap(),
            LessonLocation::Online
        );
        assert_eq!(
            "on-site".parse::<LessonLocation>().unwrap(),
            LessonLocation::OnSite
        );
        assert!("moon".parse::<LessonLocation>().is_err());
        assert_eq!(
            serde_json::to_string(&LessonLocation::Online).unwrap(),
            "\"on-line\""
        );
    }

    #[test]
    fn test_meeting_link_rules() {
        let patch = LessonPatch {
            meeting_link: Some("https://meet.google.com/abc".to_string()),
            ..Default::default()
        };
        // 非线上课总是清空
        assert_eq!(
            patch.resolve_meeting_link(LessonLocation::OnSite, Some("https://old")),
            None
        );
        assert_eq!(
            patch.resolve_meeting_link(LessonLocation::Online, Some("https://old")),
            Some("https://meet.google.com/abc".to_string())
        );

        let omitted = LessonPatch::default();
        assert_eq!(
            omitted.resolve_meeting_link(LessonLocation::Online, Some("https://old")),
            Some("https://old".to_string())
        );
        assert_eq!(
            omitted.resolve_meeting_link(LessonLocation::OnSite, Some("https://old")),
            None
        );
    }

    #[test]
    fn test_status_helpers() {
        let now = Utc::now();
        let lesson = Lesson {
            id: 1,
            class_id: 1,
            title: "Basic Grammar".to_string(),
            description: None,
            start_time: now + chrono::Duration::hours(1),
            end_time: now + chrono::Duration::hours(3),
            meeting_link: None,
            location: LessonLocation::OnSite,
            status: LessonStatus::Planned,
        };
        assert!(lesson.is_upcoming(now));
        assert!(!lesson.is_completed(now));
        assert!(!lesson.is_cancelled());
        assert_eq!(lesson.duration().num_hours(), 2);
    }

    fn lesson_at(id: i64, class_id: i64, hour: u32) -> Lesson {
        use chrono::TimeZone;
        let start = Utc.with_ymd_and_hms(2024, 3, 4, hour, 0, 0).unwrap();
        Lesson {
            id,
            class_id,
            title: format!("Lesson {id}"),
            description: None,
            start_time: start,
            end_time: start + chrono::Duration::hours(2),
            meeting_link: None,
            location: LessonLocation::OnSite,
            status: LessonStatus::Planned,
        }
    }

    #[test]
    fn test_lesson_ordinals_per_class() {
        // id 顺序与时间顺序不同，同一时间按 id 排
        let lessons = vec![
            lesson_at(1, 10, 14),
            lesson_at(2, 10, 9),
            lesson_at(3, 20, 9),
            lesson_at(4, 10, 9),
        ];
        let ordinals = lesson_ordinals(&lessons);
        assert_eq!(ordinals[&2], (1, 3));
        assert_eq!(ordinals[&4], (2, 3));
        assert_eq!(ordinals[&1], (3, 3));
        assert_eq!(ordinals[&3], (1, 1));
        assert_eq!(
            format_lesson_title("English 101", 2, 3, "teacher1"),
            "English 101 (2/3) | teacher1"
        );
    }
}
