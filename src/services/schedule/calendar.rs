//! 日历事件组装
//!
//! 序号按班级一次排序得到，不对每节课重新计数。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;

use super::ScheduleService;
use crate::models::ApiResponse;
use crate::models::lessons::{
    CalendarData, CalendarEvent, CalendarEventProps, Lesson, format_lesson_title, lesson_ordinals,
};
use crate::models::users::UserSummary;

pub async fn handle_calendar(
    service: &ScheduleService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.load_calendar_data(None).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            build_calendar_events(&data),
            "Schedule retrieved successfully",
        ))),
        Err(e) => Ok(super::super::internal_error("Failed to load schedule", e)),
    }
}

/// 全部课时对应的事件，顺序与 `data.lessons` 一致
pub fn build_calendar_events(data: &CalendarData) -> Vec<CalendarEvent> {
    let ordinals = lesson_ordinals(&data.lessons);
    data.lessons
        .iter()
        .filter_map(|lesson| event_for(lesson, data, &ordinals))
        .collect()
}

/// 单个课时的事件，数据中没有该课时或其班级时返回 `None`
pub fn build_calendar_event(data: &CalendarData, lesson_id: i64) -> Option<CalendarEvent> {
    let lesson = data.lessons.iter().find(|l| l.id == lesson_id)?;
    let ordinals = lesson_ordinals(&data.lessons);
    event_for(lesson, data, &ordinals)
}

fn event_for(
    lesson: &Lesson,
    data: &CalendarData,
    ordinals: &HashMap<i64, (usize, usize)>,
) -> Option<CalendarEvent> {
    let class = data.classes.get(&lesson.class_id)?;
    let (number, total) = ordinals.get(&lesson.id).copied()?;
    let teacher_name = data
        .users
        .get(&class.teacher_id)
        .map(|u| u.username.as_str())
        .unwrap_or_default();

    let students: Vec<UserSummary> = class
        .student_ids
        .iter()
        .filter_map(|id| data.users.get(id).cloned())
        .collect();

    Some(CalendarEvent {
        id: lesson.id,
        title: format_lesson_title(&class.title, number, total, teacher_name),
        start: lesson.start_time,
        end: lesson.end_time,
        background_color: class.color.clone(),
        extended_props: CalendarEventProps {
            class_topic: lesson.title.clone(),
            description: lesson.description.clone(),
            meeting_link: lesson.meeting_link.clone(),
            location: lesson.location,
            teacher_id: class.teacher_id,
            teachers: data.teachers.clone(),
            students,
            materials: data
                .materials_by_lesson
                .get(&lesson.id)
                .cloned()
                .unwrap_or_default(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classes::EnglishClass;
    use crate::models::lessons::{LessonLocation, LessonStatus};
    use crate::models::materials::MaterialSummary;
    use chrono::{TimeZone, Utc};

    fn lesson(id: i64, class_id: i64, day: u32) -> Lesson {
        let start = Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap();
        Lesson {
            id,
            class_id,
            title: format!("Topic {id}"),
            description: Some("Reading".to_string()),
            start_time: start,
            end_time: start + chrono::Duration::hours(2),
            meeting_link: None,
            location: LessonLocation::OnSite,
            status: LessonStatus::Planned,
        }
    }

    fn summary(id: i64, name: &str) -> UserSummary {
        UserSummary {
            id,
            username: name.to_string(),
        }
    }

    fn data() -> CalendarData {
        let class = EnglishClass {
            id: 1,
            title: "English 101".to_string(),
            description: String::new(),
            color: "hsl(120, 100%, 30%)".to_string(),
            teacher_id: 2,
            student_ids: vec![5, 6],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut data = CalendarData {
            lessons: vec![lesson(11, 1, 6), lesson(10, 1, 4)],
            ..Default::default()
        };
        data.classes.insert(1, class);
        for user in [summary(2, "teacher1"), summary(5, "student1"), summary(6, "student2")] {
            data.users.insert(user.id, user);
        }
        data.teachers = vec![summary(2, "teacher1"), summary(3, "teacher2")];
        data.materials_by_lesson.insert(
            10,
            vec![MaterialSummary {
                id: 7,
                title: "Grammar in Use".to_string(),
            }],
        );
        data
    }

    #[test]
    fn test_event_titles_follow_start_time() {
        let events = build_calendar_events(&data());
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, 11);
        assert_eq!(events[0].title, "English 101 (2/2) | teacher1");
        assert_eq!(events[1].title, "English 101 (1/2) | teacher1");
    }

    #[test]
    fn test_event_props() {
        let event = build_calendar_event(&data(), 10).unwrap();
        let props = &event.extended_props;
        assert_eq!(event.background_color, "hsl(120, 100%, 30%)");
        assert_eq!(props.class_topic, "Topic 10");
        assert_eq!(props.teacher_id, 2);
        assert_eq!(props.teachers.len(), 2);
        assert_eq!(props.students, vec![summary(5, "student1"), summary(6, "student2")]);
        assert_eq!(props.materials[0].title, "Grammar in Use");

        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("backgroundColor").is_some());
        assert_eq!(json["extendedProps"]["location"], "on-site");
    }

    #[test]
    fn test_missing_lesson() {
        assert!(build_calendar_event(&data(), 99).is_none());
    }
}
