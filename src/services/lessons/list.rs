use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::LessonService;
use super::form::{Access, load_class};
use crate::models::ApiResponse;
use crate::models::lessons::{LessonListItem, LessonListResponse, lesson_ordinals};

pub async fn list_lessons(
    service: &LessonService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let (user, class) = match load_class(&storage, request, class_id, Access::Enrolled).await {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };

    let lessons = match storage.list_lessons_for_class(class_id).await {
        Ok(lessons) => lessons,
        Err(e) => return Ok(super::super::internal_error("Failed to list lessons", e)),
    };
    let lesson_ids: Vec<i64> = lessons.iter().map(|l| l.id).collect();
    let mut materials = match storage.list_materials_for_lessons(&lesson_ids).await {
        Ok(materials) => materials,
        Err(e) => return Ok(super::super::internal_error("Failed to list lessons", e)),
    };

    let ordinals = lesson_ordinals(&lessons);
    let items = lessons
        .into_iter()
        .map(|lesson| {
            let (lesson_number, total_lessons) =
                ordinals.get(&lesson.id).copied().unwrap_or((0, 0));
            LessonListItem {
                materials: materials.remove(&lesson.id).unwrap_or_default(),
                lesson,
                lesson_number,
                total_lessons,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        LessonListResponse {
            class_id: class.id,
            can_manage: class.is_managed_by(&user),
            class_title: class.title,
            lessons: items,
        },
        "Lesson list retrieved successfully",
    )))
}
