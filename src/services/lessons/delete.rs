use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::LessonService;
use super::form::{Access, load_lesson};
use crate::models::lessons::LessonDeleteContext;
use crate::models::{ApiResponse, ErrorCode};

pub async fn delete_form(
    service: &LessonService,
    request: &HttpRequest,
    lesson_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match load_lesson(&storage, request, lesson_id, Access::Manage).await {
        Ok((_, lesson, class)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            LessonDeleteContext {
                lesson,
                class_title: class.title,
            },
            "Confirm lesson deletion",
        ))),
        Err(resp) => Ok(resp),
    }
}

pub async fn delete_lesson(
    service: &LessonService,
    request: &HttpRequest,
    lesson_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let (user, _, class) = match load_lesson(&storage, request, lesson_id, Access::Manage).await {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };

    match storage.delete_lesson(lesson_id).await {
        Ok(true) => {
            info!(
                "Lesson {} of class {} deleted by user {}",
                lesson_id, class.id, user.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                serde_json::json!({ "class_id": class.id }),
                "Lesson deleted successfully.",
            )))
        }
        Ok(false) => Ok(super::super::not_found(
            ErrorCode::LessonNotFound,
            "Lesson not found.",
        )),
        Err(e) => Ok(super::super::internal_error("Lesson deletion failed", e)),
    }
}
