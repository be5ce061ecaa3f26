use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::LessonService;
use super::form::{Access, load_lesson, validate_lesson_form};
use crate::models::lessons::LessonFormRequest;
use crate::models::{ApiResponse, ErrorCode};

pub async fn update_lesson(
    service: &LessonService,
    request: &HttpRequest,
    lesson_id: i64,
    lesson_form: LessonFormRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let (user, _, _) = match load_lesson(&storage, request, lesson_id, Access::Manage).await {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };

    let input = match validate_lesson_form(&lesson_form) {
        Ok(input) => input,
        Err(errors) => return Ok(super::super::form_errors(errors)),
    };

    match storage.update_lesson(lesson_id, input).await {
        Ok(Some(lesson)) => {
            info!("Lesson {} updated by user {}", lesson_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                lesson,
                "Lesson updated successfully.",
            )))
        }
        Ok(None) => Ok(super::super::not_found(
            ErrorCode::LessonNotFound,
            "Lesson not found.",
        )),
        Err(e) => Ok(super::super::internal_error("Lesson update failed", e)),
    }
}
