use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::LessonService;
use super::form::{Access, load_class, validate_lesson_form};
use crate::models::ApiResponse;
use crate::models::lessons::LessonFormRequest;

pub async fn create_lesson(
    service: &LessonService,
    request: &HttpRequest,
    class_id: i64,
    lesson_form: LessonFormRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let (user, class) = match load_class(&storage, request, class_id, Access::Manage).await {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };

    let input = match validate_lesson_form(&lesson_form) {
        Ok(input) => input,
        Err(errors) => return Ok(super::super::form_errors(errors)),
    };

    match storage.create_lesson(class.id, input).await {
        Ok(lesson) => {
            info!(
                "Lesson {} created in class {} by user {}",
                lesson.id, class.id, user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                lesson,
                "Lesson created successfully.",
            )))
        }
        Err(e) => Ok(super::super::internal_error("Lesson creation failed", e)),
    }
}
