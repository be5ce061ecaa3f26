use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use super::ScheduleService;
use super::calendar::build_calendar_event;
use crate::middlewares::{LOGIN_REQUIRED_MESSAGE, RequireJWT};
use crate::models::lessons::{LessonAjaxResponse, LessonDetailsRequest};

const INVALID_REQUEST_MESSAGE: &str = "Invalid lesson request.";
const LOAD_FAILED_MESSAGE: &str = "Unable to load the lesson.";

pub async fn handle_lesson_details(
    service: &ScheduleService,
    request: &HttpRequest,
    body: web::Bytes,
) -> ActixResult<HttpResponse> {
    // 先鉴权再解析请求体，匿名请求无论内容都得到 403
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(HttpResponse::Forbidden().json(LessonAjaxResponse::error(LOGIN_REQUIRED_MESSAGE)));
    };

    let lesson_id = match serde_json::from_slice::<LessonDetailsRequest>(&body) {
        Ok(details) => details.lesson_id,
        Err(e) => {
            tracing::debug!("Rejected lesson details body: {}", e);
            return Ok(HttpResponse::BadRequest()
                .json(LessonAjaxResponse::error(INVALID_REQUEST_MESSAGE)));
        }
    };
    let storage = service.get_storage(request)?;

    let lesson = match storage.get_lesson_by_id(lesson_id).await {
        Ok(Some(lesson)) => lesson,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(LessonAjaxResponse::error("Lesson not found.")));
        }
        Err(e) => {
            tracing::error!("Failed to load lesson {}: {}", lesson_id, e);
            return Ok(HttpResponse::InternalServerError()
                .json(LessonAjaxResponse::error(LOAD_FAILED_MESSAGE)));
        }
    };

    let data = match storage.load_calendar_data(Some(lesson.class_id)).await {
        Ok(data) => data,
        Err(e) => {
            tracing::error!("Failed to load lesson {}: {}", lesson_id, e);
            return Ok(HttpResponse::InternalServerError()
                .json(LessonAjaxResponse::error(LOAD_FAILED_MESSAGE)));
        }
    };

    let visible = data
        .classes
        .get(&lesson.class_id)
        .is_some_and(|class| class.is_visible_to(&user));
    if !visible {
        return Ok(HttpResponse::Forbidden().json(LessonAjaxResponse::error(
            "You do not have permission to view this lesson.",
        )));
    }

    match build_calendar_event(&data, lesson_id) {
        Some(event) => Ok(HttpResponse::Ok().json(LessonAjaxResponse::success(
            "Lesson details retrieved successfully.",
            event,
        ))),
        None => Ok(HttpResponse::NotFound().json(LessonAjaxResponse::error("Lesson not found."))),
    }
}
