use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassService;
use super::form::{class_detail, load_managed_class};
use crate::models::classes::ClassDeleteContext;
use crate::models::{ApiResponse, ErrorCode};

pub async fn delete_form(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let class = match load_managed_class(&storage, request, class_id).await {
        Ok(class) => class,
        Err(resp) => return Ok(resp),
    };

    let result = async {
        let lesson_count = storage.count_lessons_for_class(class_id).await?;
        let class = class_detail(&storage, class).await?;
        Ok::<_, crate::errors::HesoError>(ClassDeleteContext {
            class,
            lesson_count,
        })
    }
    .await;

    match result {
        Ok(context) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            context,
            "Confirm class deletion",
        ))),
        Err(e) => Ok(super::super::internal_error("Failed to load class", e)),
    }
}

pub async fn delete_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(resp) = load_managed_class(&storage, request, class_id).await {
        return Ok(resp);
    }

    match storage.delete_class(class_id).await {
        Ok(true) => {
            info!("Class {} deleted", class_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Class deleted successfully.",
            )))
        }
        Ok(false) => Ok(super::super::not_found(
            ErrorCode::ClassNotFound,
            "Class not found.",
        )),
        Err(e) => Ok(super::super::internal_error("Class deletion failed", e)),
    }
}
