use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::models::ApiResponse;
use crate::models::classes::{ClassListQuery, HomeResponse};

pub async fn list_classes(
    service: &ClassService,
    request: &HttpRequest,
    query: ClassListQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.list_classes_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Class list retrieved successfully",
        ))),
        Err(e) => Ok(super::super::internal_error("Failed to list classes", e)),
    }
}

pub async fn home(service: &ClassService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage
        .list_classes_with_pagination(ClassListQuery::default())
        .await
    {
        Ok(classes) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            HomeResponse {
                system_name: service.get_config().app.system_name.clone(),
                classes,
            },
            "Welcome",
        ))),
        Err(e) => Ok(super::super::internal_error("Failed to load home page", e)),
    }
}
