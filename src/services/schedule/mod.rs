pub mod calendar;
pub mod details;
pub mod update;

pub use calendar::{build_calendar_event, build_calendar_events};
pub use update::UpdateLessonFailure;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::storage::Storage;

pub struct ScheduleService {
    storage: Option<Arc<dyn Storage>>,
}

impl ScheduleService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from(request),
        }
    }

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    // 日历事件
    pub async fn calendar(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        calendar::handle_calendar(self, request).await
    }

    // 单个课时详情
    pub async fn lesson_details(
        &self,
        request: &HttpRequest,
        body: web::Bytes,
    ) -> ActixResult<HttpResponse> {
        details::handle_lesson_details(self, request, body).await
    }

    // 日历中的局部更新，JSON 或 multipart
    pub async fn update_lesson(
        &self,
        request: &HttpRequest,
        payload: web::Payload,
    ) -> ActixResult<HttpResponse> {
        update::handle_update_lesson(self, request, payload).await
    }
}
