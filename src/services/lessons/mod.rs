pub mod create;
pub mod delete;
pub mod form;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::lessons::LessonFormRequest;
use crate::storage::Storage;

pub struct LessonService {
    storage: Option<Arc<dyn Storage>>,
}

impl LessonService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from(request),
        }
    }

    // 班级课时列表
    pub async fn list_lessons(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        list::list_lessons(self, request, class_id).await
    }

    // 新建课时表单
    pub async fn create_form(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        form::create_form(self, request, class_id).await
    }

    pub async fn create_lesson(
        &self,
        request: &HttpRequest,
        class_id: i64,
        lesson_form: LessonFormRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_lesson(self, request, class_id, lesson_form).await
    }

    // 编辑课时表单，无权限时字段只读
    pub async fn edit_form(
        &self,
        request: &HttpRequest,
        lesson_id: i64,
    ) -> ActixResult<HttpResponse> {
        form::edit_form(self, request, lesson_id).await
    }

    pub async fn update_lesson(
        &self,
        request: &HttpRequest,
        lesson_id: i64,
        lesson_form: LessonFormRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_lesson(self, request, lesson_id, lesson_form).await
    }

    // 删除确认
    pub async fn delete_form(
        &self,
        request: &HttpRequest,
        lesson_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_form(self, request, lesson_id).await
    }

    pub async fn delete_lesson(
        &self,
        request: &HttpRequest,
        lesson_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_lesson(self, request, lesson_id).await
    }
}
