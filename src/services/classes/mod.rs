pub mod create;
pub mod delete;
pub mod form;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::classes::{ClassFormRequest, ClassListQuery};
use crate::storage::Storage;

pub struct ClassService {
    storage: Option<Arc<dyn Storage>>,
}

impl ClassService {
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

    // 首页
    pub async fn home(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::home(self, request).await
    }

    // 获取班级列表
    pub async fn list_classes(
        &self,
        request: &HttpRequest,
        query: ClassListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_classes(self, request, query).await
    }

    // 创建班级表单
    pub async fn create_form(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        form::create_form(self, request).await
    }

    pub async fn create_class(
        &self,
        request: &HttpRequest,
        class_form: ClassFormRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_class(self, request, class_form).await
    }

    // 编辑班级表单
    pub async fn update_form(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        form::update_form(self, request, class_id).await
    }

    // 更新班级信息及主安排
    pub async fn update_class(
        &self,
        request: &HttpRequest,
        class_id: i64,
        class_form: ClassFormRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_class(self, request, class_id, class_form).await
    }

    // 删除确认
    pub async fn delete_form(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_form(self, request, class_id).await
    }

    // 根据班级 ID 删除班级
    pub async fn delete_class(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_class(self, request, class_id).await
    }
}
