/*!
 * JWT 认证中间件
 *
 * 从 `Authorization: Bearer <token>` 头或 `access_token` Cookie 中读取 access token，
 * 解析出的用户写入请求扩展，处理程序通过 [`RequireJWT::extract_user`] 读取。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::web;
 * use crate::middlewares::RequireJWT;
 *
 * web::resource("/create/")
 *     .wrap(RequireJWT::strict())    // 未登录返回 403
 *     .route(web::post().to(create_class));
 *
 * web::resource("/lesson_details/")
 *     .wrap(RequireJWT::optional())  // 允许匿名，由处理程序决定如何响应
 *     .route(web::post().to(lesson_details));
 * ```
 *
 * ## 认证流程
 *
 * 1. 提取 token 并校验签名、过期时间和类型
 * 2. 优先从对象缓存读取 `session:<token>` 对应的用户
 * 3. 缓存未命中时查询存储并回写缓存
 * 4. 严格模式下任何一步失败都返回 403；可选模式下以匿名身份继续
 */

use crate::cache::{CacheResult, ObjectCache, session_key};
use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::users::{User, UserRole};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info, warn};

use super::{LOGIN_REQUIRED_MESSAGE, create_error_response};

#[derive(Clone)]
pub struct RequireJWT {
    optional: bool,
}

impl RequireJWT {
    /// 必须登录
    pub fn strict() -> Self {
        Self { optional: false }
    }

    /// 允许匿名访问，已登录时同样写入用户
    pub fn optional() -> Self {
        Self { optional: true }
    }
}

// 提取并验证 access token，返回对应用户
async fn extract_and_validate_jwt(req: &ServiceRequest) -> Result<User, String> {
    let token = JwtUtils::extract_access_token(req.request())
        .ok_or_else(|| "Missing access token".to_string())?;

    let claims = JwtUtils::verify_access_token(&token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        "Invalid JWT token".to_string()
    })?;

    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone());

    if let Some(cache) = &cache {
        match cache.get::<User>(&session_key(&token)).await {
            CacheResult::Found(user) => return Ok(user),
            CacheResult::ExistsButNoValue => cache.remove(&session_key(&token)).await,
            CacheResult::NotFound => debug!("Session not cached, loading user from storage"),
        }
    }

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| "Storage not configured".to_string())?;

    let user_id = claims
        .user_id()
        .ok_or_else(|| "Invalid user ID in JWT".to_string())?;

    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(|e| {
            warn!("Failed to load user {} for session: {}", user_id, e);
            "Failed to retrieve user from storage".to_string()
        })?
        .ok_or_else(|| "User not found".to_string())?;

    if let Some(cache) = &cache {
        cache
            .insert(
                session_key(&token),
                &user,
                AppConfig::get().cache.default_ttl,
            )
            .await;
    }

    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
            optional: self.optional,
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
    optional: bool,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let optional = self.optional;
        Box::pin(async move {
            match extract_and_validate_jwt(&req).await {
                Ok(user) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) if optional => {
                    debug!("Anonymous request to {}: {}", req.path(), err);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::FORBIDDEN,
                            ErrorCode::Unauthorized,
                            LOGIN_REQUIRED_MESSAGE,
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取用户信息
impl RequireJWT {
    /// 从请求扩展中提取当前用户
    pub fn extract_user(req: &HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    /// 从请求扩展中提取用户ID
    pub fn extract_user_id(req: &HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }

    /// 从请求扩展中提取用户角色
    pub fn extract_user_role(req: &HttpRequest) -> Option<UserRole> {
        req.extensions().get::<User>().map(|user| user.role)
    }
}
