use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::cache::session_key;
use crate::models::ApiResponse;
use crate::utils::jwt::{ACCESS_TOKEN_COOKIE, JwtUtils, REFRESH_TOKEN_COOKIE};

/// 处理用户登出
///
/// 清除 access/refresh Cookie 以及缓存中的会话。
pub async fn handle_logout(request: &HttpRequest) -> ActixResult<HttpResponse> {
    if let Some(token) = JwtUtils::extract_access_token(request)
        && let Some(cache) = super::super::cache_from(request)
    {
        cache.remove(&session_key(&token)).await;
    }

    Ok(HttpResponse::Ok()
        .cookie(JwtUtils::create_empty_cookie(ACCESS_TOKEN_COOKIE))
        .cookie(JwtUtils::create_empty_cookie(REFRESH_TOKEN_COOKIE))
        .json(ApiResponse::<()>::success_empty(
            "You have successfully logged out.",
        )))
}
