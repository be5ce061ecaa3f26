/*!
 * 匿名端点限流
 *
 * 登录、注册和刷新令牌按客户端地址做固定窗口计数，阈值来自 `rate_limit` 配置。
 *
 * ```rust,ignore
 * web::resource("/login/")
 *     .route(web::post().to(login).wrap(RateLimit::login()));
 * ```
 *
 * 超出阈值返回 429，并在 `Retry-After` 中给出距窗口结束的秒数。
 * 通过的请求带 `X-RateLimit-Limit` 与 `X-RateLimit-Remaining` 响应头。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::{HeaderName, HeaderValue},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::net::{IpAddr, SocketAddr};
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;

use super::create_error_response;
use crate::config::AppConfig;
use crate::models::ErrorCode;

// 键: 端点:客户端:窗口序号，值: 窗口内请求数
static WINDOW_COUNTERS: Lazy<Cache<String, u32>> = Lazy::new(|| {
    let window = AppConfig::get().rate_limit.window_secs.max(1);
    Cache::builder()
        .time_to_live(Duration::from_secs(window * 2))
        .max_capacity(100_000)
        .build()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Login,
    Register,
    Refresh,
}

impl Endpoint {
    fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Login => "login",
            Endpoint::Register => "register",
            Endpoint::Refresh => "refresh",
        }
    }

    fn limit(&self) -> u32 {
        let config = &AppConfig::get().rate_limit;
        match self {
            Endpoint::Login => config.login,
            Endpoint::Register => config.register,
            Endpoint::Refresh => config.refresh,
        }
    }
}

#[derive(Clone)]
pub struct RateLimit {
    endpoint: Endpoint,
}

impl RateLimit {
    pub fn login() -> Self {
        Self {
            endpoint: Endpoint::Login,
        }
    }

    pub fn register() -> Self {
        Self {
            endpoint: Endpoint::Register,
        }
    }

    pub fn refresh_token() -> Self {
        Self {
            endpoint: Endpoint::Refresh,
        }
    }
}

/// 客户端地址，优先使用代理转发的真实地址，端口不参与计数
fn client_addr(req: &ServiceRequest) -> String {
    let info = req.connection_info();
    match info.realip_remote_addr() {
        Some(raw) => raw
            .parse::<SocketAddr>()
            .map(|addr| addr.ip())
            .or_else(|_| raw.parse::<IpAddr>())
            .map(|ip| ip.to_string())
            .unwrap_or_else(|_| raw.to_string()),
        None => "unknown".to_string(),
    }
}

/// 当前窗口序号与距窗口结束的秒数
fn current_window(now: i64, window_secs: u64) -> (i64, u64) {
    let window = window_secs.max(1) as i64;
    let index = now.div_euclid(window);
    let remaining = (window - now.rem_euclid(window)) as u64;
    (index, remaining)
}

/// 计数加一并返回新值
async fn hit(key: String) -> u32 {
    WINDOW_COUNTERS
        .entry(key)
        .and_upsert_with(|existing| {
            let count = existing.map(|entry| entry.into_value()).unwrap_or(0);
            ready(count.saturating_add(1))
        })
        .await
        .into_value()
}

fn too_many_requests(retry_after: u64) -> HttpResponse {
    let mut response = create_error_response(
        StatusCode::TOO_MANY_REQUESTS,
        ErrorCode::RateLimitExceeded,
        "Too many requests. Please try again later.",
    );
    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static("retry-after"),
        HeaderValue::from(retry_after),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-remaining"),
        HeaderValue::from(0u32),
    );
    response
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            endpoint: self.endpoint,
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    endpoint: Endpoint,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let endpoint = self.endpoint;

        Box::pin(async move {
            let limit = endpoint.limit();
            let window_secs = AppConfig::get().rate_limit.window_secs;
            let (window, retry_after) =
                current_window(chrono::Utc::now().timestamp(), window_secs);
            let client = client_addr(&req);

            let count = hit(format!("{}:{}:{}", endpoint.as_str(), client, window)).await;
            if count > limit {
                warn!(
                    "Rate limit exceeded on {} for {} ({}/{})",
                    endpoint.as_str(),
                    client,
                    count,
                    limit
                );
                return Ok(req.into_response(too_many_requests(retry_after).map_into_right_body()));
            }

            let mut res = srv.call(req).await?;
            let headers = res.headers_mut();
            headers.insert(
                HeaderName::from_static("x-ratelimit-limit"),
                HeaderValue::from(limit),
            );
            headers.insert(
                HeaderName::from_static("x-ratelimit-remaining"),
                HeaderValue::from(limit - count),
            );
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};

    #[::core::prelude::v1::test]
    fn test_current_window() {
        assert_eq!(current_window(120, 60), (2, 60));
        assert_eq!(current_window(125, 60), (2, 55));
        assert_eq!(current_window(179, 60), (2, 1));
        // 窗口长度为 0 时按 1 秒处理
        assert_eq!(current_window(7, 0), (7, 1));
    }

    #[::core::prelude::v1::test]
    fn test_endpoint_limits_from_config() {
        assert_eq!(Endpoint::Login.limit(), 5);
        assert_eq!(Endpoint::Register.limit(), 3);
        assert_eq!(Endpoint::Refresh.limit(), 10);
    }

    #[actix_web::test]
    async fn test_register_limit_per_client() {
        let app = test::init_service(App::new().service(
            web::resource("/register/").route(
                web::post()
                    .to(|| async { HttpResponse::Ok().finish() })
                    .wrap(RateLimit::register()),
            ),
        ))
        .await;

        let client: SocketAddr = "10.250.0.1:5000".parse().unwrap();
        for expected_remaining in ["2", "1", "0"] {
            let req = test::TestRequest::post()
                .uri("/register/")
                .peer_addr(client)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(
                resp.headers().get("x-ratelimit-remaining").unwrap(),
                expected_remaining
            );
        }

        let req = test::TestRequest::post()
            .uri("/register/")
            .peer_addr(client)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(resp.headers().contains_key("retry-after"));

        // 其他客户端不受影响
        let req = test::TestRequest::post()
            .uri("/register/")
            .peer_addr("10.250.0.2:5000".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
