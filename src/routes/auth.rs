use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::auth::{LoginRequest, RegisterRequest};
use crate::services::AuthService;

// 懒加载的全局 AuthService 实例
static AUTH_SERVICE: Lazy<AuthService> = Lazy::new(AuthService::new_lazy);

pub async fn register_form() -> ActixResult<HttpResponse> {
    AUTH_SERVICE.register_form().await
}

pub async fn register(
    req: HttpRequest,
    user_data: web::Json<RegisterRequest>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.register(user_data.into_inner(), &req).await
}

pub async fn login_form() -> ActixResult<HttpResponse> {
    AUTH_SERVICE.login_form().await
}

pub async fn login(
    req: HttpRequest,
    user_data: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.login(user_data.into_inner(), &req).await
}

pub async fn logout(request: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.logout(&request).await
}

pub async fn refresh_token(request: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.refresh_token(&request).await
}

pub async fn get_user(request: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.get_user(&request).await
}

// 配置路由
pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(
                web::resource("/register/")
                    .route(web::get().to(register_form))
                    .route(
                        web::post()
                            .to(register)
                            .wrap(middlewares::RateLimit::register()),
                    ),
            )
            .service(
                web::resource("/login/")
                    .route(web::get().to(login_form))
                    .route(web::post().to(login).wrap(middlewares::RateLimit::login())),
            )
            .service(
                web::resource("/logout/")
                    .route(web::get().to(logout))
                    .route(web::post().to(logout)),
            )
            .service(
                web::resource("/refresh/").route(
                    web::post()
                        .to(refresh_token)
                        .wrap(middlewares::RateLimit::refresh_token()),
                ),
            )
            .service(
                web::resource("/me/")
                    .wrap(middlewares::RequireJWT::strict())
                    .route(web::get().to(get_user)),
            ),
    );
}
