/*!
 * JWT 认证中间件
 *
 * 从 `Authorization: Bearer <token>` 头或 `access_token` Cookie 中读取访问令牌，
 * 校验通过后把当前用户写入请求扩展。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::{web, App};
 * use crate::middlewares::RequireJWT;
 *
 * App::new()
 *     // JSON 接口：未登录返回 401
 *     .service(web::scope("/api/v1/enrollments").wrap(RequireJWT::required()))
 *     // 页面：未登录 303 跳转到 /login 并附带提示
 *     .service(web::scope("/student").wrap(RequireJWT::redirect_to_login()))
 *     // 公共页面：已登录时附带用户，未登录照常访问
 *     .service(web::scope("").wrap(RequireJWT::optional()))
 * ```
 *
 * 处理程序中通过 `RequireJWT::extract_user_claims(&req)` 读取当前用户。
 */

use crate::models::users::entities::{User, UserRole};
use crate::models::{ErrorCode, FlashMessage};
use crate::storage::Storage;
use crate::utils::flash::redirect_with_flash;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info};

use super::create_error_response;

/// 认证失败时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// 返回 401 JSON
    Required,
    /// 303 跳转到登录页
    RedirectToLogin,
    /// 不拦截，仅在令牌有效时附带用户
    Optional,
}

#[derive(Clone)]
pub struct RequireJWT {
    mode: AuthMode,
}

impl RequireJWT {
    pub fn required() -> Self {
        Self {
            mode: AuthMode::Required,
        }
    }

    pub fn redirect_to_login() -> Self {
        Self {
            mode: AuthMode::RedirectToLogin,
        }
    }

    pub fn optional() -> Self {
        Self {
            mode: AuthMode::Optional,
        }
    }
}

// 提取并验证 access token，返回数据库中的最新用户信息
async fn extract_and_validate_jwt(req: &ServiceRequest) -> Result<User, String> {
    let token = JwtUtils::extract_access_token(req.request())
        .ok_or_else(|| "Missing access token".to_string())?;

    let claims = JwtUtils::verify_access_token(&token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        "Invalid access token".to_string()
    })?;

    let user_id = claims
        .user_id()
        .ok_or_else(|| "Invalid user ID in token".to_string())?;

    let storage = req
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .expect("Storage not found in app data")
        .get_ref()
        .clone();

    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(|_| "Failed to retrieve user from storage".to_string())?
        .ok_or_else(|| "User not found".to_string())?;

    if !user.is_active {
        return Err("User is not active".to_string());
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
            mode: self.mode,
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
    mode: AuthMode,
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
        let mode = self.mode;
        Box::pin(async move {
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match extract_and_validate_jwt(&req).await {
                Ok(user) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                Err(err) => match mode {
                    AuthMode::Optional => Ok(srv.call(req).await?.map_into_left_body()),
                    AuthMode::Required => {
                        info!(
                            "JWT authentication failed for request to {}: {}",
                            req.path(),
                            err
                        );
                        Ok(req.into_response(
                            create_error_response(
                                StatusCode::UNAUTHORIZED,
                                ErrorCode::Unauthorized,
                                "Authentication required",
                            )
                            .map_into_right_body(),
                        ))
                    }
                    AuthMode::RedirectToLogin => {
                        info!(
                            "Redirecting unauthenticated request to {} to login: {}",
                            req.path(),
                            err
                        );
                        Ok(req.into_response(
                            redirect_with_flash(
                                "/login",
                                FlashMessage::error("Please log in to continue."),
                            )
                            .map_into_right_body(),
                        ))
                    }
                },
            }
        })
    }
}

// 辅助函数：从请求扩展中读取当前用户
impl RequireJWT {
    /// 当前用户（中间件校验通过后存在）
    pub fn extract_user_claims(req: &HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    pub fn extract_user_id(req: &HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }

    pub fn extract_user_role(req: &HttpRequest) -> Option<UserRole> {
        req.extensions().get::<User>().map(|user| user.role)
    }
}
