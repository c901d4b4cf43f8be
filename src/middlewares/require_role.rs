/*!
 * 基于角色的访问控制中间件
 *
 * 必须放在 RequireJWT 之后使用（actix 中后 wrap 的先执行，所以写在 RequireJWT 之前）。
 *
 * ```rust,ignore
 * web::scope("/teacher")
 *     .wrap(RequireRole::new_any(UserRole::teacher_roles()).redirect_to("/dashboard"))
 *     .wrap(RequireJWT::redirect_to_login())
 * ```
 *
 * 默认拒绝时返回 403 JSON；页面作用域可用 `redirect_to` 改为带提示的 303 跳转。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::models::{
    ErrorCode, FlashMessage,
    users::entities::{User, UserRole},
};
use crate::utils::flash::redirect_with_flash;

use super::create_error_response;

#[derive(Clone)]
pub struct RequireRole {
    allowed_roles: Vec<UserRole>,
    redirect: Option<String>,
}

impl RequireRole {
    /// 只允许单一角色
    pub fn new(role: &UserRole) -> Self {
        Self {
            allowed_roles: vec![*role],
            redirect: None,
        }
    }

    /// 允许任一角色
    pub fn new_any(roles: &[&UserRole]) -> Self {
        Self {
            allowed_roles: roles.iter().map(|r| **r).collect(),
            redirect: None,
        }
    }

    /// 拒绝时跳转到指定页面而不是返回 403
    pub fn redirect_to(mut self, location: &str) -> Self {
        self.redirect = Some(location.to_string());
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            allowed_roles: self.allowed_roles.clone(),
            redirect: self.redirect.clone(),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    allowed_roles: Vec<UserRole>,
    redirect: Option<String>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
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
        let allowed_roles = self.allowed_roles.clone();
        let redirect = self.redirect.clone();

        Box::pin(async move {
            let user = req.extensions().get::<User>().map(|u| (u.id, u.role));

            let Some((user_id, role)) = user else {
                info!(
                    "Role check failed: no user in request to {}. Make sure RequireJWT is applied first.",
                    req.path()
                );
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        "Authentication required",
                    )
                    .map_into_right_body(),
                ));
            };

            if allowed_roles.contains(&role) {
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            info!(
                "Access denied for user {} (role: {}). Allowed roles: {:?}",
                user_id, role, allowed_roles
            );
            let response = match redirect {
                Some(location) => redirect_with_flash(
                    &location,
                    FlashMessage::error("You do not have access to that page."),
                ),
                None => create_error_response(
                    StatusCode::FORBIDDEN,
                    ErrorCode::Forbidden,
                    "Access denied.",
                ),
            };
            Ok(req.into_response(response.map_into_right_body()))
        })
    }
}
