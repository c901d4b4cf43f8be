use actix_web::{HttpResponse, Result as ActixResult};

use crate::models::ApiResponse;
use crate::utils::jwt::{ACCESS_TOKEN_COOKIE, JwtUtils, REFRESH_TOKEN_COOKIE};

/// 清除两个令牌 Cookie
pub async fn handle_logout() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok()
        .cookie(JwtUtils::create_expired_cookie(ACCESS_TOKEN_COOKIE))
        .cookie(JwtUtils::create_expired_cookie(REFRESH_TOKEN_COOKIE))
        .json(ApiResponse::<()>::success_empty("Logged out")))
}
