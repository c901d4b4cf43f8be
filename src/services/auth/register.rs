use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::RegisterRequest,
    users::{entities::UserRole, requests::CreateUserRequest},
};
use crate::utils::password::hash_password;
use crate::utils::validate::{normalize_email, validate_email, validate_name, validate_password};

use super::AuthService;
use super::login::issue_session;

/// 公开注册只创建学生账号，成功后直接登录
pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let email = normalize_email(&register_request.email);
    let name = register_request.name.trim().to_string();

    if let Err(msg) = validate_name(&name) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
    }
    if let Err(msg) = validate_email(&email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }
    if let Err(msg) = validate_password(&register_request.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
    }

    match storage.get_user_by_email(&email).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserEmailAlreadyExists,
                "Email already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Register lookup failed: {}", e);
            return Ok(register_failed());
        }
    }

    let password_hash = match hash_password(&register_request.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("Password hashing failed: {}", e);
            return Ok(register_failed());
        }
    };

    let user = match storage
        .create_user(CreateUserRequest {
            name,
            email,
            password: password_hash,
            role: UserRole::Student,
        })
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Failed to create user: {}", e);
            return Ok(register_failed());
        }
    };

    tracing::info!("Student {} registered", user.id);
    let mut response = issue_session(service, user, false, "Registration successful")?;
    if response.status().is_success() {
        *response.status_mut() = StatusCode::CREATED;
    }
    Ok(response)
}

fn register_failed() -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::RegisterFailed,
        "Registration failed, please try again later",
    ))
}
