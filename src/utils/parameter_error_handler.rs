use actix_web::{HttpRequest, HttpResponse, error, error::InternalError};
use tracing::debug;

use crate::models::{ApiResponse, ErrorCode};

fn bad_request(message: String) -> error::Error {
    InternalError::from_response(
        message.clone(),
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}

/// 查询参数解析失败时返回统一格式的 400
pub fn query_error_handler(err: error::QueryPayloadError, req: &HttpRequest) -> error::Error {
    debug!("Invalid query string on {}: {}", req.path(), err);
    bad_request(format!("Invalid query parameters: {err}"))
}

/// JSON 请求体解析失败时返回统一格式的 400
pub fn json_error_handler(err: error::JsonPayloadError, req: &HttpRequest) -> error::Error {
    debug!("Invalid JSON body on {}: {}", req.path(), err);
    bad_request(format!("Invalid request body: {err}"))
}
