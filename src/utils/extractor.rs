//! 路径参数安全提取器
//!
//! 按名称读取路径参数并解析为正整数 ID，非法值直接返回 400。

use actix_web::{HttpResponse, error::InternalError};

use crate::models::{ApiResponse, ErrorCode};

/// 构造路径参数错误
pub fn invalid_path_param(name: &str) -> actix_web::Error {
    let message = format!("Invalid path parameter: {name}");
    InternalError::from_response(
        message.clone(),
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}

/// 解析正整数 ID
pub fn parse_positive_id(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.parse::<i64>().ok()).filter(|id| *id > 0)
}

/// 定义一个从路径参数 `$param` 中提取正整数的提取器
#[macro_export]
macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub i64);

        impl actix_web::FromRequest for $name {
            type Error = actix_web::Error;
            type Future = std::future::Ready<Result<Self, Self::Error>>;

            fn from_request(
                req: &actix_web::HttpRequest,
                _payload: &mut actix_web::dev::Payload,
            ) -> Self::Future {
                std::future::ready(
                    $crate::utils::extractor::parse_positive_id(req.match_info().get($param))
                        .map($name)
                        .ok_or_else(|| $crate::utils::extractor::invalid_path_param($param)),
                )
            }
        }
    };
}

define_safe_i64_extractor!(SafeCourseId, "course_id");
define_safe_i64_extractor!(SafeEnrollmentId, "enrollment_id");
define_safe_i64_extractor!(SafeLessonId, "lesson_id");
define_safe_i64_extractor!(SafeQuizId, "quiz_id");
define_safe_i64_extractor!(SafeAttemptId, "attempt_id");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_id() {
        assert_eq!(parse_positive_id(Some("12")), Some(12));
        assert_eq!(parse_positive_id(Some("0")), None);
        assert_eq!(parse_positive_id(Some("-3")), None);
        assert_eq!(parse_positive_id(Some("abc")), None);
        assert_eq!(parse_positive_id(None), None);
    }
}
