//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。
//! 业务错误（未登录、角色不符、重复选课等）与基础设施错误共用同一个枚举，
//! HTTP 层再统一映射为状态码与 [`ErrorCode`]。

use std::fmt;

use crate::models::ErrorCode;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_lms_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum LmsError {
            $($variant(String),)*
        }

        impl LmsError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(LmsError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(LmsError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(LmsError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl LmsError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        LmsError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_lms_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    Validation("E004", "Validation Error"),
    NotFound("E005", "Resource Not Found"),
    Serialization("E006", "Serialization Error"),
    DateParse("E007", "Date Parse Error"),
    NotAuthenticated("E008", "Not Authenticated"),
    WrongRole("E009", "Wrong Role"),
    AlreadyEnrolled("E010", "Already Enrolled"),
    AlreadySubmitted("E011", "Already Submitted"),
    Io("E012", "IO Error"),
}

impl LmsError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否为调用方可见的业务错误（其余均为内部错误，不向客户端透出细节）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LmsError::Validation(_)
                | LmsError::NotFound(_)
                | LmsError::NotAuthenticated(_)
                | LmsError::WrongRole(_)
                | LmsError::AlreadyEnrolled(_)
                | LmsError::AlreadySubmitted(_)
        )
    }

    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            LmsError::Validation(_) => StatusCode::BAD_REQUEST,
            LmsError::NotFound(_) => StatusCode::NOT_FOUND,
            LmsError::NotAuthenticated(_) => StatusCode::UNAUTHORIZED,
            LmsError::WrongRole(_) => StatusCode::FORBIDDEN,
            LmsError::AlreadyEnrolled(_) | LmsError::AlreadySubmitted(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 默认的 API 错误码，调用方可按资源类型细化
    pub fn api_code(&self) -> ErrorCode {
        match self {
            LmsError::Validation(_) => ErrorCode::BadRequest,
            LmsError::NotFound(_) => ErrorCode::NotFound,
            LmsError::NotAuthenticated(_) => ErrorCode::Unauthorized,
            LmsError::WrongRole(_) => ErrorCode::Forbidden,
            LmsError::AlreadyEnrolled(_) => ErrorCode::AlreadyEnrolled,
            LmsError::AlreadySubmitted(_) => ErrorCode::QuizAlreadySubmitted,
            _ => ErrorCode::InternalServerError,
        }
    }
}

impl fmt::Display for LmsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LmsError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LmsError {
    fn from(err: sea_orm::DbErr) -> Self {
        LmsError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for LmsError {
    fn from(err: std::io::Error) -> Self {
        LmsError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LmsError {
    fn from(err: serde_json::Error) -> Self {
        LmsError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for LmsError {
    fn from(err: chrono::ParseError) -> Self {
        LmsError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LmsError>;
