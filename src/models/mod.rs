//! 数据模型定义
//!
//! 每个业务域拆分为 entities / requests / responses，
//! 并通过 ts-rs 导出前端使用的 TypeScript 类型。

pub mod auth;
pub mod certificates;
pub mod common;
pub mod courses;
pub mod dashboard;
pub mod enrollments;
pub mod progress;
pub mod quizzes;
pub mod users;

pub use common::{ApiResponse, FlashLevel, FlashMessage, PageResponse, PaginationInfo};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// API 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,
    RateLimitExceeded = 1029,

    // 认证
    AuthFailed = 2000,
    RegisterFailed = 2001,
    UserNameInvalid = 2002,
    UserEmailInvalid = 2003,
    UserEmailAlreadyExists = 2004,
    UserPasswordInvalid = 2005,
    UserNotFound = 2006,
    UserInactive = 2007,

    // 课程目录
    CourseNotFound = 3000,
    LessonNotFound = 3001,
    QuizNotFound = 3002,

    // 选课
    EnrollmentNotFound = 4000,
    AlreadyEnrolled = 4001,
    NotAStudent = 4002,
    EnrollmentFailed = 4003,

    // 学习进度与测验
    ProgressUpdateFailed = 5000,
    QuizAttemptNotFound = 5001,
    QuizAlreadySubmitted = 5002,
    QuizAnswersInvalid = 5003,

    // 证书
    CertificateNotFound = 6000,
    CertificateNotEligible = 6001,
}
