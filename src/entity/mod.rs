//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。
//! 时间统一以 Unix 秒存储，金额以分、进度以万分比存储。

pub mod prelude;

pub mod certificates;
pub mod course_modules;
pub mod courses;
pub mod enrollments;
pub mod lesson_progress;
pub mod lessons;
pub mod quiz_attempts;
pub mod quiz_questions;
pub mod quizzes;
pub mod users;
