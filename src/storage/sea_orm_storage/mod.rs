//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。
//! 选课、进度、测验提交与证书签发各自在单个事务内完成。

mod catalog;
mod certificates;
mod enrollments;
mod progress;
mod quizzes;
mod users;

use crate::config::AppConfig;
use crate::errors::{LmsError, Result};
use crate::models::certificates::entities::CertificateNumbering;
use crate::models::progress::entities::ProgressWeights;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
    pub(crate) weights: ProgressWeights,
    pub(crate) numbering: CertificateNumbering,
}

impl SeaOrmStorage {
    /// 使用全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(&config.database.url).await
    }

    /// 连接指定数据库并运行迁移，进度权重与证书规则取自全局配置
    pub async fn connect(url: &str) -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| LmsError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM storage ready, database: {}", db_url);

        Ok(Self {
            db,
            weights: config.progress_weights(),
            numbering: config.certificate_numbering(),
        })
    }

    /// 覆盖进度权重
    pub fn with_weights(mut self, weights: ProgressWeights) -> Self {
        self.weights = weights;
        self
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| LmsError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| LmsError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| LmsError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(LmsError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    certificates::entities::{Certificate, CertificateIssuance},
    courses::{
        entities::{Course, CourseModule, Lesson},
        requests::{CatalogFilter, CreateCourseRequest, CreateLessonRequest, CreateModuleRequest},
        responses::{CourseListResponse, CourseSummary, CourseTree},
    },
    dashboard::responses::TeacherCourseItem,
    enrollments::{
        entities::Enrollment, requests::CreateEnrollmentRequest,
        responses::StudentEnrollmentItem,
    },
    progress::{
        entities::LessonProgress,
        responses::{EnrollmentProgressResponse, LessonProgressUpdate},
    },
    quizzes::{
        entities::{Quiz, QuizAttempt, QuizQuestion},
        requests::{CreateQuizQuestionRequest, CreateQuizRequest},
        responses::{QuizForTaking, QuizSubmissionResponse},
    },
    users::{
        entities::{User, UserRole},
        requests::CreateUserRequest,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<i64> {
        self.count_users_impl().await
    }

    async fn count_active_users_by_role(&self, role: UserRole) -> Result<i64> {
        self.count_active_users_by_role_impl(role).await
    }

    // 课程目录模块
    async fn create_course(&self, req: CreateCourseRequest) -> Result<Course> {
        self.create_course_impl(req).await
    }

    async fn create_module(&self, req: CreateModuleRequest) -> Result<CourseModule> {
        self.create_module_impl(req).await
    }

    async fn create_lesson(&self, req: CreateLessonRequest) -> Result<Lesson> {
        self.create_lesson_impl(req).await
    }

    async fn create_quiz(&self, req: CreateQuizRequest) -> Result<Quiz> {
        self.create_quiz_impl(req).await
    }

    async fn create_quiz_question(&self, req: CreateQuizQuestionRequest) -> Result<QuizQuestion> {
        self.create_quiz_question_impl(req).await
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn list_published_courses(
        &self,
        filter: &CatalogFilter,
        page_size: u64,
    ) -> Result<CourseListResponse> {
        self.list_published_courses_impl(filter, page_size).await
    }

    async fn list_featured_courses(&self, limit: u64) -> Result<Vec<CourseSummary>> {
        self.list_featured_courses_impl(limit).await
    }

    async fn list_published_categories(&self) -> Result<Vec<String>> {
        self.list_published_categories_impl().await
    }

    async fn count_published_courses(&self) -> Result<i64> {
        self.count_published_courses_impl().await
    }

    async fn get_course_tree(
        &self,
        course_id: i64,
        viewer_id: Option<i64>,
    ) -> Result<Option<CourseTree>> {
        self.get_course_tree_impl(course_id, viewer_id).await
    }

    async fn list_teacher_courses(&self, teacher_id: i64) -> Result<Vec<TeacherCourseItem>> {
        self.list_teacher_courses_impl(teacher_id).await
    }

    // 选课模块
    async fn enroll_student(&self, req: CreateEnrollmentRequest) -> Result<Enrollment> {
        self.enroll_student_impl(req).await
    }

    async fn get_enrollment_by_id(&self, id: i64) -> Result<Option<Enrollment>> {
        self.get_enrollment_by_id_impl(id).await
    }

    async fn get_enrollment_by_student_and_course(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>> {
        self.get_enrollment_by_student_and_course_impl(student_id, course_id)
            .await
    }

    async fn list_student_enrollments(
        &self,
        student_id: i64,
    ) -> Result<Vec<StudentEnrollmentItem>> {
        self.list_student_enrollments_impl(student_id).await
    }

    async fn count_enrollments(&self) -> Result<i64> {
        self.count_enrollments_impl().await
    }

    // 学习进度模块
    async fn complete_lesson(
        &self,
        enrollment_id: i64,
        lesson_id: i64,
    ) -> Result<LessonProgressUpdate> {
        self.complete_lesson_impl(enrollment_id, lesson_id).await
    }

    async fn record_lesson_position(
        &self,
        enrollment_id: i64,
        lesson_id: i64,
        seconds: i32,
    ) -> Result<LessonProgress> {
        self.record_lesson_position_impl(enrollment_id, lesson_id, seconds)
            .await
    }

    async fn list_lesson_progress(&self, enrollment_id: i64) -> Result<Vec<LessonProgress>> {
        self.list_lesson_progress_impl(enrollment_id).await
    }

    async fn get_enrollment_progress(
        &self,
        enrollment_id: i64,
    ) -> Result<Option<EnrollmentProgressResponse>> {
        self.get_enrollment_progress_impl(enrollment_id).await
    }

    // 测验模块
    async fn get_quiz_for_taking(
        &self,
        enrollment_id: i64,
        quiz_id: i64,
    ) -> Result<QuizForTaking> {
        self.get_quiz_for_taking_impl(enrollment_id, quiz_id).await
    }

    async fn start_quiz_attempt(&self, enrollment_id: i64, quiz_id: i64) -> Result<QuizAttempt> {
        self.start_quiz_attempt_impl(enrollment_id, quiz_id).await
    }

    async fn get_quiz_attempt_by_id(&self, id: i64) -> Result<Option<QuizAttempt>> {
        self.get_quiz_attempt_by_id_impl(id).await
    }

    async fn submit_quiz_attempt(
        &self,
        attempt_id: i64,
        answers: Vec<Option<i32>>,
    ) -> Result<QuizSubmissionResponse> {
        self.submit_quiz_attempt_impl(attempt_id, answers).await
    }

    // 证书模块
    async fn issue_certificate_if_eligible(
        &self,
        enrollment_id: i64,
    ) -> Result<CertificateIssuance> {
        self.issue_certificate_if_eligible_impl(enrollment_id).await
    }

    async fn get_certificate_by_enrollment(
        &self,
        enrollment_id: i64,
    ) -> Result<Option<Certificate>> {
        self.get_certificate_by_enrollment_impl(enrollment_id).await
    }

    async fn count_certificates(&self) -> Result<i64> {
        self.count_certificates_impl().await
    }
}

/// 测试辅助：临时 SQLite 数据库与常用的课程数据
#[cfg(test)]
pub(crate) mod test_support {
    use super::SeaOrmStorage;
    use crate::models::courses::entities::{Course, CourseStatus, LessonType};
    use crate::models::courses::requests::{
        CreateCourseRequest, CreateLessonRequest, CreateModuleRequest,
    };
    use crate::models::quizzes::requests::{CreateQuizQuestionRequest, CreateQuizRequest};
    use crate::models::users::{
        entities::{User, UserRole},
        requests::CreateUserRequest,
    };
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    /// TempDir 需与存储同生命周期，否则数据库文件会被提前删除
    pub(crate) async fn test_storage() -> (SeaOrmStorage, TempDir) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("eduplatform-test.db").display()
        );
        let storage = SeaOrmStorage::connect(&url)
            .await
            .expect("connect test database");
        (storage, dir)
    }

    pub(crate) async fn create_user(storage: &SeaOrmStorage, email: &str, role: UserRole) -> User {
        storage
            .create_user_impl(CreateUserRequest {
                name: "Test User".to_string(),
                email: email.to_string(),
                password: "not-a-real-hash".to_string(),
                role,
            })
            .await
            .expect("create user")
    }

    pub(crate) async fn create_course(
        storage: &SeaOrmStorage,
        teacher_id: i64,
        title: &str,
        description: &str,
        category: &str,
        price: Decimal,
        status: CourseStatus,
    ) -> Course {
        storage
            .create_course_impl(CreateCourseRequest {
                teacher_id,
                title: title.to_string(),
                description: description.to_string(),
                category: category.to_string(),
                price,
                status,
                scheduled_at: None,
            })
            .await
            .expect("create course")
    }

    /// 已发布课程的结构：一个章节两个课时，另一个章节一个课时加测验
    pub(crate) struct SampleCourse {
        pub course: Course,
        pub lesson_ids: Vec<i64>,
        pub quiz_id: i64,
    }

    pub(crate) async fn sample_course(storage: &SeaOrmStorage, teacher_id: i64) -> SampleCourse {
        let course = create_course(
            storage,
            teacher_id,
            "Rust Fundamentals",
            "Ownership, borrowing and traits",
            "Programming",
            Decimal::ZERO,
            CourseStatus::Published,
        )
        .await;

        let mut lesson_ids = Vec::new();
        let mut quiz_id = 0;
        for (module_index, lesson_count) in [(1, 2), (2, 1)] {
            let module = storage
                .create_module_impl(CreateModuleRequest {
                    course_id: course.id,
                    title: format!("Module {module_index}"),
                    description: None,
                    order_index: module_index,
                })
                .await
                .expect("create module");

            for lesson_index in 1..=lesson_count {
                let lesson = storage
                    .create_lesson_impl(CreateLessonRequest {
                        module_id: module.id,
                        title: format!("Lesson {module_index}.{lesson_index}"),
                        content: Some("Reading material".to_string()),
                        lesson_type: LessonType::Article,
                        file_path: None,
                        duration_minutes: Some(10),
                        order_index: lesson_index,
                    })
                    .await
                    .expect("create lesson");
                lesson_ids.push(lesson.id);
            }

            if module_index == 2 {
                let quiz = storage
                    .create_quiz_impl(CreateQuizRequest {
                        module_id: module.id,
                        title: "Checkpoint".to_string(),
                        description: None,
                        time_limit_minutes: None,
                        passing_score: 50,
                    })
                    .await
                    .expect("create quiz");
                for (order, correct) in [(1, 0), (2, 1)] {
                    storage
                        .create_quiz_question_impl(CreateQuizQuestionRequest {
                            quiz_id: quiz.id,
                            question: format!("Question {order}"),
                            options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
                            correct_answer_index: correct,
                            points: 1,
                            order_index: order,
                        })
                        .await
                        .expect("create question");
                }
                quiz_id = quiz.id;
            }
        }

        SampleCourse {
            course,
            lesson_ids,
            quiz_id,
        }
    }
}
