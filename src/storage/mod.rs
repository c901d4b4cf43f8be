use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 用户总数
    async fn count_users(&self) -> Result<i64>;
    // 按角色统计启用的用户
    async fn count_active_users_by_role(&self, role: UserRole) -> Result<i64>;

    /// 课程目录方法
    // 创建课程、章节、课时、测验与题目
    async fn create_course(&self, req: CreateCourseRequest) -> Result<Course>;
    async fn create_module(&self, req: CreateModuleRequest) -> Result<CourseModule>;
    async fn create_lesson(&self, req: CreateLessonRequest) -> Result<Lesson>;
    async fn create_quiz(&self, req: CreateQuizRequest) -> Result<Quiz>;
    async fn create_quiz_question(&self, req: CreateQuizQuestionRequest) -> Result<QuizQuestion>;
    // 通过ID获取课程（不区分状态）
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    // 分页列出已发布课程
    async fn list_published_courses(
        &self,
        filter: &CatalogFilter,
        page_size: u64,
    ) -> Result<CourseListResponse>;
    // 首页推荐课程（最新发布）
    async fn list_featured_courses(&self, limit: u64) -> Result<Vec<CourseSummary>>;
    // 已发布课程的分类
    async fn list_published_categories(&self) -> Result<Vec<String>>;
    async fn count_published_courses(&self) -> Result<i64>;
    // 课程完整结构；课程不存在或对访问者不可见时返回 None
    async fn get_course_tree(
        &self,
        course_id: i64,
        viewer_id: Option<i64>,
    ) -> Result<Option<CourseTree>>;
    // 教师名下课程及选课统计
    async fn list_teacher_courses(&self, teacher_id: i64) -> Result<Vec<TeacherCourseItem>>;

    /// 选课方法
    // 学生选课
    async fn enroll_student(&self, req: CreateEnrollmentRequest) -> Result<Enrollment>;
    async fn get_enrollment_by_id(&self, id: i64) -> Result<Option<Enrollment>>;
    async fn get_enrollment_by_student_and_course(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>>;
    // 学生的全部选课，最新在前
    async fn list_student_enrollments(&self, student_id: i64)
    -> Result<Vec<StudentEnrollmentItem>>;
    async fn count_enrollments(&self) -> Result<i64>;

    /// 学习进度方法
    // 标记课时完成（幂等）
    async fn complete_lesson(
        &self,
        enrollment_id: i64,
        lesson_id: i64,
    ) -> Result<LessonProgressUpdate>;
    // 记录播放位置，不改变完成状态
    async fn record_lesson_position(
        &self,
        enrollment_id: i64,
        lesson_id: i64,
        seconds: i32,
    ) -> Result<LessonProgress>;
    async fn list_lesson_progress(&self, enrollment_id: i64) -> Result<Vec<LessonProgress>>;
    async fn get_enrollment_progress(
        &self,
        enrollment_id: i64,
    ) -> Result<Option<EnrollmentProgressResponse>>;

    /// 测验方法
    // 获取作答用的题目（不含正确答案）
    async fn get_quiz_for_taking(&self, enrollment_id: i64, quiz_id: i64)
    -> Result<QuizForTaking>;
    async fn start_quiz_attempt(&self, enrollment_id: i64, quiz_id: i64) -> Result<QuizAttempt>;
    async fn get_quiz_attempt_by_id(&self, id: i64) -> Result<Option<QuizAttempt>>;
    async fn submit_quiz_attempt(
        &self,
        attempt_id: i64,
        answers: Vec<Option<i32>>,
    ) -> Result<QuizSubmissionResponse>;

    /// 证书方法
    async fn issue_certificate_if_eligible(&self, enrollment_id: i64)
    -> Result<CertificateIssuance>;
    async fn get_certificate_by_enrollment(&self, enrollment_id: i64)
    -> Result<Option<Certificate>>;
    async fn count_certificates(&self) -> Result<i64>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
