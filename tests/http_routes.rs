//! 页面重定向、角色分发与学习接口的 HTTP 测试

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Database};
use tempfile::TempDir;

use eduplatform::models::courses::entities::{Course, CourseStatus, LessonType};
use eduplatform::models::courses::requests::{
    CreateCourseRequest, CreateLessonRequest, CreateModuleRequest,
};
use eduplatform::models::quizzes::requests::{CreateQuizQuestionRequest, CreateQuizRequest};
use eduplatform::models::users::entities::{User, UserRole};
use eduplatform::models::users::requests::CreateUserRequest;
use eduplatform::models::{FlashLevel, FlashMessage};
use eduplatform::routes;
use eduplatform::storage::Storage;
use eduplatform::storage::sea_orm_storage::SeaOrmStorage;
use eduplatform::utils::flash::{FLASH_COOKIE, read_flash};
use eduplatform::utils::jwt::JwtUtils;
use eduplatform::utils::{json_error_handler, query_error_handler};

struct TestContext {
    storage: Arc<dyn Storage>,
    url: String,
    _dir: TempDir,
}

async fn setup() -> TestContext {
    let dir = tempfile::tempdir().unwrap();
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("eduplatform-http.db").display()
    );
    let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::connect(&url).await.unwrap());
    TestContext {
        storage,
        url,
        _dir: dir,
    }
}

/// 绕过存储层直接执行 SQL，用于构造异常数据
async fn execute_sql(ctx: &TestContext, sql: &str) {
    let db = Database::connect(&ctx.url).await.unwrap();
    db.execute_unprepared(sql).await.unwrap();
    db.close().await.unwrap();
}

macro_rules! init_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::QueryConfig::default().error_handler(query_error_handler))
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .app_data(web::Data::new($ctx.storage.clone()))
                .configure(routes::configure_routes),
        )
        .await
    };
}

async fn create_user(ctx: &TestContext, email: &str, role: UserRole) -> User {
    ctx.storage
        .create_user(CreateUserRequest {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: "not-a-real-hash".to_string(),
            role,
        })
        .await
        .unwrap()
}

fn bearer(user: &User) -> (header::HeaderName, String) {
    let token = JwtUtils::generate_access_token(user.id, &user.role.to_string()).unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

/// 一个章节一个课时的课程
async fn create_course(
    ctx: &TestContext,
    teacher: &User,
    title: &str,
    status: CourseStatus,
) -> (Course, i64) {
    let course = ctx
        .storage
        .create_course(CreateCourseRequest {
            teacher_id: teacher.id,
            title: title.to_string(),
            description: "A short course".to_string(),
            category: "Programming".to_string(),
            price: Decimal::ZERO,
            status,
            scheduled_at: None,
        })
        .await
        .unwrap();
    let module = ctx
        .storage
        .create_module(CreateModuleRequest {
            course_id: course.id,
            title: "Basics".to_string(),
            description: None,
            order_index: 0,
        })
        .await
        .unwrap();
    let lesson = ctx
        .storage
        .create_lesson(CreateLessonRequest {
            module_id: module.id,
            title: "Welcome".to_string(),
            content: None,
            lesson_type: LessonType::Article,
            file_path: None,
            duration_minutes: Some(5),
            order_index: 0,
        })
        .await
        .unwrap();
    (course, lesson.id)
}

/// 在课程末尾追加一个只有测验的章节：两道题各 10 分，70 分及格
async fn add_quiz(ctx: &TestContext, course: &Course) -> i64 {
    let module = ctx
        .storage
        .create_module(CreateModuleRequest {
            course_id: course.id,
            title: "Checkpoint".to_string(),
            description: None,
            order_index: 1,
        })
        .await
        .unwrap();
    let quiz = ctx
        .storage
        .create_quiz(CreateQuizRequest {
            module_id: module.id,
            title: "Checkpoint Quiz".to_string(),
            description: None,
            time_limit_minutes: Some(10),
            passing_score: 70,
        })
        .await
        .unwrap();
    for (index, correct) in [(0, 1), (1, 0)] {
        ctx.storage
            .create_quiz_question(CreateQuizQuestionRequest {
                quiz_id: quiz.id,
                question: format!("Question {index}"),
                options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
                correct_answer_index: correct,
                points: 10,
                order_index: index,
            })
            .await
            .unwrap();
    }
    quiz.id
}

fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn flash<B>(resp: &ServiceResponse<B>) -> FlashMessage {
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == FLASH_COOKIE)
        .expect("flash cookie");
    let req = test::TestRequest::default()
        .cookie(cookie.into_owned())
        .to_http_request();
    read_flash(&req).expect("readable flash")
}

#[actix_web::test]
async fn test_health_check() {
    let ctx = setup().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/health-check").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn test_enroll_redirect_outcomes() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let teacher = create_user(&ctx, "teacher@eduplatform.com", UserRole::Teacher).await;
    let student = create_user(&ctx, "student@eduplatform.com", UserRole::Student).await;
    let (course, _) = create_course(&ctx, &teacher, "Rust Basics", CourseStatus::Published).await;
    let (draft, _) = create_course(&ctx, &teacher, "Unreleased", CourseStatus::Draft).await;
    let enroll_uri = format!("/enroll/{}", course.id);

    // 访客
    let req = test::TestRequest::post().uri(&enroll_uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    assert_eq!(flash(&resp).level, FlashLevel::Error);

    // 学生首次选课
    let req = test::TestRequest::post()
        .uri(&enroll_uri)
        .insert_header(bearer(&student))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/student/dashboard");
    assert_eq!(
        flash(&resp),
        FlashMessage::success("Successfully enrolled in Rust Basics!")
    );

    // 重复选课
    let req = test::TestRequest::post()
        .uri(&enroll_uri)
        .insert_header(bearer(&student))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), format!("/course/{}", course.id));
    assert_eq!(
        flash(&resp),
        FlashMessage::info("You are already enrolled in this course.")
    );
    assert_eq!(ctx.storage.count_enrollments().await.unwrap(), 1);

    // 教师不能选课
    let req = test::TestRequest::post()
        .uri(&enroll_uri)
        .insert_header(bearer(&teacher))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), format!("/course/{}", course.id));
    assert_eq!(flash(&resp).level, FlashLevel::Error);

    // 草稿与不存在的课程
    for uri in [format!("/enroll/{}", draft.id), "/enroll/9999".to_string()] {
        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(&student))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(location(&resp), "/courses");
        assert_eq!(flash(&resp).level, FlashLevel::Error);
    }
    assert_eq!(ctx.storage.count_enrollments().await.unwrap(), 1);
}

#[actix_web::test]
async fn test_dashboard_redirects_by_role() {
    let ctx = setup().await;
    let app = init_app!(ctx);

    let cases = [
        ("s@eduplatform.com", UserRole::Student, "/student/dashboard"),
        ("t@eduplatform.com", UserRole::Teacher, "/teacher/dashboard"),
        ("a@eduplatform.com", UserRole::Administrator, "/admin/dashboard"),
    ];
    for (email, role, expected) in cases {
        let user = create_user(&ctx, email, role).await;
        let req = test::TestRequest::get()
            .uri("/dashboard")
            .insert_header(bearer(&user))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), expected);
    }

    let req = test::TestRequest::get().uri("/dashboard").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/login");
}

#[actix_web::test]
async fn test_role_pages_are_guarded() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let teacher = create_user(&ctx, "t@eduplatform.com", UserRole::Teacher).await;
    let student = create_user(&ctx, "s@eduplatform.com", UserRole::Student).await;

    let req = test::TestRequest::get().uri("/student/dashboard").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/login");

    let req = test::TestRequest::get()
        .uri("/student/dashboard")
        .insert_header(bearer(&teacher))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/dashboard");

    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .insert_header(bearer(&student))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/dashboard");

    let req = test::TestRequest::get()
        .uri("/student/dashboard")
        .insert_header(bearer(&student))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["component"], "Student/Dashboard");
    assert_eq!(body["data"]["props"]["stats"]["total_enrollments"], 0);
}

#[actix_web::test]
async fn test_draft_course_hidden_from_other_viewers() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let teacher = create_user(&ctx, "t@eduplatform.com", UserRole::Teacher).await;
    let (draft, _) = create_course(&ctx, &teacher, "Work in progress", CourseStatus::Draft).await;
    let uri = format!("/course/{}", draft.id);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/courses");

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&teacher))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["component"], "Courses/Show");
    assert_eq!(body["data"]["props"]["can_enroll"], false);
}

#[actix_web::test]
async fn test_lesson_completion_api() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let teacher = create_user(&ctx, "t@eduplatform.com", UserRole::Teacher).await;
    let owner = create_user(&ctx, "owner@eduplatform.com", UserRole::Student).await;
    let other = create_user(&ctx, "other@eduplatform.com", UserRole::Student).await;
    let (course, lesson_id) =
        create_course(&ctx, &teacher, "One Lesson", CourseStatus::Published).await;

    let req = test::TestRequest::post()
        .uri(&format!("/enroll/{}", course.id))
        .insert_header(bearer(&owner))
        .to_request();
    test::call_service(&app, req).await;
    let enrollment = ctx
        .storage
        .get_enrollment_by_student_and_course(owner.id, course.id)
        .await
        .unwrap()
        .unwrap();
    let complete_uri = format!(
        "/api/v1/enrollments/{}/lessons/{}/complete",
        enrollment.id, lesson_id
    );

    let req = test::TestRequest::post().uri(&complete_uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // 其他学生的选课视为不存在
    let req = test::TestRequest::post()
        .uri(&complete_uri)
        .insert_header(bearer(&other))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&complete_uri)
        .insert_header(bearer(&owner))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["enrollment"]["progress"], "100.00");
    assert_eq!(body["data"]["enrollment"]["is_completed"], true);
    assert!(body["data"]["certificate"]["certificate_number"].is_string());

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/enrollments/{}/certificate", enrollment.id))
        .insert_header(bearer(&owner))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(ctx.storage.count_certificates().await.unwrap(), 1);

    let req = test::TestRequest::put()
        .uri(&format!(
            "/api/v1/enrollments/{}/lessons/{}/position",
            enrollment.id, lesson_id
        ))
        .insert_header(bearer(&owner))
        .set_json(serde_json::json!({ "seconds": -5 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/v1/enrollments/0/progress")
        .insert_header(bearer(&owner))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_register_login_and_me() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let credentials = serde_json::json!({
        "name": "Ada Student",
        "email": "Ada@EduPlatform.com",
        "password": "Strong9Lesson",
    });

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(&credentials)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.response().cookies().any(|c| c.name() == "access_token"));
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["user"]["role"], "student");
    assert_eq!(body["data"]["user"]["email"], "ada@eduplatform.com");
    assert!(body["data"]["user"].get("password_hash").is_none());

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(&credentials)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(serde_json::json!({
            "email": "ada@eduplatform.com",
            "password": "wrong-Password1",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(serde_json::json!({
            "email": "ada@eduplatform.com",
            "password": "Strong9Lesson",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["user"]["name"], "Ada Student");

    let req = test::TestRequest::get().uri("/api/v1/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_quiz_attempt_and_certificate_api() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let teacher = create_user(&ctx, "t@eduplatform.com", UserRole::Teacher).await;
    let owner = create_user(&ctx, "owner@eduplatform.com", UserRole::Student).await;
    let other = create_user(&ctx, "other@eduplatform.com", UserRole::Student).await;
    let (course, lesson_id) =
        create_course(&ctx, &teacher, "Quizzed Course", CourseStatus::Published).await;
    let quiz_id = add_quiz(&ctx, &course).await;

    let req = test::TestRequest::post()
        .uri(&format!("/enroll/{}", course.id))
        .insert_header(bearer(&owner))
        .to_request();
    test::call_service(&app, req).await;
    let enrollment = ctx
        .storage
        .get_enrollment_by_student_and_course(owner.id, course.id)
        .await
        .unwrap()
        .unwrap();
    let base = format!("/api/v1/enrollments/{}", enrollment.id);
    let certificate_uri = format!("{base}/certificate");

    let req = test::TestRequest::post()
        .uri(&format!("{base}/lessons/{lesson_id}/complete"))
        .insert_header(bearer(&owner))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["enrollment"]["progress"], "50.00");
    assert!(body["data"]["certificate"].is_null());

    // 未完成课程不能领取证书
    let req = test::TestRequest::post()
        .uri(&certificate_uri)
        .insert_header(bearer(&owner))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::get()
        .uri(&format!("{base}/quizzes/{quiz_id}"))
        .insert_header(bearer(&owner))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["questions"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["total_points"], 20);

    let req = test::TestRequest::post()
        .uri(&format!("{base}/quizzes/{quiz_id}/attempts"))
        .insert_header(bearer(&owner))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let attempt_id = body["data"]["id"].as_i64().unwrap();
    let submit_uri = format!("/api/v1/quiz-attempts/{attempt_id}/submit");
    let answers = serde_json::json!({ "answers": [1, 0] });

    let req = test::TestRequest::post()
        .uri(&submit_uri)
        .insert_header(bearer(&other))
        .set_json(&answers)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&submit_uri)
        .insert_header(bearer(&owner))
        .set_json(&answers)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["attempt"]["score"], 20);
    assert_eq!(body["data"]["attempt"]["is_passed"], true);
    assert_eq!(body["data"]["enrollment"]["progress"], "100.00");
    assert_eq!(body["data"]["enrollment"]["is_completed"], true);
    assert!(body["data"]["certificate"]["certificate_number"].is_string());

    let req = test::TestRequest::post()
        .uri(&submit_uri)
        .insert_header(bearer(&owner))
        .set_json(&answers)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // 证书记录丢失时重新签发，之后的请求返回同一张证书
    execute_sql(&ctx, "DELETE FROM certificates").await;
    let req = test::TestRequest::post()
        .uri(&certificate_uri)
        .insert_header(bearer(&owner))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let number = body["data"]["certificate_number"].clone();

    let req = test::TestRequest::post()
        .uri(&certificate_uri)
        .insert_header(bearer(&owner))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["certificate_number"], number);
    assert_eq!(ctx.storage.count_certificates().await.unwrap(), 1);

    let req = test::TestRequest::post()
        .uri(&certificate_uri)
        .insert_header(bearer(&other))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_catalog_page_beyond_range_falls_back_to_last_page() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    let teacher = create_user(&ctx, "t@eduplatform.com", UserRole::Teacher).await;
    create_course(&ctx, &teacher, "Only Course", CourseStatus::Published).await;

    let req = test::TestRequest::get()
        .uri(&format!("/courses?page={}", u64::MAX))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["props"]["courses"]["pagination"]["page"], 1);
    assert_eq!(
        body["data"]["props"]["courses"]["items"][0]["title"],
        "Only Course"
    );
}

#[actix_web::test]
async fn test_catalog_failure_redirects_with_flash() {
    let ctx = setup().await;
    let app = init_app!(ctx);
    execute_sql(&ctx, "ALTER TABLE courses RENAME TO courses_archived").await;

    let req = test::TestRequest::get().uri("/courses").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert_eq!(flash(&resp).level, FlashLevel::Error);
}
