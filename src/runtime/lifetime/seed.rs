//! 演示数据：教师、学生、带章节/课时/测验的课程和若干选课记录
//!
//! 只在 `app.seed_demo_data = true` 且还没有已发布课程时写入。

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::{LmsError, Result};
use crate::models::courses::entities::{CourseStatus, LessonType};
use crate::models::courses::requests::{
    CreateCourseRequest, CreateLessonRequest, CreateModuleRequest,
};
use crate::models::enrollments::requests::CreateEnrollmentRequest;
use crate::models::quizzes::requests::{CreateQuizQuestionRequest, CreateQuizRequest};
use crate::models::users::entities::{User, UserRole};
use crate::models::users::requests::CreateUserRequest;
use crate::storage::Storage;
use crate::utils::password::hash_password;

const TEACHER_COUNT: usize = 5;
const STUDENT_COUNT: usize = 20;
const ENROLLED_STUDENTS: usize = 10;
const DEFAULT_DEMO_PASSWORD: &str = "Password123";

struct DemoLesson {
    title: &'static str,
    lesson_type: LessonType,
    duration: i32,
}

struct DemoModule {
    title: &'static str,
    lessons: &'static [DemoLesson],
}

struct DemoCourse {
    title: &'static str,
    description: &'static str,
    category: &'static str,
    price_cents: i64,
    modules: &'static [DemoModule],
}

const fn lesson(title: &'static str, lesson_type: LessonType, duration: i32) -> DemoLesson {
    DemoLesson {
        title,
        lesson_type,
        duration,
    }
}

static DEMO_COURSES: &[DemoCourse] = &[
    DemoCourse {
        title: "Complete Web Development Bootcamp",
        description: "Learn HTML, CSS, JavaScript, React, Node.js, and MongoDB. Build 10 real-world projects and become a full-stack developer.",
        category: "Programming",
        price_cents: 19999,
        modules: &[
            DemoModule {
                title: "HTML & CSS Fundamentals",
                lessons: &[
                    lesson("Introduction to HTML", LessonType::Video, 45),
                    lesson("CSS Styling Basics", LessonType::Video, 60),
                    lesson("Building Your First Webpage", LessonType::Article, 30),
                ],
            },
            DemoModule {
                title: "JavaScript Programming",
                lessons: &[
                    lesson("JavaScript Variables and Functions", LessonType::Video, 50),
                    lesson("DOM Manipulation", LessonType::Video, 40),
                    lesson("Async JavaScript", LessonType::Video, 55),
                ],
            },
        ],
    },
    DemoCourse {
        title: "Digital Marketing Mastery",
        description: "Master SEO, Social Media Marketing, Google Ads, Content Marketing, and Email Marketing strategies.",
        category: "Marketing",
        price_cents: 14999,
        modules: &[DemoModule {
            title: "SEO Fundamentals",
            lessons: &[
                lesson("Introduction to SEO", LessonType::Video, 35),
                lesson("Keyword Research", LessonType::Video, 45),
            ],
        }],
    },
    DemoCourse {
        title: "Graphic Design with Photoshop",
        description: "Learn professional graphic design techniques using Adobe Photoshop. Create logos, posters, and digital art.",
        category: "Design",
        price_cents: 9999,
        modules: &[DemoModule {
            title: "Photoshop Basics",
            lessons: &[
                lesson("Interface Overview", LessonType::Video, 25),
                lesson("Working with Layers", LessonType::Video, 40),
            ],
        }],
    },
    DemoCourse {
        title: "Introduction to Python Programming",
        description: "Start your programming journey with Python. Perfect for beginners with no coding experience.",
        category: "Programming",
        price_cents: 0,
        modules: &[
            DemoModule {
                title: "Getting Started with Python",
                lessons: &[
                    lesson("What is Python?", LessonType::Article, 15),
                    lesson("Installing Python", LessonType::Video, 20),
                    lesson("Your First Python Program", LessonType::Video, 30),
                ],
            },
            DemoModule {
                title: "Variables and Data Types",
                lessons: &[
                    lesson("Understanding Variables", LessonType::Video, 25),
                    lesson("Working with Numbers", LessonType::Video, 35),
                ],
            },
        ],
    },
    DemoCourse {
        title: "Business Management Essentials",
        description: "Learn fundamental business management principles, leadership skills, and strategic planning.",
        category: "Business",
        price_cents: 7999,
        modules: &[DemoModule {
            title: "Leadership Fundamentals",
            lessons: &[
                lesson("What Makes a Great Leader?", LessonType::Video, 40),
                lesson("Team Management", LessonType::Video, 45),
            ],
        }],
    },
];

/// 写入演示数据；已有发布课程时跳过
pub async fn seed_demo_data(storage: &Arc<dyn Storage>) -> Result<()> {
    if storage.count_published_courses().await? > 0 {
        info!("Published courses already exist, skipping demo data");
        return Ok(());
    }

    let password = std::env::var("DEMO_PASSWORD").unwrap_or_else(|_| {
        warn!("DEMO_PASSWORD not set, demo accounts use the default demo password");
        DEFAULT_DEMO_PASSWORD.to_string()
    });
    // 所有演示账号共用一个哈希
    let password_hash = hash_password(&password)?;

    let mut teachers = Vec::with_capacity(TEACHER_COUNT);
    for i in 1..=TEACHER_COUNT {
        let email = format!("teacher{i}@eduplatform.com");
        let name = format!("Teacher {i}");
        teachers.push(
            find_or_create_user(storage, &email, &name, &password_hash, UserRole::Teacher).await?,
        );
    }

    let mut students = Vec::with_capacity(STUDENT_COUNT);
    for i in 1..=STUDENT_COUNT {
        let email = format!("student{i}@eduplatform.com");
        let name = format!("Student {i}");
        students.push(
            find_or_create_user(storage, &email, &name, &password_hash, UserRole::Student).await?,
        );
    }

    let mut course_ids = Vec::with_capacity(DEMO_COURSES.len());
    for (index, demo) in DEMO_COURSES.iter().enumerate() {
        let teacher = &teachers[index % teachers.len()];
        course_ids.push(create_demo_course(storage, teacher.id, demo).await?);
    }

    // 前 10 名学生各选 1 到 3 门课
    let currency = crate::config::AppConfig::get().payment.currency.clone();
    let mut enrollments = 0;
    for (index, student) in students.iter().take(ENROLLED_STUDENTS).enumerate() {
        for offset in 0..(index % 3 + 1) {
            let course_id = course_ids[(index + offset) % course_ids.len()];
            match storage
                .enroll_student(CreateEnrollmentRequest {
                    student_id: student.id,
                    course_id,
                    currency: currency.clone(),
                })
                .await
            {
                Ok(_) => enrollments += 1,
                Err(LmsError::AlreadyEnrolled(_)) => {}
                Err(e) => return Err(e),
            }
        }
    }

    info!(
        "Demo data created: {} teachers, {} students, {} courses, {} enrollments",
        teachers.len(),
        students.len(),
        course_ids.len(),
        enrollments
    );
    Ok(())
}

async fn find_or_create_user(
    storage: &Arc<dyn Storage>,
    email: &str,
    name: &str,
    password_hash: &str,
    role: UserRole,
) -> Result<User> {
    if let Some(user) = storage.get_user_by_email(email).await? {
        return Ok(user);
    }
    storage
        .create_user(CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password_hash.to_string(),
            role,
        })
        .await
}

async fn create_demo_course(
    storage: &Arc<dyn Storage>,
    teacher_id: i64,
    demo: &DemoCourse,
) -> Result<i64> {
    let course = storage
        .create_course(CreateCourseRequest {
            teacher_id,
            title: demo.title.to_string(),
            description: demo.description.to_string(),
            category: demo.category.to_string(),
            price: Decimal::new(demo.price_cents, 2),
            status: CourseStatus::Published,
            scheduled_at: None,
        })
        .await?;

    for (module_index, demo_module) in demo.modules.iter().enumerate() {
        let module = storage
            .create_module(CreateModuleRequest {
                course_id: course.id,
                title: demo_module.title.to_string(),
                description: None,
                order_index: module_index as i32,
            })
            .await?;

        for (lesson_index, demo_lesson) in demo_module.lessons.iter().enumerate() {
            storage
                .create_lesson(CreateLessonRequest {
                    module_id: module.id,
                    title: demo_lesson.title.to_string(),
                    content: Some(format!("Sample lesson content for {}", demo_lesson.title)),
                    lesson_type: demo_lesson.lesson_type,
                    file_path: None,
                    duration_minutes: Some(demo_lesson.duration),
                    order_index: lesson_index as i32,
                })
                .await?;
        }

        // 每门课的第一个章节带一个测验
        if module_index == 0 {
            create_demo_quiz(storage, module.id, demo_module.title).await?;
        }
    }

    Ok(course.id)
}

async fn create_demo_quiz(storage: &Arc<dyn Storage>, module_id: i64, topic: &str) -> Result<()> {
    let quiz = storage
        .create_quiz(CreateQuizRequest {
            module_id,
            title: format!("{topic} Quiz"),
            description: Some(format!("Test your knowledge of {topic}")),
            time_limit_minutes: Some(30),
            passing_score: 70,
        })
        .await?;

    let questions = [
        (
            format!("What is the most important concept in {topic}?"),
            ["Option A", "Option B", "Option C", "Option D"],
            0,
        ),
        (
            "Which of the following is a best practice?".to_string(),
            ["Practice A", "Practice B", "Practice C", "Practice D"],
            1,
        ),
    ];

    for (order_index, (question, options, correct)) in questions.into_iter().enumerate() {
        storage
            .create_quiz_question(CreateQuizQuestionRequest {
                quiz_id: quiz.id,
                question,
                options: options.iter().map(|o| o.to_string()).collect(),
                correct_answer_index: correct,
                points: 10,
                order_index: order_index as i32,
            })
            .await?;
    }
    Ok(())
}
