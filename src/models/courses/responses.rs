use rust_decimal::Decimal;
use serde::Serialize;
use ts_rs::TS;

use super::entities::{Course, CourseModule, Lesson};
use super::requests::{CatalogFilter, PriceFilter};
use crate::models::common::PaginationInfo;
use crate::models::quizzes::entities::Quiz;
use crate::models::users::responses::UserSummary;

// 课程卡片摘要
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    #[ts(type = "string")]
    pub price: Decimal,
    pub is_free: bool,
    pub enroll_label: String,
    pub teacher_name: String,
    pub total_lessons: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl CourseSummary {
    pub fn from_course(course: &Course, teacher_name: String, total_lessons: i64) -> Self {
        Self {
            id: course.id,
            title: course.title.clone(),
            description: course.description.clone(),
            category: course.category.clone(),
            price: course.price,
            is_free: course.is_free(),
            enroll_label: course.enroll_action_label().to_string(),
            teacher_name,
            total_lessons,
            created_at: course.created_at,
        }
    }
}

// 课程列表响应
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseListResponse {
    pub items: Vec<CourseSummary>,
    pub pagination: PaginationInfo,
}

// 回显给前端的筛选条件
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct AppliedFilters {
    pub search: Option<String>,
    pub category: Option<String>,
    pub price_filter: Option<PriceFilter>,
}

impl From<&CatalogFilter> for AppliedFilters {
    fn from(filter: &CatalogFilter) -> Self {
        Self {
            search: filter.search.clone(),
            category: filter.category.clone(),
            price_filter: filter.price,
        }
    }
}

// 课程目录页
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CatalogPage {
    pub courses: CourseListResponse,
    pub categories: Vec<String>,
    pub filters: AppliedFilters,
}

// 章节内测验概要（不含题目）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub time_limit_minutes: Option<i32>,
    pub passing_score: i32,
    pub question_count: i64,
}

impl QuizSummary {
    pub fn from_quiz(quiz: Quiz, question_count: i64) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title,
            description: quiz.description,
            time_limit_minutes: quiz.time_limit_minutes,
            passing_score: quiz.passing_score,
            question_count,
        }
    }
}

// 章节及其课时、测验
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct ModuleTree {
    #[serde(flatten)]
    #[ts(flatten)]
    pub module: CourseModule,
    pub lessons: Vec<Lesson>,
    pub lessons_count: i64,
    pub has_quiz: bool,
    pub quiz: Option<QuizSummary>,
}

// 完整课程结构
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseTree {
    pub course: Course,
    pub is_free: bool,
    pub teacher: UserSummary,
    pub modules: Vec<ModuleTree>,
    pub total_lessons: i64,
    pub total_modules: i64,
}

impl CourseTree {
    pub fn lesson_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.modules
            .iter()
            .flat_map(|m| m.lessons.iter().map(|l| l.id))
    }

    pub fn quiz_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.modules.iter().filter_map(|m| m.quiz.as_ref().map(|q| q.id))
    }
}

// 当前用户在该课程中的选课状态
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct EnrollmentState {
    pub enrollment_id: i64,
    #[ts(type = "string")]
    pub progress: Decimal,
    pub is_completed: bool,
}

// 课程详情页
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseDetailPage {
    #[serde(flatten)]
    #[ts(flatten)]
    pub tree: CourseTree,
    pub enroll_label: String,
    pub is_enrolled: bool,
    pub enrollment: Option<EnrollmentState>,
    pub can_enroll: bool,
}
