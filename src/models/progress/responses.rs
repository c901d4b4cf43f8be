use serde::Serialize;
use ts_rs::TS;

use super::entities::LessonProgress;
use crate::models::certificates::entities::Certificate;
use crate::models::courses::responses::CourseTree;
use crate::models::enrollments::entities::Enrollment;
use crate::models::quizzes::responses::QuizResult;

// 完成课时后的结果（含重新计算的选课进度）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/progress.ts")]
pub struct LessonProgressUpdate {
    pub lesson_progress: LessonProgress,
    pub enrollment: Enrollment,
    pub certificate: Option<Certificate>,
}

// 选课进度明细
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/progress.ts")]
pub struct EnrollmentProgressResponse {
    pub enrollment: Enrollment,
    pub lessons: Vec<LessonProgress>,
    pub quizzes: Vec<QuizResult>,
}

// 学习页：课程结构 + 个人进度
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/progress.ts")]
pub struct LearningViewPage {
    pub tree: CourseTree,
    pub progress: EnrollmentProgressResponse,
}
