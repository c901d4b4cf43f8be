use serde::Serialize;
use ts_rs::TS;

use super::entities::{Quiz, QuizAttempt, QuizQuestion};
use crate::models::certificates::entities::Certificate;
use crate::models::enrollments::entities::Enrollment;

// 作答用的测验（题目不含正确答案）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizForTaking {
    pub quiz: Quiz,
    pub questions: Vec<QuizQuestion>,
    pub total_points: i32,
}

// 提交测验后的结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizSubmissionResponse {
    pub attempt: QuizAttempt,
    pub enrollment: Enrollment,
    pub certificate: Option<Certificate>,
}

// 某个测验的最好成绩
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizResult {
    pub quiz_id: i64,
    pub attempts: i64,
    pub best_score: Option<i32>,
    pub is_passed: bool,
}

impl QuizResult {
    /// 汇总同一测验的所有已提交作答
    pub fn summarize(quiz_id: i64, attempts: &[QuizAttempt]) -> Self {
        let submitted: Vec<&QuizAttempt> = attempts
            .iter()
            .filter(|a| a.quiz_id == quiz_id && a.is_submitted())
            .collect();
        Self {
            quiz_id,
            attempts: submitted.len() as i64,
            best_score: submitted.iter().map(|a| a.score).max(),
            is_passed: submitted.iter().any(|a| a.is_passed),
        }
    }
}
