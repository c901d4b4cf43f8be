use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::{LmsError, Result};

// 测验（每个章节最多一个）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct Quiz {
    pub id: i64,
    pub module_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub time_limit_minutes: Option<i32>,
    pub passing_score: i32,
}

// 测验题目（含正确答案，仅在服务端使用）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizQuestion {
    pub id: i64,
    pub quiz_id: i64,
    pub question: String,
    pub options: Vec<String>,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub correct_answer_index: i32,
    pub points: i32,
    pub order_index: i32,
}

// 测验作答记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizAttempt {
    pub id: i64,
    pub enrollment_id: i64,
    pub quiz_id: i64,
    pub answers: Option<Vec<Option<i32>>>,
    pub score: i32,
    pub total_questions: i32,
    pub total_points: i32,
    pub is_passed: bool,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl QuizAttempt {
    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }
}

/// 判分结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizGrade {
    pub score: i32,
    pub total_questions: i32,
    pub total_points: i32,
    pub is_passed: bool,
}

/// score / total_points * 100 >= passing_score，用整数比较避免浮点误差
///
/// 没有题目（总分为 0）时，仅当及格线为 0 才算通过。
pub fn meets_passing_score(score: i32, total_points: i32, passing_score: i32) -> bool {
    if total_points <= 0 {
        return passing_score <= 0;
    }
    i64::from(score) * 100 >= i64::from(passing_score) * i64::from(total_points)
}

/// 按题目顺序对答案判分
///
/// `answers[i]` 对应 `questions[i]`；缺失、为空或越界的答案记为错误。
pub fn grade_answers(
    questions: &[QuizQuestion],
    answers: &[Option<i32>],
    passing_score: i32,
) -> Result<QuizGrade> {
    if answers.len() > questions.len() {
        return Err(LmsError::validation(format!(
            "Received {} answers for {} questions",
            answers.len(),
            questions.len()
        )));
    }

    let mut score = 0i32;
    let mut total_points = 0i32;
    for (index, question) in questions.iter().enumerate() {
        total_points += question.points;
        let answer = answers.get(index).copied().flatten();
        if answer == Some(question.correct_answer_index) {
            score += question.points;
        }
    }

    Ok(QuizGrade {
        score,
        total_questions: questions.len() as i32,
        total_points,
        is_passed: meets_passing_score(score, total_points, passing_score),
    })
}
