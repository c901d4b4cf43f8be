use serde::Deserialize;
use ts_rs::TS;

use crate::errors::{LmsError, Result};

// 创建测验请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct CreateQuizRequest {
    pub module_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub time_limit_minutes: Option<i32>,
    pub passing_score: i32,
}

impl CreateQuizRequest {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(LmsError::validation("Quiz title must not be empty"));
        }
        if !(0..=100).contains(&self.passing_score) {
            return Err(LmsError::validation(
                "Passing score must be between 0 and 100",
            ));
        }
        if self.time_limit_minutes.is_some_and(|t| t < 1) {
            return Err(LmsError::validation("Time limit must be at least 1 minute"));
        }
        Ok(())
    }
}

fn default_points() -> i32 {
    1
}

// 创建题目请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct CreateQuizQuestionRequest {
    pub quiz_id: i64,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer_index: i32,
    #[serde(default = "default_points")]
    pub points: i32,
    pub order_index: i32,
}

impl CreateQuizQuestionRequest {
    pub fn validate(&self) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(LmsError::validation("Question text must not be empty"));
        }
        if self.options.len() < 2 {
            return Err(LmsError::validation(
                "A question needs at least two options",
            ));
        }
        let in_range = usize::try_from(self.correct_answer_index)
            .is_ok_and(|index| index < self.options.len());
        if !in_range {
            return Err(LmsError::validation(
                "Correct answer index is out of range",
            ));
        }
        if self.points < 1 {
            return Err(LmsError::validation("Points must be at least 1"));
        }
        Ok(())
    }
}

// 提交测验请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct SubmitQuizRequest {
    pub answers: Vec<Option<i32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(options: usize, correct: i32) -> CreateQuizQuestionRequest {
        CreateQuizQuestionRequest {
            quiz_id: 1,
            question: "What is ownership?".into(),
            options: (0..options).map(|i| format!("option {i}")).collect(),
            correct_answer_index: correct,
            points: 1,
            order_index: 0,
        }
    }

    #[test]
    fn test_correct_answer_index_must_be_in_range() {
        assert!(question(4, 3).validate().is_ok());
        assert!(question(4, 4).validate().is_err());
        assert!(question(4, -1).validate().is_err());
        assert!(question(1, 0).validate().is_err());
    }

    #[test]
    fn test_passing_score_bounds() {
        let mut quiz = CreateQuizRequest {
            module_id: 1,
            title: "Checkpoint".into(),
            description: None,
            time_limit_minutes: Some(15),
            passing_score: 100,
        };
        assert!(quiz.validate().is_ok());
        quiz.passing_score = 101;
        assert!(quiz.validate().is_err());
    }

    #[test]
    fn test_points_default_to_one() {
        let req: CreateQuizQuestionRequest = serde_json::from_str(
            r#"{"quiz_id":1,"question":"q","options":["a","b"],"correct_answer_index":1,"order_index":0}"#,
        )
        .unwrap();
        assert_eq!(req.points, 1);
    }
}
