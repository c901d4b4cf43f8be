use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 100% 对应的万分比
pub const FULL_PROGRESS_BASIS_POINTS: i32 = 10_000;

// 课时进度
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/progress.ts")]
pub struct LessonProgress {
    pub id: i64,
    pub enrollment_id: i64,
    pub lesson_id: i64,
    pub is_completed: bool,
    pub last_position_seconds: i32,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 进度权重：每个课时与每个含测验章节各占多少份
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressWeights {
    pub lesson_weight: u32,
    pub quiz_weight: u32,
}

impl Default for ProgressWeights {
    fn default() -> Self {
        Self {
            lesson_weight: 1,
            quiz_weight: 1,
        }
    }
}

/// 选课的完成情况统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressTally {
    pub completed_lessons: u64,
    pub total_lessons: u64,
    pub passed_quizzes: u64,
    pub total_quizzes: u64,
}

impl ProgressTally {
    fn weighted(&self, weights: ProgressWeights) -> (u64, u64) {
        let lw = u64::from(weights.lesson_weight);
        let qw = u64::from(weights.quiz_weight);
        let done = self.completed_lessons.min(self.total_lessons) * lw
            + self.passed_quizzes.min(self.total_quizzes) * qw;
        let total = self.total_lessons * lw + self.total_quizzes * qw;
        (done, total)
    }

    /// 全部计分项均已完成（空课程永远不算完成）
    pub fn is_complete(&self, weights: ProgressWeights) -> bool {
        let (done, total) = self.weighted(weights);
        total > 0 && done >= total
    }

    /// 完成百分比的万分比表示，四舍五入到两位小数
    ///
    /// 未全部完成时最多为 9999，保证 100% 与完成状态一致。
    pub fn basis_points(&self, weights: ProgressWeights) -> i32 {
        let (done, total) = self.weighted(weights);
        if total == 0 {
            return 0;
        }
        if done >= total {
            return FULL_PROGRESS_BASIS_POINTS;
        }
        let full = FULL_PROGRESS_BASIS_POINTS as u64;
        let rounded = (2 * done * full + total) / (2 * total);
        rounded.min(full - 1) as i32
    }
}

/// 万分比转换为两位小数的百分比
pub fn progress_from_basis_points(basis_points: i32) -> Decimal {
    Decimal::new(i64::from(basis_points), 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(cl: u64, tl: u64, pq: u64, tq: u64) -> ProgressTally {
        ProgressTally {
            completed_lessons: cl,
            total_lessons: tl,
            passed_quizzes: pq,
            total_quizzes: tq,
        }
    }

    #[test]
    fn test_equal_weights_match_plain_ratio() {
        let w = ProgressWeights::default();
        assert_eq!(tally(1, 4, 0, 0).basis_points(w), 2500);
        assert_eq!(tally(2, 3, 1, 1).basis_points(w), 7500);
        assert_eq!(tally(0, 3, 0, 0).basis_points(w), 0);
    }

    #[test]
    fn test_rounds_half_up_to_two_decimals() {
        let w = ProgressWeights::default();
        // 1/3 = 33.333..%
        assert_eq!(tally(1, 3, 0, 0).basis_points(w), 3333);
        // 2/3 = 66.666..%
        assert_eq!(tally(2, 3, 0, 0).basis_points(w), 6667);
        // 1/8 = 12.5%
        assert_eq!(tally(1, 8, 0, 0).basis_points(w), 1250);
        assert_eq!(progress_from_basis_points(6667).to_string(), "66.67");
    }

    #[test]
    fn test_full_completion_is_exactly_one_hundred() {
        let w = ProgressWeights::default();
        let t = tally(3, 3, 2, 2);
        assert_eq!(t.basis_points(w), FULL_PROGRESS_BASIS_POINTS);
        assert!(t.is_complete(w));
        assert_eq!(progress_from_basis_points(t.basis_points(w)).to_string(), "100.00");
    }

    #[test]
    fn test_near_completion_never_rounds_to_hundred() {
        let w = ProgressWeights::default();
        let t = tally(19_999, 20_000, 0, 0);
        assert_eq!(t.basis_points(w), 9_999);
        assert!(!t.is_complete(w));
    }

    #[test]
    fn test_empty_course_is_zero_and_incomplete() {
        let w = ProgressWeights::default();
        assert_eq!(tally(0, 0, 0, 0).basis_points(w), 0);
        assert!(!tally(0, 0, 0, 0).is_complete(w));
    }

    #[test]
    fn test_custom_weights() {
        let w = ProgressWeights {
            lesson_weight: 1,
            quiz_weight: 3,
        };
        // (2*1 + 1*3) / (4*1 + 2*3) = 5/10
        assert_eq!(tally(2, 4, 1, 2).basis_points(w), 5_000);

        let lessons_only = ProgressWeights {
            lesson_weight: 1,
            quiz_weight: 0,
        };
        assert!(tally(4, 4, 0, 2).is_complete(lessons_only));
    }
}
