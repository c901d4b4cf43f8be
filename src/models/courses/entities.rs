use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::{LmsError, Result};

// 课程状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub enum CourseStatus {
    Draft,     // 草稿
    Published, // 已发布
}

impl CourseStatus {
    pub const DRAFT: &'static str = "draft";
    pub const PUBLISHED: &'static str = "published";
}

impl<'de> Deserialize<'de> for CourseStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<CourseStatus>().map_err(|_| {
            serde::de::Error::custom(format!("无效的课程状态: '{s}'. 支持的状态: draft, published"))
        })
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseStatus::Draft => write!(f, "{}", CourseStatus::DRAFT),
            CourseStatus::Published => write!(f, "{}", CourseStatus::PUBLISHED),
        }
    }
}

impl std::str::FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            CourseStatus::DRAFT => Ok(CourseStatus::Draft),
            CourseStatus::PUBLISHED => Ok(CourseStatus::Published),
            _ => Err(format!("Invalid course status: {s}")),
        }
    }
}

// 课时类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub enum LessonType {
    Video,
    Pdf,
    #[default]
    Article,
    File,
}

impl<'de> Deserialize<'de> for LessonType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<LessonType>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的课时类型: '{s}'. 支持的类型: video, pdf, article, file"
            ))
        })
    }
}

impl std::fmt::Display for LessonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LessonType::Video => "video",
            LessonType::Pdf => "pdf",
            LessonType::Article => "article",
            LessonType::File => "file",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for LessonType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "video" => Ok(LessonType::Video),
            "pdf" => Ok(LessonType::Pdf),
            "article" => Ok(LessonType::Article),
            "file" => Ok(LessonType::File),
            _ => Err(format!("Invalid lesson type: {s}")),
        }
    }
}

/// 价格以分为单位存储，对外暴露两位小数
pub fn price_from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// 将价格转换为分；负数或超过两位小数的价格被拒绝
pub fn price_to_cents(price: Decimal) -> Result<i64> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(LmsError::validation("Price must not be negative"));
    }
    let normalized = price.normalize();
    if normalized.scale() > 2 {
        return Err(LmsError::validation(
            "Price must have at most two decimal places",
        ));
    }
    let cents = normalized * Decimal::ONE_HUNDRED;
    i64::try_from(cents).map_err(|_| LmsError::validation("Price is out of range"))
}

// 课程实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Course {
    pub id: i64,
    pub teacher_id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    #[ts(type = "string")]
    pub price: Decimal,
    pub status: CourseStatus,
    pub scheduled_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Course {
    /// 免费课程：价格精确等于 0.00
    pub fn is_free(&self) -> bool {
        self.price.is_zero()
    }

    pub fn is_published(&self) -> bool {
        self.status == CourseStatus::Published
    }

    /// 课程是否对该用户可见（草稿仅对所属教师可见）
    pub fn is_visible_to(&self, viewer_id: Option<i64>) -> bool {
        self.is_published() || viewer_id == Some(self.teacher_id)
    }

    /// 选课按钮文案
    pub fn enroll_action_label(&self) -> &'static str {
        if self.is_free() { "Enroll Now" } else { "Buy Now" }
    }
}

// 课程章节
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseModule {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
}

// 课时
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Lesson {
    pub id: i64,
    pub module_id: i64,
    pub title: String,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub lesson_type: LessonType,
    pub file_path: Option<String>,
    pub duration_minutes: Option<i32>,
    pub order_index: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn course_with_price(price: &str) -> Course {
        let now = chrono::Utc::now();
        Course {
            id: 1,
            teacher_id: 7,
            title: "Rust".into(),
            description: "Systems programming".into(),
            category: "Programming".into(),
            price: Decimal::from_str(price).unwrap(),
            status: CourseStatus::Published,
            scheduled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_is_free_is_exact_zero() {
        assert!(course_with_price("0").is_free());
        assert!(course_with_price("0.00").is_free());
        assert!(!course_with_price("0.01").is_free());
        assert!(!course_with_price("49.99").is_free());
    }

    #[test]
    fn test_enroll_action_label() {
        assert_eq!(course_with_price("0.00").enroll_action_label(), "Enroll Now");
        assert_eq!(course_with_price("19.00").enroll_action_label(), "Buy Now");
    }

    #[test]
    fn test_draft_visible_only_to_owner() {
        let mut course = course_with_price("0");
        course.status = CourseStatus::Draft;
        assert!(course.is_visible_to(Some(7)));
        assert!(!course.is_visible_to(Some(8)));
        assert!(!course.is_visible_to(None));
    }

    #[test]
    fn test_price_cents_conversion() {
        assert_eq!(price_to_cents(Decimal::from_str("49.99").unwrap()).unwrap(), 4999);
        assert_eq!(price_to_cents(Decimal::from_str("10").unwrap()).unwrap(), 1000);
        assert_eq!(price_to_cents(Decimal::from_str("10.500").unwrap()).unwrap(), 1050);
        assert!(price_to_cents(Decimal::from_str("-1").unwrap()).is_err());
        assert!(price_to_cents(Decimal::from_str("1.005").unwrap()).is_err());
        assert_eq!(price_from_cents(4999).to_string(), "49.99");
        assert_eq!(price_from_cents(0).to_string(), "0.00");
    }

    #[test]
    fn test_lesson_type_parse() {
        assert_eq!("pdf".parse::<LessonType>().unwrap(), LessonType::Pdf);
        assert!("podcast".parse::<LessonType>().is_err());
        assert_eq!(LessonType::default(), LessonType::Article);
    }
}
