use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::{CourseStatus, LessonType};
use crate::errors::{LmsError, Result};
use crate::models::common::parse_page_number;

// 价格筛选
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub enum PriceFilter {
    Free,
    Paid,
}

impl PriceFilter {
    /// 未知取值返回 None（即不筛选）
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "free" => Some(PriceFilter::Free),
            "paid" => Some(PriceFilter::Paid),
            _ => None,
        }
    }
}

// 课程目录查询参数（来自HTTP请求，全部按字符串接收）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseCatalogQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub price_filter: Option<String>,
}

/// 校验后的目录筛选条件：非法或空白的筛选值被忽略
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogFilter {
    pub page: u64,
    pub search: Option<String>,
    pub category: Option<String>,
    pub price: Option<PriceFilter>,
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl From<&CourseCatalogQuery> for CatalogFilter {
    fn from(query: &CourseCatalogQuery) -> Self {
        Self {
            page: parse_page_number(query.page.as_deref()),
            search: non_blank(query.search.as_ref()),
            category: non_blank(query.category.as_ref()),
            price: query.price_filter.as_deref().and_then(PriceFilter::parse),
        }
    }
}

// 创建课程请求（用于存储层）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CreateCourseRequest {
    pub teacher_id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    #[ts(type = "string")]
    pub price: Decimal,
    pub status: CourseStatus,
    pub scheduled_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl CreateCourseRequest {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(LmsError::validation("Course title must not be empty"));
        }
        if self.category.trim().is_empty() {
            return Err(LmsError::validation("Course category must not be empty"));
        }
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(LmsError::validation("Price must not be negative"));
        }
        Ok(())
    }
}

// 创建章节请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CreateModuleRequest {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
}

impl CreateModuleRequest {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(LmsError::validation("Module title must not be empty"));
        }
        if self.order_index < 0 {
            return Err(LmsError::validation("Order index must not be negative"));
        }
        Ok(())
    }
}

// 创建课时请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CreateLessonRequest {
    pub module_id: i64,
    pub title: String,
    pub content: Option<String>,
    #[serde(default, rename = "type")]
    pub lesson_type: LessonType,
    pub file_path: Option<String>,
    pub duration_minutes: Option<i32>,
    pub order_index: i32,
}

impl CreateLessonRequest {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(LmsError::validation("Lesson title must not be empty"));
        }
        if self.order_index < 0 {
            return Err(LmsError::validation("Order index must not be negative"));
        }
        if self.duration_minutes.is_some_and(|d| d < 0) {
            return Err(LmsError::validation("Duration must not be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(search: &str, category: &str, price: &str) -> CourseCatalogQuery {
        CourseCatalogQuery {
            page: None,
            search: Some(search.into()),
            category: Some(category.into()),
            price_filter: Some(price.into()),
        }
    }

    #[test]
    fn test_invalid_price_filter_is_ignored() {
        let filter = CatalogFilter::from(&query("python", "", "cheap"));
        assert_eq!(filter.price, None);
        assert_eq!(filter.search.as_deref(), Some("python"));
        assert_eq!(filter.category, None);
        assert_eq!(filter.page, 1);
    }

    #[test]
    fn test_valid_filters_are_kept() {
        let filter = CatalogFilter::from(&query("  rust ", "Programming", "paid"));
        assert_eq!(filter.search.as_deref(), Some("rust"));
        assert_eq!(filter.category.as_deref(), Some("Programming"));
        assert_eq!(filter.price, Some(PriceFilter::Paid));
    }

    #[test]
    fn test_empty_query_is_unfiltered() {
        assert_eq!(
            CatalogFilter::from(&CourseCatalogQuery::default()),
            CatalogFilter {
                page: 1,
                ..Default::default()
            }
        );
    }
}
