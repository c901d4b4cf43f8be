use serde::Serialize;
use ts_rs::TS;

use crate::models::courses::responses::CourseSummary;
use crate::models::enrollments::responses::StudentEnrollmentItem;
use crate::models::users::entities::UserRole;

// 平台统计
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct PlatformStats {
    pub total_courses: i64,
    pub total_students: i64,
    pub total_teachers: i64,
    pub total_enrollments: i64,
}

// 首页
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct HomePage {
    pub featured_courses: Vec<CourseSummary>,
    pub stats: PlatformStats,
    pub user_role: Option<UserRole>,
}

// 学生仪表盘统计
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct StudentStats {
    pub total_enrollments: i64,
    pub completed: i64,
    pub in_progress: i64,
}

impl StudentStats {
    pub fn from_items(items: &[StudentEnrollmentItem]) -> Self {
        let completed = items.iter().filter(|i| i.is_completed).count() as i64;
        Self {
            total_enrollments: items.len() as i64,
            completed,
            in_progress: items.len() as i64 - completed,
        }
    }
}

// 学生仪表盘
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct StudentDashboard {
    pub enrollments: Vec<StudentEnrollmentItem>,
    pub stats: StudentStats,
}

// 教师名下课程及选课人数
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct TeacherCourseItem {
    #[serde(flatten)]
    #[ts(flatten)]
    pub course: CourseSummary,
    pub status: String,
    pub enrollment_count: i64,
    pub completed_count: i64,
}

// 教师仪表盘
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct TeacherDashboard {
    pub courses: Vec<TeacherCourseItem>,
}

// 管理员仪表盘
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct AdminDashboard {
    pub stats: PlatformStats,
    pub total_certificates: i64,
}
