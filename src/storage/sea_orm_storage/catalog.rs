use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::courses::{self, build_search_text};
use crate::entity::prelude::*;
use crate::entity::{course_modules, enrollments, lessons, quiz_questions, quizzes, users};
use crate::errors::{LmsError, Result};
use crate::models::{
    PaginationInfo,
    courses::{
        entities::{Course, CourseModule, CourseStatus, Lesson, price_to_cents},
        requests::{
            CatalogFilter, CreateCourseRequest, CreateLessonRequest, CreateModuleRequest,
            PriceFilter,
        },
        responses::{CourseListResponse, CourseSummary, CourseTree, ModuleTree, QuizSummary},
    },
    dashboard::responses::TeacherCourseItem,
    quizzes::{
        entities::{Quiz, QuizQuestion},
        requests::{CreateQuizQuestionRequest, CreateQuizRequest},
    },
};
use crate::utils::sql::contains_ignore_case;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select, Set,
};

impl SeaOrmStorage {
    /// 创建课程
    pub async fn create_course_impl(&self, req: CreateCourseRequest) -> Result<Course> {
        req.validate()?;
        let price_cents = price_to_cents(req.price)?;
        let now = chrono::Utc::now().timestamp();

        let model = CourseActiveModel {
            teacher_id: Set(req.teacher_id),
            search_text: Set(build_search_text(&req.title, &req.description)),
            title: Set(req.title),
            description: Set(req.description),
            category: Set(req.category),
            price_cents: Set(price_cents),
            status: Set(req.status.to_string()),
            scheduled_at: Set(req.scheduled_at.map(|dt| dt.timestamp())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建课程失败: {e}")))?;

        Ok(result.into_course())
    }

    /// 创建章节
    pub async fn create_module_impl(&self, req: CreateModuleRequest) -> Result<CourseModule> {
        req.validate()?;
        if self.get_course_by_id_impl(req.course_id).await?.is_none() {
            return Err(LmsError::not_found(format!(
                "Course {} not found",
                req.course_id
            )));
        }
        let now = chrono::Utc::now().timestamp();

        let model = CourseModuleActiveModel {
            course_id: Set(req.course_id),
            title: Set(req.title),
            description: Set(req.description),
            order_index: Set(req.order_index),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建章节失败: {e}")))?;

        Ok(result.into_module())
    }

    /// 创建课时
    pub async fn create_lesson_impl(&self, req: CreateLessonRequest) -> Result<Lesson> {
        req.validate()?;
        let module_exists = CourseModules::find_by_id(req.module_id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询章节失败: {e}")))?
            .is_some();
        if !module_exists {
            return Err(LmsError::not_found(format!(
                "Module {} not found",
                req.module_id
            )));
        }
        let now = chrono::Utc::now().timestamp();

        let model = LessonActiveModel {
            module_id: Set(req.module_id),
            title: Set(req.title),
            content: Set(req.content),
            lesson_type: Set(req.lesson_type.to_string()),
            file_path: Set(req.file_path),
            duration_minutes: Set(req.duration_minutes),
            order_index: Set(req.order_index),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建课时失败: {e}")))?;

        Ok(result.into_lesson())
    }

    /// 创建测验，每个章节最多一个
    pub async fn create_quiz_impl(&self, req: CreateQuizRequest) -> Result<Quiz> {
        req.validate()?;
        let now = chrono::Utc::now().timestamp();

        let model = QuizActiveModel {
            module_id: Set(req.module_id),
            title: Set(req.title),
            description: Set(req.description),
            time_limit_minutes: Set(req.time_limit_minutes),
            passing_score: Set(req.passing_score),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建测验失败: {e}")))?;

        Ok(result.into_quiz())
    }

    /// 创建测验题目
    pub async fn create_quiz_question_impl(
        &self,
        req: CreateQuizQuestionRequest,
    ) -> Result<QuizQuestion> {
        req.validate()?;
        let now = chrono::Utc::now().timestamp();

        let model = QuizQuestionActiveModel {
            quiz_id: Set(req.quiz_id),
            question: Set(req.question),
            options: Set(serde_json::to_string(&req.options)?),
            correct_answer_index: Set(req.correct_answer_index),
            points: Set(req.points),
            order_index: Set(req.order_index),
            created_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建测验题目失败: {e}")))?;

        Ok(result.into_question())
    }

    /// 通过 ID 获取课程
    pub async fn get_course_by_id_impl(&self, id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    fn published_courses() -> Select<Courses> {
        Courses::find().filter(courses::Column::Status.eq(CourseStatus::PUBLISHED))
    }

    /// 分页列出已发布课程
    pub async fn list_published_courses_impl(
        &self,
        filter: &CatalogFilter,
        page_size: u64,
    ) -> Result<CourseListResponse> {
        let page = filter.page.max(1);
        let size = page_size.max(1);

        let mut select = Self::published_courses();

        if let Some(ref category) = filter.category {
            select = select.filter(courses::Column::Category.eq(category.as_str()));
        }

        // 标题或描述包含关键字（search_text 已小写化）
        if let Some(ref search) = filter.search {
            select = select.filter(courses::Column::SearchText.like(contains_ignore_case(search)));
        }

        match filter.price {
            Some(PriceFilter::Free) => {
                select = select.filter(courses::Column::PriceCents.eq(0));
            }
            Some(PriceFilter::Paid) => {
                select = select.filter(courses::Column::PriceCents.gt(0));
            }
            None => {}
        }

        select = select
            .order_by_desc(courses::Column::CreatedAt)
            .order_by_desc(courses::Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程总数失败: {e}")))?;

        // 超出范围的页码落到最后一页
        let page = page.min(total.div_ceil(size).max(1));

        let models = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程列表失败: {e}")))?;

        Ok(CourseListResponse {
            items: self.summarize_courses(models).await?,
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    /// 首页推荐：最新发布的课程
    pub async fn list_featured_courses_impl(&self, limit: u64) -> Result<Vec<CourseSummary>> {
        let models = Self::published_courses()
            .order_by_desc(courses::Column::CreatedAt)
            .order_by_desc(courses::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询推荐课程失败: {e}")))?;

        self.summarize_courses(models).await
    }

    /// 已发布课程的分类，升序
    pub async fn list_published_categories_impl(&self) -> Result<Vec<String>> {
        Self::published_courses()
            .select_only()
            .column(courses::Column::Category)
            .distinct()
            .order_by_asc(courses::Column::Category)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程分类失败: {e}")))
    }

    pub async fn count_published_courses_impl(&self) -> Result<i64> {
        let count = Self::published_courses()
            .count(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计课程失败: {e}")))?;
        Ok(count as i64)
    }

    /// 课程完整结构
    ///
    /// 课程不存在，或为草稿且访问者不是授课教师时返回 `None`。
    pub async fn get_course_tree_impl(
        &self,
        course_id: i64,
        viewer_id: Option<i64>,
    ) -> Result<Option<CourseTree>> {
        let Some(course) = self.get_course_by_id_impl(course_id).await? else {
            return Ok(None);
        };
        if !course.is_visible_to(viewer_id) {
            return Ok(None);
        }

        let teacher = Users::find_by_id(course.teacher_id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询授课教师失败: {e}")))?
            .ok_or_else(|| {
                LmsError::database_operation(format!(
                    "课程 {} 的授课教师 {} 不存在",
                    course.id, course.teacher_id
                ))
            })?;

        let modules = CourseModules::find()
            .filter(course_modules::Column::CourseId.eq(course.id))
            .order_by_asc(course_modules::Column::OrderIndex)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询章节失败: {e}")))?;
        let module_ids: Vec<i64> = modules.iter().map(|m| m.id).collect();

        let mut lessons_by_module: HashMap<i64, Vec<Lesson>> = HashMap::new();
        let lesson_models = Lessons::find()
            .filter(lessons::Column::ModuleId.is_in(module_ids.clone()))
            .order_by_asc(lessons::Column::ModuleId)
            .order_by_asc(lessons::Column::OrderIndex)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课时失败: {e}")))?;
        for lesson in lesson_models {
            lessons_by_module
                .entry(lesson.module_id)
                .or_default()
                .push(lesson.into_lesson());
        }

        let quiz_models = Quizzes::find()
            .filter(quizzes::Column::ModuleId.is_in(module_ids))
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询测验失败: {e}")))?;
        let question_counts: HashMap<i64, i64> = QuizQuestions::find()
            .select_only()
            .column(quiz_questions::Column::QuizId)
            .column_as(quiz_questions::Column::Id.count(), "question_count")
            .filter(quiz_questions::Column::QuizId.is_in(quiz_models.iter().map(|q| q.id)))
            .group_by(quiz_questions::Column::QuizId)
            .into_tuple::<(i64, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计测验题目失败: {e}")))?
            .into_iter()
            .collect();
        let mut quiz_by_module: HashMap<i64, QuizSummary> = quiz_models
            .into_iter()
            .map(|q| {
                let count = question_counts.get(&q.id).copied().unwrap_or(0);
                (q.module_id, QuizSummary::from_quiz(q.into_quiz(), count))
            })
            .collect();

        let module_trees: Vec<ModuleTree> = modules
            .into_iter()
            .map(|m| {
                let lessons = lessons_by_module.remove(&m.id).unwrap_or_default();
                let quiz = quiz_by_module.remove(&m.id);
                ModuleTree {
                    lessons_count: lessons.len() as i64,
                    has_quiz: quiz.is_some(),
                    module: m.into_module(),
                    lessons,
                    quiz,
                }
            })
            .collect();

        Ok(Some(CourseTree {
            is_free: course.is_free(),
            teacher: teacher.into_summary(),
            total_lessons: module_trees.iter().map(|m| m.lessons_count).sum(),
            total_modules: module_trees.len() as i64,
            modules: module_trees,
            course,
        }))
    }

    /// 教师名下所有课程（含草稿）及选课统计
    pub async fn list_teacher_courses_impl(
        &self,
        teacher_id: i64,
    ) -> Result<Vec<TeacherCourseItem>> {
        let models = Courses::find()
            .filter(courses::Column::TeacherId.eq(teacher_id))
            .order_by_desc(courses::Column::CreatedAt)
            .order_by_desc(courses::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询教师课程失败: {e}")))?;
        let course_ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let statuses: HashMap<i64, String> =
            models.iter().map(|m| (m.id, m.status.clone())).collect();

        // (course_id, is_completed, count)
        let counts = Enrollments::find()
            .select_only()
            .column(enrollments::Column::CourseId)
            .column(enrollments::Column::IsCompleted)
            .column_as(enrollments::Column::Id.count(), "enrollment_count")
            .filter(enrollments::Column::CourseId.is_in(course_ids))
            .group_by(enrollments::Column::CourseId)
            .group_by(enrollments::Column::IsCompleted)
            .into_tuple::<(i64, bool, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计选课人数失败: {e}")))?;

        let mut totals: HashMap<i64, (i64, i64)> = HashMap::new();
        for (course_id, is_completed, count) in counts {
            let entry = totals.entry(course_id).or_default();
            entry.0 += count;
            if is_completed {
                entry.1 += count;
            }
        }

        let summaries = self.summarize_courses(models).await?;
        Ok(summaries
            .into_iter()
            .map(|course| {
                let (enrollment_count, completed_count) =
                    totals.get(&course.id).copied().unwrap_or_default();
                TeacherCourseItem {
                    status: statuses.get(&course.id).cloned().unwrap_or_default(),
                    enrollment_count,
                    completed_count,
                    course,
                }
            })
            .collect())
    }

    /// 为一批课程补充教师姓名与课时数
    async fn summarize_courses(
        &self,
        models: Vec<courses::Model>,
    ) -> Result<Vec<CourseSummary>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let course_ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let teacher_ids: Vec<i64> = models.iter().map(|m| m.teacher_id).collect();

        let teacher_names: HashMap<i64, String> = Users::find()
            .select_only()
            .column(users::Column::Id)
            .column(users::Column::Name)
            .filter(users::Column::Id.is_in(teacher_ids))
            .into_tuple::<(i64, String)>()
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询授课教师失败: {e}")))?
            .into_iter()
            .collect();

        let lesson_counts = self.count_lessons_by_course(course_ids).await?;

        Ok(models
            .into_iter()
            .map(|m| {
                let teacher_name = teacher_names.get(&m.teacher_id).cloned().unwrap_or_default();
                let total_lessons = lesson_counts.get(&m.id).copied().unwrap_or(0);
                CourseSummary::from_course(&m.into_course(), teacher_name, total_lessons)
            })
            .collect())
    }

    /// 按课程统计课时数
    pub(crate) async fn count_lessons_by_course(
        &self,
        course_ids: Vec<i64>,
    ) -> Result<HashMap<i64, i64>> {
        let rows = Lessons::find()
            .select_only()
            .column(course_modules::Column::CourseId)
            .column_as(lessons::Column::Id.count(), "lesson_count")
            .join(JoinType::InnerJoin, lessons::Relation::Module.def())
            .filter(course_modules::Column::CourseId.is_in(course_ids))
            .group_by(course_modules::Column::CourseId)
            .into_tuple::<(i64, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计课时失败: {e}")))?;

        Ok(rows.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_course, create_user, sample_course, test_storage};
    use crate::models::courses::entities::CourseStatus;
    use crate::models::courses::requests::{CatalogFilter, CourseCatalogQuery, PriceFilter};
    use crate::models::users::entities::UserRole;
    use rust_decimal::Decimal;
    use test_log::test;

    #[test(tokio::test)]
    async fn test_drafts_never_listed() {
        let (storage, _dir) = test_storage().await;
        let teacher = create_user(&storage, "t@eduplatform.com", UserRole::Teacher).await;
        create_course(
            &storage,
            teacher.id,
            "Published Python",
            "Learn Python",
            "Programming",
            Decimal::ZERO,
            CourseStatus::Published,
        )
        .await;
        create_course(
            &storage,
            teacher.id,
            "Draft Python",
            "Learn Python later",
            "Programming",
            Decimal::ZERO,
            CourseStatus::Draft,
        )
        .await;

        let filters = [
            CatalogFilter::default(),
            CatalogFilter {
                search: Some("python".into()),
                ..Default::default()
            },
            CatalogFilter {
                category: Some("Programming".into()),
                ..Default::default()
            },
            CatalogFilter {
                price: Some(PriceFilter::Free),
                ..Default::default()
            },
        ];
        for filter in filters {
            let page = storage.list_published_courses_impl(&filter, 12).await.unwrap();
            assert_eq!(page.pagination.total, 1, "filter {filter:?}");
            assert!(page.items.iter().all(|c| c.title == "Published Python"));
        }
        assert_eq!(storage.count_published_courses_impl().await.unwrap(), 1);
    }

    #[test(tokio::test)]
    async fn test_search_is_case_insensitive_over_description() {
        let (storage, _dir) = test_storage().await;
        let teacher = create_user(&storage, "t@eduplatform.com", UserRole::Teacher).await;
        create_course(
            &storage,
            teacher.id,
            "Data Analysis",
            "Hands-on work with Python and pandas",
            "Data",
            Decimal::new(4999, 2),
            CourseStatus::Published,
        )
        .await;
        create_course(
            &storage,
            teacher.id,
            "Web Design",
            "CSS layouts",
            "Design",
            Decimal::ZERO,
            CourseStatus::Published,
        )
        .await;

        let filter = CatalogFilter::from(&CourseCatalogQuery {
            search: Some("  PYTHON ".into()),
            ..Default::default()
        });
        let page = storage.list_published_courses_impl(&filter, 12).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Data Analysis");
        assert!(!page.items[0].is_free);
        assert_eq!(page.items[0].enroll_label, "Buy Now");

        // 通配符按字面匹配
        let filter = CatalogFilter {
            search: Some("%".into()),
            ..Default::default()
        };
        let page = storage.list_published_courses_impl(&filter, 12).await.unwrap();
        assert!(page.items.is_empty());
    }

    #[test(tokio::test)]
    async fn test_price_filter_and_pagination() {
        let (storage, _dir) = test_storage().await;
        let teacher = create_user(&storage, "t@eduplatform.com", UserRole::Teacher).await;
        for i in 0..5 {
            let price = if i % 2 == 0 {
                Decimal::ZERO
            } else {
                Decimal::new(1999, 2)
            };
            create_course(
                &storage,
                teacher.id,
                &format!("Course {i}"),
                "Description",
                if i < 3 { "Programming" } else { "Business" },
                price,
                CourseStatus::Published,
            )
            .await;
        }

        let paid = CatalogFilter {
            price: Some(PriceFilter::Paid),
            ..Default::default()
        };
        let page = storage.list_published_courses_impl(&paid, 12).await.unwrap();
        assert_eq!(page.pagination.total, 2);
        assert!(page.items.iter().all(|c| !c.is_free));

        let second_page = CatalogFilter {
            page: 2,
            ..Default::default()
        };
        let page = storage.list_published_courses_impl(&second_page, 2).await.unwrap();
        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.items.len(), 2);
        // 最新的在前，第二页从 Course 2 开始
        assert_eq!(page.items[0].title, "Course 2");

        let beyond_last = CatalogFilter {
            page: u64::MAX,
            ..Default::default()
        };
        let page = storage.list_published_courses_impl(&beyond_last, 2).await.unwrap();
        assert_eq!(page.pagination.page, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Course 0");

        let categories = storage.list_published_categories_impl().await.unwrap();
        assert_eq!(categories, vec!["Business".to_string(), "Programming".to_string()]);
    }

    #[test(tokio::test)]
    async fn test_course_tree_orders_and_hides_drafts() {
        let (storage, _dir) = test_storage().await;
        let teacher = create_user(&storage, "t@eduplatform.com", UserRole::Teacher).await;
        let student = create_user(&storage, "s@eduplatform.com", UserRole::Student).await;
        let sample = sample_course(&storage, teacher.id).await;

        let tree = storage
            .get_course_tree_impl(sample.course.id, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tree.total_modules, 2);
        assert_eq!(tree.total_lessons, 3);
        assert_eq!(tree.lesson_ids().collect::<Vec<_>>(), sample.lesson_ids);
        assert_eq!(tree.quiz_ids().collect::<Vec<_>>(), vec![sample.quiz_id]);
        assert_eq!(tree.modules[1].quiz.as_ref().unwrap().question_count, 2);
        assert!(!tree.modules[0].has_quiz);
        assert_eq!(tree.teacher.id, teacher.id);

        let draft = create_course(
            &storage,
            teacher.id,
            "Hidden",
            "Work in progress",
            "Programming",
            Decimal::ZERO,
            CourseStatus::Draft,
        )
        .await;
        assert!(storage.get_course_tree_impl(draft.id, None).await.unwrap().is_none());
        assert!(
            storage
                .get_course_tree_impl(draft.id, Some(student.id))
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            storage
                .get_course_tree_impl(draft.id, Some(teacher.id))
                .await
                .unwrap()
                .is_some()
        );
        assert!(storage.get_course_tree_impl(9999, None).await.unwrap().is_none());

        let items = storage.list_teacher_courses_impl(teacher.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].status, "draft");
        assert_eq!(items[1].course.total_lessons, 3);
    }
}
