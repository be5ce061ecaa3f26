//! 班级存储操作

use std::collections::{HashMap, HashSet};

use super::SeaOrmStorage;
use super::schedules::{canonical_schedules, insert_schedule, upsert_canonical_schedule};
use crate::entity::class_students::{
    ActiveModel as ClassStudentActiveModel, Column as ClassStudentColumn,
    Entity as ClassStudents,
};
use crate::entity::english_classes::{ActiveModel, Column, Entity as EnglishClasses};
use crate::entity::lesson_materials::{Column as LessonMaterialColumn, Entity as LessonMaterials};
use crate::entity::lessons::{Column as LessonColumn, Entity as Lessons};
use crate::entity::schedules::{Column as ScheduleColumn, Entity as Schedules};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{HesoError, Result};
use crate::models::{
    PaginationInfo,
    classes::{ClassListQuery, ClassListResponse, ClassSummary, ClassUpdate, EnglishClass, NewClass},
    schedules::ScheduleInput,
    users::{UserRole, UserSummary},
};
use crate::utils::escape_like_pattern;
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建班级、成员和主安排
    pub async fn create_class_with_schedule_impl(
        &self,
        class: NewClass,
        schedule: ScheduleInput,
    ) -> Result<EnglishClass> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| HesoError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            title: Set(class.title),
            description: Set(class.description),
            color: Set(class.color),
            teacher_id: Set(class.teacher_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = model
            .insert(&txn)
            .await
            .map_err(|e| HesoError::database_operation(format!("创建班级失败: {e}")))?;

        let student_ids = replace_class_students(&txn, created.id, &class.student_ids).await?;
        insert_schedule(&txn, created.id, schedule).await?;

        txn.commit()
            .await
            .map_err(|e| HesoError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(created.into_class(student_ids))
    }

    /// 通过 ID 获取班级
    pub async fn get_class_by_id_impl(&self, class_id: i64) -> Result<Option<EnglishClass>> {
        find_class(&self.db, class_id).await
    }

    /// 分页列出班级
    pub async fn list_classes_with_pagination_impl(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        let (page, size) = query.pagination.normalized();

        let mut select = EnglishClasses::find();

        // 标题搜索
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select
                .filter(Column::Title.like(LikeExpr::new(format!("%{escaped}%")).escape('\\')));
        }

        select = select.order_by_asc(Column::Title).order_by_asc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| HesoError::database_operation(format!("查询班级总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| HesoError::database_operation(format!("查询班级页数失败: {e}")))?;

        let classes = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| HesoError::database_operation(format!("查询班级列表失败: {e}")))?;

        let class_ids: Vec<i64> = classes.iter().map(|c| c.id).collect();
        let teacher_ids: Vec<i64> = classes.iter().map(|c| c.teacher_id).collect();

        let teachers = user_summaries(&self.db, &teacher_ids).await?;
        let members = student_ids_by_class(&self.db, &class_ids).await?;
        let mut schedules = canonical_schedules(&self.db, &class_ids).await?;

        let items = classes
            .into_iter()
            .map(|c| ClassSummary {
                id: c.id,
                teacher: teachers.get(&c.teacher_id).cloned().unwrap_or(UserSummary {
                    id: c.teacher_id,
                    username: String::new(),
                }),
                number_of_students: members.get(&c.id).map_or(0, Vec::len),
                schedule: schedules.remove(&c.id),
                title: c.title,
                description: c.description,
                color: c.color,
            })
            .collect();

        Ok(ClassListResponse {
            items,
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 更新班级、成员和主安排
    pub async fn update_class_with_schedule_impl(
        &self,
        class_id: i64,
        update: ClassUpdate,
        schedule: ScheduleInput,
    ) -> Result<Option<EnglishClass>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| HesoError::database_operation(format!("开启事务失败: {e}")))?;

        if find_class(&txn, class_id).await?.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(class_id),
            title: Set(update.title),
            teacher_id: Set(update.teacher_id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(description) = update.description {
            model.description = Set(description);
        }

        if let Some(color) = update.color {
            model.color = Set(color);
        }

        model
            .update(&txn)
            .await
            .map_err(|e| HesoError::database_operation(format!("更新班级失败: {e}")))?;

        replace_class_students(&txn, class_id, &update.student_ids).await?;
        upsert_canonical_schedule(&txn, class_id, schedule).await?;

        let updated = find_class(&txn, class_id).await?;

        txn.commit()
            .await
            .map_err(|e| HesoError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(updated)
    }

    /// 删除班级，依赖数据一并删除
    pub async fn delete_class_impl(&self, class_id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| HesoError::database_operation(format!("开启事务失败: {e}")))?;

        let lesson_ids: Vec<i64> = Lessons::find()
            .select_only()
            .column(LessonColumn::Id)
            .filter(LessonColumn::ClassId.eq(class_id))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| HesoError::database_operation(format!("查询课时失败: {e}")))?;

        if !lesson_ids.is_empty() {
            LessonMaterials::delete_many()
                .filter(LessonMaterialColumn::LessonId.is_in(lesson_ids))
                .exec(&txn)
                .await
                .map_err(|e| HesoError::database_operation(format!("删除课时资料关联失败: {e}")))?;
        }

        Lessons::delete_many()
            .filter(LessonColumn::ClassId.eq(class_id))
            .exec(&txn)
            .await
            .map_err(|e| HesoError::database_operation(format!("删除课时失败: {e}")))?;

        Schedules::delete_many()
            .filter(ScheduleColumn::ClassId.eq(class_id))
            .exec(&txn)
            .await
            .map_err(|e| HesoError::database_operation(format!("删除课程安排失败: {e}")))?;

        ClassStudents::delete_many()
            .filter(ClassStudentColumn::ClassId.eq(class_id))
            .exec(&txn)
            .await
            .map_err(|e| HesoError::database_operation(format!("删除班级成员失败: {e}")))?;

        let result = EnglishClasses::delete_by_id(class_id)
            .exec(&txn)
            .await
            .map_err(|e| HesoError::database_operation(format!("删除班级失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| HesoError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 已被占用的颜色
    pub async fn list_used_colors_impl(
        &self,
        exclude_class_id: Option<i64>,
    ) -> Result<HashSet<String>> {
        let mut select = EnglishClasses::find()
            .select_only()
            .column(Column::Color);

        if let Some(id) = exclude_class_id {
            select = select.filter(Column::Id.ne(id));
        }

        let colors: Vec<String> = select
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| HesoError::database_operation(format!("查询班级颜色失败: {e}")))?;

        Ok(colors.into_iter().collect())
    }

    /// 班级课时数量
    pub async fn count_lessons_for_class_impl(&self, class_id: i64) -> Result<u64> {
        Lessons::find()
            .filter(LessonColumn::ClassId.eq(class_id))
            .count(&self.db)
            .await
            .map_err(|e| HesoError::database_operation(format!("统计课时数量失败: {e}")))
    }
}

pub(super) async fn find_class<C: ConnectionTrait>(
    conn: &C,
    class_id: i64,
) -> Result<Option<EnglishClass>> {
    let Some(model) = EnglishClasses::find_by_id(class_id)
        .one(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("查询班级失败: {e}")))?
    else {
        return Ok(None);
    };

    let mut members = student_ids_by_class(conn, &[class_id]).await?;
    let student_ids = members.remove(&class_id).unwrap_or_default();
    Ok(Some(model.into_class(student_ids)))
}

/// 批量获取班级的学生 ID
pub(super) async fn student_ids_by_class<C: ConnectionTrait>(
    conn: &C,
    class_ids: &[i64],
) -> Result<HashMap<i64, Vec<i64>>> {
    if class_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = ClassStudents::find()
        .filter(ClassStudentColumn::ClassId.is_in(class_ids.to_vec()))
        .order_by_asc(ClassStudentColumn::StudentId)
        .all(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("查询班级成员失败: {e}")))?;

    let mut result: HashMap<i64, Vec<i64>> = HashMap::new();
    for row in rows {
        result.entry(row.class_id).or_default().push(row.student_id);
    }
    Ok(result)
}

/// 整体替换班级成员，非学生账号被忽略，返回最终的学生 ID
pub(super) async fn replace_class_students<C: ConnectionTrait>(
    conn: &C,
    class_id: i64,
    student_ids: &[i64],
) -> Result<Vec<i64>> {
    ClassStudents::delete_many()
        .filter(ClassStudentColumn::ClassId.eq(class_id))
        .exec(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("清空班级成员失败: {e}")))?;

    if student_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut valid: Vec<i64> = Users::find()
        .select_only()
        .column(UserColumn::Id)
        .filter(UserColumn::Id.is_in(student_ids.to_vec()))
        .filter(UserColumn::Role.eq(UserRole::STUDENT))
        .into_tuple()
        .all(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("查询学生失败: {e}")))?;
    valid.sort_unstable();
    valid.dedup();

    let now = chrono::Utc::now().timestamp();
    for student_id in &valid {
        ClassStudentActiveModel {
            class_id: Set(class_id),
            student_id: Set(*student_id),
            joined_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("添加班级成员失败: {e}")))?;
    }

    Ok(valid)
}

/// 批量获取用户的精简信息
pub(super) async fn user_summaries<C: ConnectionTrait>(
    conn: &C,
    ids: &[i64],
) -> Result<HashMap<i64, UserSummary>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = Users::find()
        .filter(UserColumn::Id.is_in(ids.to_vec()))
        .all(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("查询用户失败: {e}")))?;

    Ok(users
        .into_iter()
        .map(|u| (u.id, u.into_summary()))
        .collect())
}
