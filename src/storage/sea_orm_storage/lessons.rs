//! 课时存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use super::classes::{find_class, replace_class_students, student_ids_by_class, user_summaries};
use super::materials::{
    get_or_create_material, link_material, materials_for_lessons, replace_lesson_materials,
};
use crate::entity::english_classes::{
    ActiveModel as ClassActiveModel, Entity as EnglishClasses,
};
use crate::entity::lesson_materials::{Column as LessonMaterialColumn, Entity as LessonMaterials};
use crate::entity::lessons::{ActiveModel, Column, Entity as Lessons};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{HesoError, Result};
use crate::models::{
    lessons::{CalendarData, Lesson, LessonInput, LessonPatch, format_lesson_title, lesson_ordinals},
    materials::{MaterialType, NewMaterial},
    users::{UserRole, UserSummary},
};
use crate::utils::validate::validate_url;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建课时并关联资料
    pub async fn create_lesson_impl(&self, class_id: i64, input: LessonInput) -> Result<Lesson> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| HesoError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            class_id: Set(class_id),
            title: Set(input.title),
            description: Set(input.description),
            start_time: Set(input.start_time.timestamp()),
            end_time: Set(input.end_time.timestamp()),
            meeting_link: Set(input.meeting_link),
            location: Set(input.location.to_string()),
            status: Set(input.status.to_string()),
            ..Default::default()
        };

        let created = model
            .insert(&txn)
            .await
            .map_err(|e| HesoError::database_operation(format!("创建课时失败: {e}")))?;

        replace_lesson_materials(&txn, created.id, &input.material_ids).await?;

        txn.commit()
            .await
            .map_err(|e| HesoError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(created.into_lesson())
    }

    /// 通过 ID 获取课时
    pub async fn get_lesson_by_id_impl(&self, lesson_id: i64) -> Result<Option<Lesson>> {
        find_lesson(&self.db, lesson_id).await
    }

    /// 列出班级课时
    pub async fn list_lessons_for_class_impl(&self, class_id: i64) -> Result<Vec<Lesson>> {
        lessons_for_class(&self.db, class_id).await
    }

    /// 表单整体更新课时
    pub async fn update_lesson_impl(
        &self,
        lesson_id: i64,
        input: LessonInput,
    ) -> Result<Option<Lesson>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| HesoError::database_operation(format!("开启事务失败: {e}")))?;

        let Some(existing) = find_lesson(&txn, lesson_id).await? else {
            return Ok(None);
        };

        let model = ActiveModel {
            id: Set(lesson_id),
            class_id: Set(existing.class_id),
            title: Set(input.title),
            description: Set(input.description),
            start_time: Set(input.start_time.timestamp()),
            end_time: Set(input.end_time.timestamp()),
            meeting_link: Set(input.meeting_link),
            location: Set(input.location.to_string()),
            status: Set(input.status.to_string()),
        };

        let updated = model
            .update(&txn)
            .await
            .map_err(|e| HesoError::database_operation(format!("更新课时失败: {e}")))?;

        replace_lesson_materials(&txn, lesson_id, &input.material_ids).await?;

        txn.commit()
            .await
            .map_err(|e| HesoError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(Some(updated.into_lesson()))
    }

    /// 删除课时及其资料关联
    pub async fn delete_lesson_impl(&self, lesson_id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| HesoError::database_operation(format!("开启事务失败: {e}")))?;

        LessonMaterials::delete_many()
            .filter(LessonMaterialColumn::LessonId.eq(lesson_id))
            .exec(&txn)
            .await
            .map_err(|e| HesoError::database_operation(format!("删除课时资料关联失败: {e}")))?;

        let result = Lessons::delete_by_id(lesson_id)
            .exec(&txn)
            .await
            .map_err(|e| HesoError::database_operation(format!("删除课时失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| HesoError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 日历局部更新，全部修改在同一事务中完成
    pub async fn apply_lesson_patch_impl(
        &self,
        lesson_id: i64,
        patch: LessonPatch,
    ) -> Result<Lesson> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| HesoError::database_operation(format!("开启事务失败: {e}")))?;

        let lesson = find_lesson(&txn, lesson_id)
            .await?
            .ok_or_else(|| HesoError::not_found("Lesson not found."))?;
        let class = find_class(&txn, lesson.class_id)
            .await?
            .ok_or_else(|| HesoError::not_found("Lesson not found."))?;

        // 会议链接规则
        let location = patch.location.unwrap_or(lesson.location);
        let meeting_link = patch.resolve_meeting_link(location, lesson.meeting_link.as_deref());
        if location.is_online() {
            match meeting_link.as_deref() {
                None => {
                    return Err(HesoError::validation(
                        "Meeting link is required for online lessons.",
                    ));
                }
                Some(link) => validate_url(link).map_err(HesoError::validation)?,
            }
        }

        // 先确认新教师存在
        let new_teacher = match patch.teacher_id {
            Some(teacher_id) => Some(
                Users::find_by_id(teacher_id)
                    .filter(UserColumn::Role.eq(UserRole::TEACHER))
                    .one(&txn)
                    .await
                    .map_err(|e| HesoError::database_operation(format!("查询教师失败: {e}")))?
                    .ok_or_else(|| HesoError::not_found("Teacher not found."))?,
            ),
            None => None,
        };

        let mut model = ActiveModel {
            id: Set(lesson_id),
            location: Set(location.to_string()),
            meeting_link: Set(meeting_link),
            ..Default::default()
        };
        if let Some(description) = patch.description.clone() {
            model.description = Set(description);
        }
        if let Some(start) = patch.start_time {
            model.start_time = Set(start.timestamp());
        }
        if let Some(end) = patch.end_time {
            model.end_time = Set(end.timestamp());
        }
        model
            .update(&txn)
            .await
            .map_err(|e| HesoError::database_operation(format!("更新课时失败: {e}")))?;

        if let Some(teacher) = new_teacher {
            ClassActiveModel {
                id: Set(class.id),
                teacher_id: Set(teacher.id),
                updated_at: Set(chrono::Utc::now().timestamp()),
                ..Default::default()
            }
            .update(&txn)
            .await
            .map_err(|e| HesoError::database_operation(format!("更新班级教师失败: {e}")))?;

            // 时间可能已变化，按更新后的顺序计算序号
            let siblings = lessons_for_class(&txn, class.id).await?;
            let ordinals = lesson_ordinals(&siblings);
            let (number, total) = ordinals.get(&lesson_id).copied().unwrap_or((1, 1));
            ActiveModel {
                id: Set(lesson_id),
                title: Set(format_lesson_title(
                    &class.title,
                    number,
                    total,
                    &teacher.username,
                )),
                ..Default::default()
            }
            .update(&txn)
            .await
            .map_err(|e| HesoError::database_operation(format!("更新课时标题失败: {e}")))?;
        }

        if let Some(student_ids) = &patch.student_ids {
            replace_class_students(&txn, class.id, student_ids).await?;
        }

        if let Some(material_ids) = &patch.material_ids {
            replace_lesson_materials(&txn, lesson_id, material_ids).await?;
        }

        for upload in patch.new_materials {
            let material = get_or_create_material(
                &txn,
                NewMaterial {
                    title: upload.filename,
                    material_type: MaterialType::File,
                    content: Some(upload.content),
                },
            )
            .await?;
            link_material(&txn, lesson_id, material.id).await?;
        }

        let updated = find_lesson(&txn, lesson_id)
            .await?
            .ok_or_else(|| HesoError::not_found("Lesson not found."))?;

        txn.commit()
            .await
            .map_err(|e| HesoError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(updated)
    }

    /// 加载日历所需数据
    pub async fn load_calendar_data_impl(&self, class_id: Option<i64>) -> Result<CalendarData> {
        let mut select = Lessons::find();
        if let Some(id) = class_id {
            select = select.filter(Column::ClassId.eq(id));
        }
        let lessons: Vec<Lesson> = select
            .order_by_asc(Column::StartTime)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| HesoError::database_operation(format!("查询课时列表失败: {e}")))?
            .into_iter()
            .map(|m| m.into_lesson())
            .collect();

        let mut class_ids: Vec<i64> = lessons.iter().map(|l| l.class_id).collect();
        class_ids.sort_unstable();
        class_ids.dedup();

        let mut members = student_ids_by_class(&self.db, &class_ids).await?;
        let classes: HashMap<i64, _> = if class_ids.is_empty() {
            HashMap::new()
        } else {
            EnglishClasses::find()
                .filter(crate::entity::english_classes::Column::Id.is_in(class_ids.clone()))
                .all(&self.db)
                .await
                .map_err(|e| HesoError::database_operation(format!("查询班级失败: {e}")))?
                .into_iter()
                .map(|m| {
                    let students = members.remove(&m.id).unwrap_or_default();
                    (m.id, m.into_class(students))
                })
                .collect()
        };

        let mut user_ids: Vec<i64> = classes
            .values()
            .flat_map(|c| std::iter::once(c.teacher_id).chain(c.student_ids.iter().copied()))
            .collect();
        user_ids.sort_unstable();
        user_ids.dedup();
        let users = user_summaries(&self.db, &user_ids).await?;

        let lesson_ids: Vec<i64> = lessons.iter().map(|l| l.id).collect();
        let materials_by_lesson = materials_for_lessons(&self.db, &lesson_ids).await?;

        let teachers = self
            .list_users_by_role_impl(UserRole::Teacher)
            .await?
            .iter()
            .map(UserSummary::from)
            .collect();

        Ok(CalendarData {
            lessons,
            classes,
            users,
            materials_by_lesson,
            teachers,
        })
    }
}

async fn find_lesson<C: ConnectionTrait>(conn: &C, lesson_id: i64) -> Result<Option<Lesson>> {
    let result = Lessons::find_by_id(lesson_id)
        .one(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("查询课时失败: {e}")))?;

    Ok(result.map(|m| m.into_lesson()))
}

async fn lessons_for_class<C: ConnectionTrait>(conn: &C, class_id: i64) -> Result<Vec<Lesson>> {
    let rows = Lessons::find()
        .filter(Column::ClassId.eq(class_id))
        .order_by_asc(Column::StartTime)
        .order_by_asc(Column::Id)
        .all(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("查询课时列表失败: {e}")))?;

    Ok(rows.into_iter().map(|m| m.into_lesson()).collect())
}
