//! 课程安排存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::schedules::{ActiveModel, Column, Entity as Schedules};
use crate::errors::{HesoError, Result};
use crate::models::schedules::{Schedule, ScheduleInput};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 班级的主安排（id 最小）
    pub async fn get_canonical_schedule_impl(&self, class_id: i64) -> Result<Option<Schedule>> {
        canonical_schedule(&self.db, class_id).await
    }
}

pub(super) async fn canonical_schedule<C: ConnectionTrait>(
    conn: &C,
    class_id: i64,
) -> Result<Option<Schedule>> {
    let result = Schedules::find()
        .filter(Column::ClassId.eq(class_id))
        .order_by_asc(Column::Id)
        .one(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("查询课程安排失败: {e}")))?;

    Ok(result.map(|m| m.into_schedule()))
}

/// 批量获取各班级的主安排
pub(super) async fn canonical_schedules<C: ConnectionTrait>(
    conn: &C,
    class_ids: &[i64],
) -> Result<HashMap<i64, Schedule>> {
    if class_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = Schedules::find()
        .filter(Column::ClassId.is_in(class_ids.to_vec()))
        .order_by_asc(Column::Id)
        .all(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("查询课程安排失败: {e}")))?;

    let mut result = HashMap::new();
    for row in rows {
        // 按 id 升序，先出现的即主安排
        result
            .entry(row.class_id)
            .or_insert_with(|| row.into_schedule());
    }
    Ok(result)
}

pub(super) async fn insert_schedule<C: ConnectionTrait>(
    conn: &C,
    class_id: i64,
    input: ScheduleInput,
) -> Result<Schedule> {
    let model = ActiveModel {
        class_id: Set(class_id),
        term: Set(input.term),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        ..Default::default()
    };

    let result = model
        .insert(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("创建课程安排失败: {e}")))?;

    Ok(result.into_schedule())
}

/// 更新主安排，不存在时创建
pub(super) async fn upsert_canonical_schedule<C: ConnectionTrait>(
    conn: &C,
    class_id: i64,
    input: ScheduleInput,
) -> Result<Schedule> {
    let Some(existing) = canonical_schedule(conn, class_id).await? else {
        return insert_schedule(conn, class_id, input).await;
    };

    let model = ActiveModel {
        id: Set(existing.id),
        class_id: Set(class_id),
        term: Set(input.term),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
    };

    let result = model
        .update(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("更新课程安排失败: {e}")))?;

    Ok(result.into_schedule())
}
