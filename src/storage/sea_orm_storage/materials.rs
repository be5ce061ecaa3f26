//! 学习资料存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::lesson_materials::{
    ActiveModel as LessonMaterialActiveModel, Column as LessonMaterialColumn,
    Entity as LessonMaterials,
};
use crate::entity::materials::{ActiveModel, Column, Entity as Materials};
use crate::errors::{HesoError, Result};
use crate::models::materials::{Material, MaterialSummary, NewMaterial};
use crate::utils::digest::sha256_hex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 列出全部资料
    pub async fn list_materials_impl(&self) -> Result<Vec<Material>> {
        let rows = Materials::find()
            .order_by_asc(Column::Title)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| HesoError::database_operation(format!("查询资料列表失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_material()).collect())
    }

    /// 创建资料
    pub async fn create_material_impl(&self, material: NewMaterial) -> Result<Material> {
        insert_material(&self.db, material).await
    }

    /// 查找或创建资料
    pub async fn get_or_create_material_impl(&self, material: NewMaterial) -> Result<Material> {
        get_or_create_material(&self.db, material).await
    }

    /// 关联资料到课时
    pub async fn link_material_impl(&self, lesson_id: i64, material_id: i64) -> Result<()> {
        link_material(&self.db, lesson_id, material_id).await
    }

    /// 批量获取课时的资料
    pub async fn list_materials_for_lessons_impl(
        &self,
        lesson_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<MaterialSummary>>> {
        materials_for_lessons(&self.db, lesson_ids).await
    }
}

async fn insert_material<C: ConnectionTrait>(conn: &C, material: NewMaterial) -> Result<Material> {
    let content_hash = material.content.as_deref().map(sha256_hex);

    let model = ActiveModel {
        title: Set(material.title),
        material_type: Set(material.material_type.to_string()),
        content: Set(material.content),
        content_hash: Set(content_hash),
        created_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    };

    let result = model
        .insert(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("创建资料失败: {e}")))?;

    Ok(result.into_material())
}

/// 按 (标题, 类型, 内容摘要) 查找，找不到时创建
pub(super) async fn get_or_create_material<C: ConnectionTrait>(
    conn: &C,
    material: NewMaterial,
) -> Result<Material> {
    let content_hash = material.content.as_deref().map(sha256_hex);

    let mut select = Materials::find()
        .filter(Column::Title.eq(material.title.as_str()))
        .filter(Column::MaterialType.eq(material.material_type.as_str()));
    select = match &content_hash {
        Some(hash) => select.filter(Column::ContentHash.eq(hash.as_str())),
        None => select.filter(Column::ContentHash.is_null()),
    };

    let existing = select
        .order_by_asc(Column::Id)
        .one(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("查询资料失败: {e}")))?;

    match existing {
        Some(model) => Ok(model.into_material()),
        None => insert_material(conn, material).await,
    }
}

pub(super) async fn link_material<C: ConnectionTrait>(
    conn: &C,
    lesson_id: i64,
    material_id: i64,
) -> Result<()> {
    let linked = LessonMaterials::find()
        .filter(LessonMaterialColumn::LessonId.eq(lesson_id))
        .filter(LessonMaterialColumn::MaterialId.eq(material_id))
        .count(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("查询课时资料失败: {e}")))?;

    if linked > 0 {
        return Ok(());
    }

    LessonMaterialActiveModel {
        lesson_id: Set(lesson_id),
        material_id: Set(material_id),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(|e| HesoError::database_operation(format!("关联课时资料失败: {e}")))?;

    Ok(())
}

/// 整体替换课时资料，不存在的资料 ID 被忽略
pub(super) async fn replace_lesson_materials<C: ConnectionTrait>(
    conn: &C,
    lesson_id: i64,
    material_ids: &[i64],
) -> Result<()> {
    LessonMaterials::delete_many()
        .filter(LessonMaterialColumn::LessonId.eq(lesson_id))
        .exec(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("清空课时资料失败: {e}")))?;

    if material_ids.is_empty() {
        return Ok(());
    }

    let mut existing: Vec<i64> = Materials::find()
        .select_only()
        .column(Column::Id)
        .filter(Column::Id.is_in(material_ids.to_vec()))
        .into_tuple()
        .all(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("查询资料失败: {e}")))?;
    existing.sort_unstable();
    existing.dedup();

    for material_id in existing {
        LessonMaterialActiveModel {
            lesson_id: Set(lesson_id),
            material_id: Set(material_id),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("关联课时资料失败: {e}")))?;
    }

    Ok(())
}

pub(super) async fn materials_for_lessons<C: ConnectionTrait>(
    conn: &C,
    lesson_ids: &[i64],
) -> Result<HashMap<i64, Vec<MaterialSummary>>> {
    if lesson_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let links = LessonMaterials::find()
        .filter(LessonMaterialColumn::LessonId.is_in(lesson_ids.to_vec()))
        .all(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("查询课时资料失败: {e}")))?;

    if links.is_empty() {
        return Ok(HashMap::new());
    }

    let mut material_ids: Vec<i64> = links.iter().map(|l| l.material_id).collect();
    material_ids.sort_unstable();
    material_ids.dedup();

    let materials: HashMap<i64, MaterialSummary> = Materials::find()
        .select_only()
        .column(Column::Id)
        .column(Column::Title)
        .filter(Column::Id.is_in(material_ids))
        .into_tuple::<(i64, String)>()
        .all(conn)
        .await
        .map_err(|e| HesoError::database_operation(format!("查询资料失败: {e}")))?
        .into_iter()
        .map(|(id, title)| (id, MaterialSummary { id, title }))
        .collect();

    let mut result: HashMap<i64, Vec<MaterialSummary>> = HashMap::new();
    for link in links {
        if let Some(material) = materials.get(&link.material_id) {
            result
                .entry(link.lesson_id)
                .or_default()
                .push(material.clone());
        }
    }
    for list in result.values_mut() {
        list.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
    }
    Ok(result)
}
