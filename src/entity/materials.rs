//! 学习资料实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "materials")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub material_type: String,
    pub content: Option<Vec<u8>>,
    pub content_hash: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::lesson_materials::Entity")]
    LessonMaterials,
}

impl Related<super::lesson_materials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LessonMaterials.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_material(self) -> crate::models::materials::Material {
        use crate::models::materials::{Material, MaterialType};
        use chrono::{DateTime, Utc};

        Material {
            id: self.id,
            title: self.title,
            material_type: self
                .material_type
                .parse::<MaterialType>()
                .unwrap_or(MaterialType::File),
            content_hash: self.content_hash,
            has_content: self.content.is_some(),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
