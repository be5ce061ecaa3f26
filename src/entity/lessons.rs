//! 课时实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lessons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub start_time: i64,
    pub end_time: i64,
    pub meeting_link: Option<String>,
    pub location: String,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::english_classes::Entity",
        from = "Column::ClassId",
        to = "super::english_classes::Column::Id"
    )]
    Class,
    #[sea_orm(has_many = "super::lesson_materials::Entity")]
    LessonMaterials,
}

impl Related<super::english_classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::lesson_materials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LessonMaterials.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_lesson(self) -> crate::models::lessons::Lesson {
        use crate::models::lessons::{Lesson, LessonLocation, LessonStatus};
        use chrono::{DateTime, Utc};

        Lesson {
            id: self.id,
            class_id: self.class_id,
            title: self.title,
            description: self.description,
            start_time: DateTime::<Utc>::from_timestamp(self.start_time, 0).unwrap_or_default(),
            end_time: DateTime::<Utc>::from_timestamp(self.end_time, 0).unwrap_or_default(),
            meeting_link: self.meeting_link,
            location: self.location.parse::<LessonLocation>().unwrap_or_default(),
            status: self.status.parse::<LessonStatus>().unwrap_or_default(),
        }
    }
}
