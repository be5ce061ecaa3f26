//! 课程安排实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "schedules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub term: String,
    pub start_date: Date,
    pub end_date: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::english_classes::Entity",
        from = "Column::ClassId",
        to = "super::english_classes::Column::Id"
    )]
    Class,
}

impl Related<super::english_classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_schedule(self) -> crate::models::schedules::Schedule {
        crate::models::schedules::Schedule {
            id: self.id,
            class_id: self.class_id,
            term: self.term,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}
