//! 预导入模块，方便使用

pub use super::class_students::{
    ActiveModel as ClassStudentActiveModel, Entity as ClassStudents, Model as ClassStudentModel,
};
pub use super::english_classes::{
    ActiveModel as EnglishClassActiveModel, Entity as EnglishClasses, Model as EnglishClassModel,
};
pub use super::lesson_materials::{
    ActiveModel as LessonMaterialActiveModel, Entity as LessonMaterials,
    Model as LessonMaterialModel,
};
pub use super::lessons::{ActiveModel as LessonActiveModel, Entity as Lessons, Model as LessonModel};
pub use super::materials::{
    ActiveModel as MaterialActiveModel, Entity as Materials, Model as MaterialModel,
};
pub use super::schedules::{
    ActiveModel as ScheduleActiveModel, Entity as Schedules, Model as ScheduleModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
