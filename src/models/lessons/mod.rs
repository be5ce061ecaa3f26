pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{
    CalendarData, Lesson, LessonInput, LessonLocation, LessonPatch, LessonStatus,
    format_lesson_title, lesson_ordinals,
};
pub use requests::{LessonDetailsRequest, LessonFormRequest, UpdateLessonRequest};
pub use responses::{
    CalendarEvent, CalendarEventProps, LessonAjaxResponse, LessonDeleteContext,
    LessonFormContext, LessonListItem, LessonListResponse,
};
