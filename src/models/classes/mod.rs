pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{ClassUpdate, EnglishClass, NewClass};
pub use requests::{ClassFormRequest, ClassListQuery};
pub use responses::{
    ClassDeleteContext, ClassDetail, ClassFormContext, ClassListResponse, ClassSummary,
    HomeResponse,
};
