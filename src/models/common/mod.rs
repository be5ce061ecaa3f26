pub mod de;
pub mod form;
pub mod pagination;
pub mod response;

pub use form::FormErrors;
pub use pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use response::ApiResponse;
