pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{User, UserRole};
pub use requests::CreateUserRequest;
pub use responses::UserSummary;
