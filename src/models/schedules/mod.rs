pub mod entities;

pub use entities::{Schedule, ScheduleInput};
