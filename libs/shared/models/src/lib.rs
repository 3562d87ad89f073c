pub mod error;
pub mod scheduling;
pub mod time;

pub use error::{AppError, ErrorKind, SchedulingError};
pub use scheduling::*;
