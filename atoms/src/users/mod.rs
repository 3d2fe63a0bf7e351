pub mod model;
pub mod service;

pub use model::{Role, User, UserSummary};
pub use service::*;
