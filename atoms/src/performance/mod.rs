pub mod model;
pub mod service;

pub use model::UserStats;
pub use service::*;
