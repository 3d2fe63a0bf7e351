pub mod model;
pub mod service;

pub use model::{CatalogTask, ObligationType, Step};
pub use service::Catalog;
