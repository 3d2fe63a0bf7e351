pub mod model;
pub mod service;

pub use model::Dossier;
pub use service::DossierLookup;
