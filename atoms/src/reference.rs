use crate::catalog::Catalog;
use crate::dossiers::DossierLookup;
use crate::error::ReferenceError;

/// Read-only data every ledger operation resolves against
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub catalog: Catalog,
    pub dossiers: DossierLookup,
}

impl ReferenceData {
    /// Catalog and dossiers shipped with the crate
    pub fn embedded() -> Result<Self, ReferenceError> {
        Ok(Self {
            catalog: Catalog::embedded()?,
            dossiers: DossierLookup::embedded()?,
        })
    }

    /// Load from files, falling back to the embedded copy for any path
    /// left unset.
    pub fn load(
        catalog_path: Option<&str>,
        dossiers_path: Option<&str>,
    ) -> Result<Self, ReferenceError> {
        let catalog = match catalog_path {
            Some(path) => Catalog::from_json(&read_file(path)?)?,
            None => Catalog::embedded()?,
        };
        let dossiers = match dossiers_path {
            Some(path) => DossierLookup::from_json(&read_file(path)?)?,
            None => DossierLookup::embedded()?,
        };

        tracing::info!(
            obligations = catalog.obligations().len(),
            dossiers = dossiers.len(),
            "Reference data loaded"
        );

        Ok(Self { catalog, dossiers })
    }
}

pub(crate) fn read_file(path: &str) -> Result<String, ReferenceError> {
    std::fs::read_to_string(path).map_err(|source| ReferenceError::Io {
        path: path.to_string(),
        source,
    })
}

/// Seed users shipped with the crate
pub const EMBEDDED_USERS: &str = include_str!("../data/users.json");

/// Read a seed user file, or the embedded one when no path is given
pub fn load_seed_users(path: Option<&str>) -> Result<Vec<crate::users::User>, ReferenceError> {
    match path {
        Some(path) => crate::users::parse_seed_users(&read_file(path)?),
        None => crate::users::parse_seed_users(EMBEDDED_USERS),
    }
}
