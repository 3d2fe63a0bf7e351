use serde::{Deserialize, Serialize};

/// A client case folder. Read-only reference data owned by one manager.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Dossier {
    pub dossier_id: String,
    pub title: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub siret: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
    pub legal_form: String,
    pub fiscal_regime: String,
    #[serde(default)]
    pub tax_regime: String,
    /// Name of the obligation type in the task catalog (e.g. "TVA")
    pub obligation: String,
    pub manager_id: u32,
}
