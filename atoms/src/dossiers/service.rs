use super::model::Dossier;
use crate::error::ReferenceError;
use std::collections::BTreeMap;

const DEFAULT_DOSSIERS: &str = include_str!("../../data/dossiers.json");

/// Static dossier table keyed by id
#[derive(Debug, Clone, Default)]
pub struct DossierLookup {
    dossiers: BTreeMap<String, Dossier>,
}

impl DossierLookup {
    pub fn new(dossiers: Vec<Dossier>) -> Self {
        Self {
            dossiers: dossiers
                .into_iter()
                .map(|d| (d.dossier_id.clone(), d))
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ReferenceError> {
        let dossiers: Vec<Dossier> = serde_json::from_str(json)?;
        Ok(Self::new(dossiers))
    }

    pub fn embedded() -> Result<Self, ReferenceError> {
        Self::from_json(DEFAULT_DOSSIERS)
    }

    pub fn find(&self, dossier_id: &str) -> Option<&Dossier> {
        self.dossiers.get(dossier_id)
    }

    /// Dossiers owned by a manager, ordered by id
    pub fn list_for_manager(&self, manager_id: u32) -> Vec<Dossier> {
        self.dossiers
            .values()
            .filter(|d| d.manager_id == manager_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.dossiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dossiers.is_empty()
    }
}
