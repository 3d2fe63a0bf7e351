use crate::users::Role;

/// Failures reported by the storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend rejected or failed the request
    #[error("{0}")]
    Backend(String),

    /// A stored row could not be decoded into a domain type
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Failures of the assignment workflow. Every variant is reported to the
/// caller; nothing here is swallowed.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("user {user_id} is not allowed to {action}")]
    NotAuthorized { user_id: u32, action: &'static str },

    #[error("task {task_id} in dossier {dossier_id} is not assigned to user {user_id}")]
    NotAssigned {
        task_id: u32,
        dossier_id: String,
        user_id: u32,
    },

    #[error("unknown task {0}")]
    UnknownTask(u32),

    #[error("unknown dossier {0}")]
    UnknownDossier(String),

    #[error("unknown user {0}")]
    UnknownUser(u32),

    #[error("unknown obligation type {0}")]
    UnknownObligation(String),

    #[error("user {user_id} has role {role}, expected {expected}")]
    InvalidRole {
        user_id: u32,
        role: Role,
        expected: &'static str,
    },

    #[error("invalid status {0:?}, expected todo, in_progress or done")]
    InvalidTransition(String),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl LedgerError {
    /// Stable name of the failure kind, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::NotAuthorized { .. } => "NotAuthorized",
            LedgerError::NotAssigned { .. } => "NotAssigned",
            LedgerError::UnknownTask(_) => "UnknownTask",
            LedgerError::UnknownDossier(_) => "UnknownDossier",
            LedgerError::UnknownUser(_) => "UnknownUser",
            LedgerError::UnknownObligation(_) => "UnknownObligation",
            LedgerError::InvalidRole { .. } => "InvalidRole",
            LedgerError::InvalidTransition(_) => "InvalidTransition",
            LedgerError::Storage(_) => "StorageError",
        }
    }
}

/// Failures while loading the static catalog, dossier or seed files.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid reference json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("task {0} appears more than once in the catalog")]
    DuplicateTask(u32),

    #[error("step {0} appears more than once in the catalog")]
    DuplicateStep(u32),
}
