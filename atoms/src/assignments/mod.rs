pub mod model;
pub mod service;

pub use model::{
    AssignPayload, AssignedTask, Assignment, AssignmentUpdate, DossierGroup, DossierOverview,
    Status, StepGroup, StepOverview, TaskSlot, UpdateStatusPayload,
};
pub use service::*;
