//! HTTP handlers composing the fiscal atoms into per-role dashboard views.
//! Route matching and session checks live in the API lambda; handlers here
//! receive the already-resolved caller id.

pub mod manager;
pub mod performance;
pub mod profile;
pub mod responses;
pub mod workbench;
