// src/leads/mod.rs

pub mod models;
pub mod store;
pub mod transitions;

pub use models::{Lead, LeadStatus, LeadUpdate, NewLead};
pub use store::{DynLeadStore, LeadStore, MemoryLeadStore, PgLeadStore, StoreError};
pub use transitions::{allowed_transitions, can_transition, validate_transition, IllegalTransition};
