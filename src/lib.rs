//! Orbit Planner client core
//!
//! Entity store with optimistic updates over a hosted Postgres backend,
//! wire mapping, view routing, spotlight search and the AI assistant.
//! A Leptos front end mounts on `ClientStore::state()`.

pub mod domain;
pub mod mapper;
pub mod gateway;
pub mod config;
pub mod store;
pub mod router;
pub mod search;
pub mod kanban;
pub mod financials;
pub mod assistant;

pub use config::{KeyValueStore, MemoryStorage, Settings};
pub use domain::{DomainError, DomainResult};
pub use router::View;
pub use store::{AppState, AppStore, ClientStore, MutationReceipt, MutationStatus};
