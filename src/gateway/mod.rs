//! Gateway Layer
//!
//! Data access to the hosted backend, plus an in-memory stand-in.

mod traits;
mod query;
mod memory;
mod rest;
mod probe;

pub use traits::{RemoteGateway, AuthProvider, UserIdentity};
pub use query::{SelectQuery, Filter, Order};
pub use memory::MemoryGateway;
pub use rest::RestBackend;
pub(crate) use rest::error_from_response;
pub use probe::{AssetProbe, HttpAssetProbe};
