pub mod catalog;
pub mod config;
pub mod data_source;
pub mod diagnostics;
pub mod errors;
pub mod identity;
pub mod manifest;
pub mod provider;
pub mod reconcile;
pub mod resource;
pub mod schema;
pub mod state;
pub mod wait;

pub use crate::catalog::{
    Catalog,
    CrdKind,
};
pub use crate::config::{
    ExtraKind,
    ProviderConfig,
};
pub use crate::data_source::DataSource;
pub use crate::diagnostics::{
    Diagnostic,
    Diagnostics,
    Severity,
};
pub use crate::errors::ProviderError;
pub use crate::provider::{
    Provider,
    ProviderData,
};
pub use crate::resource::{
    Resource,
    ResourceResponse,
};
pub use crate::state::{
    ObjectMetadata,
    ResourceConfig,
    ResourceState,
};
pub use crate::wait::{
    DeleteWait,
    WaitCondition,
};

#[cfg(test)]
mod tests;
