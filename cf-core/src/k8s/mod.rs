mod client;
mod gvk;
mod target;

#[cfg(feature = "mock")]
pub use client::MockObjectClient;
pub use client::{
    ApplyParams,
    DeleteOutcome,
    KubeObjectClient,
    ObjectClient,
};
pub use gvk::*;
pub use target::*;

#[cfg(test)]
mod tests;
