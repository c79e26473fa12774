pub mod constants;
pub mod errors;
pub mod jsonpath;
pub mod k8s;
pub mod logging;

pub mod prelude {
    pub use kube::api::{
        DynamicObject,
        TypeMeta,
    };
    pub use kube::ResourceExt;

    pub use crate::constants::*;
    pub use crate::errors::EmptyResult;
    pub use crate::k8s::{
        ApplyParams,
        DeleteOutcome,
        ObjectClient,
        ObjectRef,
        ResourceTarget,
        Scope,
        GVK,
    };
}
