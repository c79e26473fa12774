use std::fmt;
use std::ops::Deref;

use kube::api::{
    GroupVersionKind,
    TypeMeta,
};

use crate::errors::*;

// GVK is a newtype around kube's GroupVersionKind so that we can hang our own constructors and
// formatting off of it.  It displays as "group/version.kind" (or "version.kind" for the core group).
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct GVK(GroupVersionKind);

impl GVK {
    pub fn new(group: &str, version: &str, kind: &str) -> GVK {
        GVK(GroupVersionKind::gvk(group, version, kind))
    }

    pub fn from_api_version(api_version: &str, kind: &str) -> anyhow::Result<GVK> {
        ensure!(!kind.is_empty(), "kind must not be empty (apiVersion {api_version})");

        let parts: Vec<_> = api_version.split('/').collect();
        match parts[..] {
            [version] if !version.is_empty() => Ok(GVK::new("", version, kind)),
            [group, version] if !group.is_empty() && !version.is_empty() => Ok(GVK::new(group, version, kind)),
            _ => bail!("invalid format for apiVersion: {api_version:?}"),
        }
    }

    pub fn into_type_meta(&self) -> TypeMeta {
        TypeMeta {
            api_version: self.0.api_version(),
            kind: self.0.kind.clone(),
        }
    }

    pub fn matches_type_meta(&self, tm: &TypeMeta) -> bool {
        tm.api_version == self.0.api_version() && tm.kind == self.0.kind
    }
}

// Impl Deref lets a GVK act like a GroupVersionKind anywhere one of those is expected
impl Deref for GVK {
    type Target = GroupVersionKind;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for GVK {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.group.is_empty() {
            write!(f, "{}.{}", self.0.version, self.0.kind)
        } else {
            write!(f, "{}/{}.{}", self.0.group, self.0.version, self.0.kind)
        }
    }
}
