use std::fmt;

use kube::api::ApiResource;

use super::GVK;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    Namespaced,
    Cluster,
}

// A ResourceTarget is everything we need to talk to the apiserver about a kind without doing
// discovery: the GVK plus the plural resource name that shows up in the URL path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResourceTarget {
    pub gvk: GVK,
    pub plural: String,
    pub scope: Scope,
}

impl ResourceTarget {
    pub fn new(gvk: GVK, plural: &str, scope: Scope) -> ResourceTarget {
        ResourceTarget { gvk, plural: plural.into(), scope }
    }

    pub fn api_resource(&self) -> ApiResource {
        ApiResource::from_gvk_with_plural(&self.gvk, &self.plural)
    }

    pub fn is_namespaced(&self) -> bool {
        self.scope == Scope::Namespaced
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ObjectRef {
    pub target: ResourceTarget,
    pub namespace: Option<String>,
    pub name: String,
}

impl ObjectRef {
    pub fn new(target: &ResourceTarget, namespace: Option<&str>, name: &str) -> ObjectRef {
        ObjectRef {
            target: target.clone(),
            namespace: namespace.map(String::from),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{} {}/{}", self.target.gvk, ns, self.name),
            None => write!(f, "{} {}", self.target.gvk, self.name),
        }
    }
}
