use std::collections::BTreeMap;
use std::fs::File;

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};

use crate::wait::{
    DeleteWait,
    WaitCondition,
};

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ObjectMetadata {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

// ResourceState is what gets persisted between operations.  The kind-specific body (`spec`,
// `configuration`, ...) is kept as an untyped JSON map flattened next to the common attributes.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ResourceState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default)]
    pub metadata: ObjectMetadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_manager: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_conflicts: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaml: Option<String>,

    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl ResourceState {
    pub fn new(namespace: Option<&str>, name: &str) -> ResourceState {
        ResourceState {
            metadata: ObjectMetadata {
                name: name.into(),
                namespace: namespace.map(String::from),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_body(mut self, field: &str, value: Value) -> Self {
        self.body.insert(field.into(), value);
        self
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

// The configuration for one resource instance: the desired state plus the per-operation wait
// options, which never end up in the persisted state.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ResourceConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wait_for: Vec<WaitCondition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for_delete: Option<DeleteWait>,

    #[serde(flatten)]
    pub state: ResourceState,
}

impl ResourceConfig {
    pub fn load(filename: &str) -> anyhow::Result<ResourceConfig> {
        Ok(serde_yaml::from_reader(File::open(filename)?)?)
    }

    pub fn from_state(state: ResourceState) -> ResourceConfig {
        ResourceConfig { state, ..Default::default() }
    }
}
