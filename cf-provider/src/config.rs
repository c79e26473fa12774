use std::fs::File;

use cf_core::prelude::*;
use kube::config::{
    KubeConfigOptions,
    Kubeconfig,
};
use serde::{
    Deserialize,
    Serialize,
};
use tracing::*;

fn default_field_manager() -> String {
    DEFAULT_FIELD_MANAGER.into()
}

fn default_body_field() -> String {
    "spec".into()
}

// A kind that isn't built in, registered from the provider configuration.  These have no body
// schema; whatever is under the body field gets sent as-is.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct ExtraKind {
    pub api_version: String,
    pub kind: String,
    pub plural: String,

    #[serde(default)]
    pub cluster_scoped: bool,

    #[serde(default = "default_body_field")]
    pub body_field: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(default = "default_field_manager")]
    pub field_manager: String,

    #[serde(default)]
    pub force_conflicts: bool,

    #[serde(default)]
    pub offline: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_kinds: Vec<ExtraKind>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            kubeconfig: None,
            context: None,
            field_manager: default_field_manager(),
            force_conflicts: false,
            offline: false,
            extra_kinds: vec![],
        }
    }
}

impl ProviderConfig {
    pub fn load(filename: &str) -> anyhow::Result<ProviderConfig> {
        Ok(serde_yaml::from_reader(File::open(filename)?)?)
    }

    // With neither a kubeconfig path nor a context we defer to kube's usual inference (KUBECONFIG,
    // ~/.kube/config, or the in-cluster service account)
    pub async fn client(&self) -> anyhow::Result<kube::Client> {
        if self.kubeconfig.is_none() && self.context.is_none() {
            debug!("building kube client from the default configuration");
            return Ok(kube::Client::try_default().await?);
        }

        let kubeconfig = match &self.kubeconfig {
            Some(path) => {
                debug!("reading kubeconfig from {path}");
                Kubeconfig::read_from(path)?
            },
            None => Kubeconfig::read()?,
        };
        let options = KubeConfigOptions { context: self.context.clone(), ..Default::default() };
        let config = kube::Config::from_custom_kubeconfig(kubeconfig, &options).await?;
        Ok(kube::Client::try_from(config)?)
    }
}
