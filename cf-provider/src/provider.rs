use std::sync::Arc;

use cf_core::k8s::KubeObjectClient;
use cf_core::prelude::*;
use tracing::*;

use crate::catalog::{
    Catalog,
    CrdKind,
};
use crate::config::ProviderConfig;
use crate::data_source::{
    CrdDataSource,
    DataSource,
};
use crate::diagnostics::Diagnostics;
use crate::errors::*;
use crate::manifest::ManifestDataSource;
use crate::resource::{
    CrdResource,
    Resource,
};
use crate::state::ResourceState;

// ProviderData is built once when the provider is configured and handed to every entity.  There is
// no client in offline mode, and anything that needs one reports that instead of trying.
#[derive(Clone)]
pub struct ProviderData {
    client: Option<Arc<dyn ObjectClient>>,
    pub field_manager: String,
    pub force_conflicts: bool,
}

impl ProviderData {
    pub fn new(client: Option<Arc<dyn ObjectClient>>, config: &ProviderConfig) -> ProviderData {
        ProviderData {
            client,
            field_manager: config.field_manager.clone(),
            force_conflicts: config.force_conflicts,
        }
    }

    pub fn client(&self, operation: &str) -> anyhow::Result<&dyn ObjectClient> {
        match &self.client {
            Some(client) => Ok(client.as_ref()),
            None => bail!(ProviderError::offline_mode(operation)),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.client.is_none()
    }

    // Per-instance settings win over the provider-wide defaults
    pub fn apply_params(&self, state: &ResourceState) -> ApplyParams {
        ApplyParams {
            field_manager: state.field_manager.clone().unwrap_or_else(|| self.field_manager.clone()),
            force_conflicts: state.force_conflicts.unwrap_or(self.force_conflicts),
        }
    }
}

pub struct Provider {
    config: ProviderConfig,
    catalog: Catalog,
    data: Option<ProviderData>,
}

impl Provider {
    pub fn new(config: ProviderConfig) -> anyhow::Result<Provider> {
        let catalog = Catalog::with_extra_kinds(&config.extra_kinds)?;
        Ok(Provider { config, catalog, data: None })
    }

    pub fn type_name(&self) -> &'static str {
        PROVIDER_TYPE_NAME
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn data(&self) -> Option<&ProviderData> {
        self.data.as_ref()
    }

    pub async fn configure(&mut self) -> Diagnostics {
        if self.config.offline {
            info!("provider is in offline mode, not connecting to a cluster");
            self.configure_with_client(None);
            return Diagnostics::new();
        }

        match self.config.client().await {
            Ok(client) => {
                self.configure_with_client(Some(Arc::new(KubeObjectClient::new(client))));
                Diagnostics::new()
            },
            Err(err) => Diagnostics::from_error(&err.context("could not build a Kubernetes client")),
        }
    }

    pub fn configure_with_client(&mut self, client: Option<Arc<dyn ObjectClient>>) {
        let client = if self.config.offline { None } else { client };
        self.data = Some(ProviderData::new(client, &self.config));
    }

    pub fn resource_type_names(&self) -> Vec<String> {
        self.catalog.kinds().iter().map(|k| k.type_name(self.type_name())).collect()
    }

    pub fn data_source_type_names(&self) -> Vec<String> {
        let kinds = self.catalog.kinds();
        kinds
            .iter()
            .map(|k| k.type_name(self.type_name()))
            .chain(kinds.iter().map(|k| k.manifest_type_name(self.type_name())))
            .collect()
    }

    pub fn resources(&self) -> Vec<Box<dyn Resource>> {
        self.catalog.kinds().iter().map(|k| self.build_resource(k)).collect()
    }

    pub fn data_sources(&self) -> Vec<Box<dyn DataSource>> {
        let kinds = self.catalog.kinds();
        kinds
            .iter()
            .map(|k| self.build_data_source(Box::new(CrdDataSource::new(k.clone()))))
            .chain(kinds.iter().map(|k| self.build_data_source(Box::new(ManifestDataSource::new(k.clone())))))
            .collect()
    }

    pub fn resource(&self, type_name: &str) -> anyhow::Result<Box<dyn Resource>> {
        match self.catalog.find(self.type_name(), type_name) {
            Some(kind) => Ok(self.build_resource(kind)),
            None => bail!(ProviderError::unknown_type(type_name)),
        }
    }

    pub fn data_source(&self, type_name: &str) -> anyhow::Result<Box<dyn DataSource>> {
        if let Some(kind) = self.catalog.find(self.type_name(), type_name) {
            Ok(self.build_data_source(Box::new(CrdDataSource::new(kind.clone()))))
        } else if let Some(kind) = self.catalog.find_manifest(self.type_name(), type_name) {
            Ok(self.build_data_source(Box::new(ManifestDataSource::new(kind.clone()))))
        } else {
            bail!(ProviderError::unknown_type(type_name))
        }
    }

    fn build_resource(&self, kind: &CrdKind) -> Box<dyn Resource> {
        let mut resource = Box::new(CrdResource::new(kind.clone()));
        log_diagnostics(&resource.configure(self.data.as_ref()));
        resource
    }

    fn build_data_source(&self, mut ds: Box<dyn DataSource>) -> Box<dyn DataSource> {
        log_diagnostics(&ds.configure(self.data.as_ref()));
        ds
    }
}

fn log_diagnostics(diags: &Diagnostics) {
    for diag in diags {
        warn!("{diag}");
    }
}
