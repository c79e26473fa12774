use async_trait::async_trait;
use cf_core::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::*;

use crate::catalog::CrdKind;
use crate::diagnostics::Diagnostics;
use crate::errors::*;
use crate::identity::parse_id;
use crate::provider::ProviderData;
use crate::reconcile::{
    apply_and_reconcile,
    delete_object,
    read_and_reconcile,
};
use crate::schema::Schema;
use crate::state::{
    ResourceConfig,
    ResourceState,
};
use crate::wait::{
    wait_for_delete,
    wait_for_upsert,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceResponse {
    pub state: Option<ResourceState>,
    pub diagnostics: Diagnostics,
}

impl ResourceResponse {
    pub fn ok(state: ResourceState) -> ResourceResponse {
        ResourceResponse { state: Some(state), diagnostics: Diagnostics::new() }
    }

    pub fn failed(diagnostics: Diagnostics) -> ResourceResponse {
        ResourceResponse { state: None, diagnostics }
    }

    pub fn from_error(err: &anyhow::Error) -> ResourceResponse {
        ResourceResponse::failed(Diagnostics::from_error(err))
    }
}

#[async_trait]
pub trait Resource: Send + Sync {
    fn metadata(&self, provider_type_name: &str) -> String;
    fn schema(&self) -> Schema;
    fn configure(&mut self, data: Option<&ProviderData>) -> Diagnostics;

    // Create and update hand back whatever state was applied even if a wait condition fails
    // afterwards; the object exists at that point and has to be tracked.
    async fn create(&self, config: &ResourceConfig, cancel: &CancellationToken) -> ResourceResponse;
    async fn read(&self, state: &ResourceState, cancel: &CancellationToken) -> ResourceResponse;
    async fn update(&self, config: &ResourceConfig, prior: &ResourceState, cancel: &CancellationToken) -> ResourceResponse;
    async fn delete(&self, config: &ResourceConfig, cancel: &CancellationToken) -> Diagnostics;
    fn import_state(&self, id: &str, state: &mut ResourceState) -> Diagnostics;
}

pub struct CrdResource {
    kind: CrdKind,
    data: Option<ProviderData>,
}

impl CrdResource {
    pub fn new(kind: CrdKind) -> CrdResource {
        CrdResource { kind, data: None }
    }

    fn data(&self) -> anyhow::Result<&ProviderData> {
        self.data
            .as_ref()
            .ok_or_else(|| ProviderError::invalid_configuration("resource used before the provider was configured"))
    }

    async fn upsert(&self, config: &ResourceConfig, cancel: &CancellationToken) -> ResourceResponse {
        let mut diags = self.kind.resource_schema().validate_config(config);
        if diags.has_error() {
            return ResourceResponse::failed(diags);
        }

        let mut state = config.state.clone();
        if let Err(err) = self.apply(&mut state, cancel).await {
            diags.add_from_error(&err);
            return ResourceResponse::failed(diags);
        }

        if !config.wait_for.is_empty()
            && let Err(err) = self.wait_for_conditions(&state, config, cancel).await
        {
            diags.add_from_error(&err);
        }
        ResourceResponse { state: Some(state), diagnostics: diags }
    }

    async fn apply(&self, state: &mut ResourceState, cancel: &CancellationToken) -> EmptyResult {
        let data = self.data()?;
        let client = data.client("apply")?;
        let params = data.apply_params(state);
        apply_and_reconcile(client, &self.kind, state, &params, cancel).await
    }

    async fn wait_for_conditions(&self, state: &ResourceState, config: &ResourceConfig, cancel: &CancellationToken) -> EmptyResult {
        let client = self.data()?.client("wait for conditions")?;
        wait_for_upsert(client, &self.kind.object_ref(state)?, &config.wait_for, cancel).await
    }

    async fn try_read(&self, state: &mut ResourceState, cancel: &CancellationToken) -> EmptyResult {
        let client = self.data()?.client("read")?;
        read_and_reconcile(client, &self.kind, state, cancel).await
    }

    async fn try_delete(&self, config: &ResourceConfig, cancel: &CancellationToken) -> EmptyResult {
        let client = self.data()?.client("delete")?;
        let outcome = delete_object(client, &self.kind, &config.state, cancel).await?;
        if let Some(wait) = &config.wait_for_delete
            && outcome != DeleteOutcome::AlreadyGone
        {
            wait_for_delete(client, &self.kind.object_ref(&config.state)?, wait, cancel).await?;
        }
        Ok(())
    }

    // Server-side apply can't rename anything, so a new name or namespace means a new object
    fn check_identity_unchanged(&self, config: &ResourceConfig, prior: &ResourceState) -> EmptyResult {
        if prior.metadata.name.is_empty() {
            return Ok(());
        }

        let (planned, current) = (self.kind.object_ref(&config.state)?, self.kind.object_ref(prior)?);
        if planned.name != current.name || planned.namespace != current.namespace {
            bail!(ProviderError::invalid_configuration(&format!(
                "cannot move {current} to {planned}: changing metadata.name or metadata.namespace requires replacing the resource"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Resource for CrdResource {
    fn metadata(&self, provider_type_name: &str) -> String {
        self.kind.type_name(provider_type_name)
    }

    fn schema(&self) -> Schema {
        self.kind.resource_schema()
    }

    fn configure(&mut self, data: Option<&ProviderData>) -> Diagnostics {
        self.data = data.cloned();
        Diagnostics::new()
    }

    #[instrument(skip_all, fields(kind = %self.kind.gvk(), name = %config.state.metadata.name))]
    async fn create(&self, config: &ResourceConfig, cancel: &CancellationToken) -> ResourceResponse {
        self.upsert(config, cancel).await
    }

    #[instrument(skip_all, fields(kind = %self.kind.gvk(), name = %state.metadata.name))]
    async fn read(&self, state: &ResourceState, cancel: &CancellationToken) -> ResourceResponse {
        let mut state = state.clone();
        match self.try_read(&mut state, cancel).await {
            Ok(()) => ResourceResponse::ok(state),
            Err(err) => ResourceResponse::from_error(&err),
        }
    }

    #[instrument(skip_all, fields(kind = %self.kind.gvk(), name = %config.state.metadata.name))]
    async fn update(&self, config: &ResourceConfig, prior: &ResourceState, cancel: &CancellationToken) -> ResourceResponse {
        if let Err(err) = self.check_identity_unchanged(config, prior) {
            return ResourceResponse::from_error(&err);
        }
        self.upsert(config, cancel).await
    }

    #[instrument(skip_all, fields(kind = %self.kind.gvk(), name = %config.state.metadata.name))]
    async fn delete(&self, config: &ResourceConfig, cancel: &CancellationToken) -> Diagnostics {
        match self.try_delete(config, cancel).await {
            Ok(()) => Diagnostics::new(),
            Err(err) => Diagnostics::from_error(&err),
        }
    }

    // Only identity is filled in here; the follow-up read fetches everything else
    fn import_state(&self, id: &str, state: &mut ResourceState) -> Diagnostics {
        let (namespace, name) = match parse_id(id, self.kind.scope()) {
            Ok(parsed) => parsed,
            Err(err) => return Diagnostics::from_error(&err),
        };

        debug!("importing {} {id}", self.kind.gvk());
        state.id = Some(id.into());
        state.api_version = Some(self.kind.gvk().api_version());
        state.kind = Some(self.kind.gvk().kind.clone());
        state.metadata.namespace = namespace;
        state.metadata.name = name;
        Diagnostics::new()
    }
}
