use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::*;

use crate::catalog::CrdKind;
use crate::diagnostics::Diagnostics;
use crate::errors::*;
use crate::provider::ProviderData;
use crate::reconcile::read_and_reconcile;
use crate::resource::ResourceResponse;
use crate::schema::Schema;
use crate::state::ResourceState;

#[async_trait]
pub trait DataSource: Send + Sync {
    fn metadata(&self, provider_type_name: &str) -> String;
    fn schema(&self) -> Schema;
    fn configure(&mut self, data: Option<&ProviderData>) -> Diagnostics;
    async fn read(&self, config: &ResourceState, cancel: &CancellationToken) -> ResourceResponse;
}

// Looks an existing object up by name (and namespace) and reports it the same way a resource would
pub struct CrdDataSource {
    kind: CrdKind,
    data: Option<ProviderData>,
}

impl CrdDataSource {
    pub fn new(kind: CrdKind) -> CrdDataSource {
        CrdDataSource { kind, data: None }
    }

    async fn try_read(&self, state: &mut ResourceState, cancel: &CancellationToken) -> EmptyResult {
        let data = self
            .data
            .as_ref()
            .ok_or_else(|| ProviderError::invalid_configuration("data source used before the provider was configured"))?;
        read_and_reconcile(data.client("read")?, &self.kind, state, cancel).await
    }
}

#[async_trait]
impl DataSource for CrdDataSource {
    fn metadata(&self, provider_type_name: &str) -> String {
        self.kind.type_name(provider_type_name)
    }

    fn schema(&self) -> Schema {
        self.kind.data_source_schema()
    }

    fn configure(&mut self, data: Option<&ProviderData>) -> Diagnostics {
        self.data = data.cloned();
        Diagnostics::new()
    }

    #[instrument(skip_all, fields(kind = %self.kind.gvk(), name = %config.metadata.name))]
    async fn read(&self, config: &ResourceState, cancel: &CancellationToken) -> ResourceResponse {
        let diags = self.schema().validate_config(config);
        if diags.has_error() {
            return ResourceResponse::failed(diags);
        }

        let mut state = config.clone();
        match self.try_read(&mut state, cancel).await {
            Ok(()) => ResourceResponse { state: Some(state), diagnostics: diags },
            Err(err) => ResourceResponse::from_error(&err),
        }
    }
}
