use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::*;

use crate::catalog::CrdKind;
use crate::data_source::DataSource;
use crate::diagnostics::Diagnostics;
use crate::errors::*;
use crate::identity::format_id;
use crate::provider::ProviderData;
use crate::reconcile::desired_document;
use crate::resource::ResourceResponse;
use crate::schema::Schema;
use crate::state::ResourceState;

// Renders the document a resource would apply, without a cluster.  This is the one entity that
// keeps working in offline mode, so it ignores the provider data entirely.
pub struct ManifestDataSource {
    kind: CrdKind,
}

impl ManifestDataSource {
    pub fn new(kind: CrdKind) -> ManifestDataSource {
        ManifestDataSource { kind }
    }

    fn render(&self, config: &ResourceState) -> anyhow::Result<ResourceState> {
        let obj_ref = self.kind.object_ref(config)?;
        let doc = desired_document(&self.kind, config)?;

        let mut state = config.clone();
        state.id = Some(format_id(obj_ref.namespace.as_deref(), &obj_ref.name));
        state.api_version = Some(self.kind.gvk().api_version());
        state.kind = Some(self.kind.gvk().kind.clone());
        state.metadata.namespace = obj_ref.namespace;
        state.yaml = Some(serde_yaml::to_string(&doc)?);
        Ok(state)
    }
}

#[async_trait]
impl DataSource for ManifestDataSource {
    fn metadata(&self, provider_type_name: &str) -> String {
        self.kind.manifest_type_name(provider_type_name)
    }

    fn schema(&self) -> Schema {
        self.kind.manifest_schema()
    }

    fn configure(&mut self, _: Option<&ProviderData>) -> Diagnostics {
        Diagnostics::new()
    }

    #[instrument(skip_all, fields(kind = %self.kind.gvk(), name = %config.metadata.name))]
    async fn read(&self, config: &ResourceState, _: &CancellationToken) -> ResourceResponse {
        let diags = self.schema().validate_config(config);
        if diags.has_error() {
            return ResourceResponse::failed(diags);
        }

        match self.render(config) {
            Ok(state) => ResourceResponse { state: Some(state), diagnostics: diags },
            Err(err) => ResourceResponse::from_error(&err),
        }
    }
}
