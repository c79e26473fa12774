use anyhow::Context;
use async_trait::async_trait;
use either::Either;
use kube::api::{
    DeleteParams,
    DynamicObject,
    Patch,
    PatchParams,
};
#[cfg(feature = "mock")]
use mockall::automock;
use tracing::*;

use super::{
    ObjectRef,
    Scope,
};
use crate::errors::*;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApplyParams {
    pub field_manager: String,
    pub force_conflicts: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeleteOutcome {
    // The apiserver returned a Status, i.e., the object is gone already
    Deleted,
    // The apiserver returned the object back; something (usually a finalizer) is holding it
    InProgress,
    AlreadyGone,
}

// ObjectClient is the only seam between the provider and the apiserver.  Every kind goes through
// the same three verbs, and the `get` call folds "not found" into `Ok(None)` so that callers only
// see errors for things that actually went wrong.
#[cfg_attr(feature = "mock", automock)]
#[async_trait]
pub trait ObjectClient: Send + Sync {
    async fn get(&self, obj: &ObjectRef) -> anyhow::Result<Option<DynamicObject>>;
    async fn apply(&self, obj: &ObjectRef, doc: &DynamicObject, params: &ApplyParams) -> anyhow::Result<DynamicObject>;
    async fn delete(&self, obj: &ObjectRef) -> anyhow::Result<DeleteOutcome>;
}

#[derive(Clone)]
pub struct KubeObjectClient {
    client: kube::Client,
}

impl KubeObjectClient {
    pub fn new(client: kube::Client) -> KubeObjectClient {
        KubeObjectClient { client }
    }

    fn api_for(&self, obj: &ObjectRef) -> anyhow::Result<kube::Api<DynamicObject>> {
        let ar = obj.target.api_resource();
        match (obj.target.scope, &obj.namespace) {
            (Scope::Namespaced, Some(ns)) => Ok(kube::Api::namespaced_with(self.client.clone(), ns, &ar)),
            (Scope::Namespaced, None) => bail!("{} is namespaced but no namespace was given", obj.target.gvk),
            (Scope::Cluster, _) => Ok(kube::Api::all_with(self.client.clone(), &ar)),
        }
    }
}

#[async_trait]
impl ObjectClient for KubeObjectClient {
    async fn get(&self, obj: &ObjectRef) -> anyhow::Result<Option<DynamicObject>> {
        debug!("getting {obj}");
        self.api_for(obj)?
            .get_opt(&obj.name)
            .await
            .with_context(|| format!("could not get {obj}"))
    }

    async fn apply(&self, obj: &ObjectRef, doc: &DynamicObject, params: &ApplyParams) -> anyhow::Result<DynamicObject> {
        debug!("applying {obj} (field manager = {}, force = {})", params.field_manager, params.force_conflicts);
        let mut patch_params = PatchParams::apply(&params.field_manager);
        if params.force_conflicts {
            patch_params = patch_params.force();
        }

        self.api_for(obj)?
            .patch(&obj.name, &patch_params, &Patch::Apply(doc))
            .await
            .with_context(|| format!("could not apply {obj}"))
    }

    async fn delete(&self, obj: &ObjectRef) -> anyhow::Result<DeleteOutcome> {
        debug!("deleting {obj}");
        match self.api_for(obj)?.delete(&obj.name, &DeleteParams::default()).await {
            Ok(Either::Left(_)) => Ok(DeleteOutcome::InProgress),
            Ok(Either::Right(_)) => Ok(DeleteOutcome::Deleted),
            Err(e) if is_kube_not_found(&e) => {
                info!("{obj} was already gone");
                Ok(DeleteOutcome::AlreadyGone)
            },
            Err(e) => Err(anyhow::Error::new(e).context(format!("could not delete {obj}"))),
        }
    }
}
