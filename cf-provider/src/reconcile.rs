use cf_core::prelude::*;
use kube::api::ApiResource;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::*;

use crate::catalog::CrdKind;
use crate::errors::*;
use crate::identity::format_id;
use crate::state::ResourceState;
use crate::wait::cancellable;

// Build the document we send to the apiserver.  apiVersion and kind always come from the kind
// itself; if the state carries its own, they have to agree.
pub fn desired_document(kind: &CrdKind, state: &ResourceState) -> anyhow::Result<DynamicObject> {
    let gvk = kind.gvk();
    if let Some(api_version) = &state.api_version
        && *api_version != gvk.api_version()
    {
        bail!(ProviderError::invalid_configuration(&format!("api_version {api_version} does not match {gvk}")));
    }
    if let Some(k) = &state.kind
        && *k != gvk.kind
    {
        bail!(ProviderError::invalid_configuration(&format!("kind {k} does not match {gvk}")));
    }

    let obj_ref = kind.object_ref(state)?;
    let mut doc = DynamicObject::new(&obj_ref.name, &ApiResource::from_gvk_with_plural(gvk, &kind.target.plural));
    doc.metadata.namespace = obj_ref.namespace;
    if !state.metadata.labels.is_empty() {
        doc.metadata.labels = Some(state.metadata.labels.clone());
    }
    if !state.metadata.annotations.is_empty() {
        doc.metadata.annotations = Some(state.metadata.annotations.clone());
    }

    let body = state
        .body
        .iter()
        .filter(|(k, _)| k.as_str() != STATUS_FIELD)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    doc.data = Value::Object(body);
    Ok(doc)
}

// Overwrite state with what the server says is true.  Everything in the body except status comes
// back, including fields the server defaulted.
pub fn absorb(kind: &CrdKind, state: &mut ResourceState, obj: &DynamicObject) -> EmptyResult {
    let gvk = kind.gvk();
    if let Some(types) = &obj.types
        && !gvk.matches_type_meta(types)
    {
        bail!("expected {gvk} from the apiserver, got {}/{}", types.api_version, types.kind);
    }

    let name = obj.name_any();
    let namespace = match kind.scope() {
        Scope::Namespaced => obj.metadata.namespace.clone(),
        Scope::Cluster => None,
    };

    state.id = Some(format_id(namespace.as_deref(), &name));
    state.api_version = Some(gvk.api_version());
    state.kind = Some(gvk.kind.clone());
    state.metadata.name = name;
    state.metadata.namespace = namespace;
    state.metadata.labels = obj.metadata.labels.clone().unwrap_or_default();
    state.metadata.annotations = obj.metadata.annotations.clone().unwrap_or_default();
    state.body = match &obj.data {
        Value::Object(fields) => fields
            .iter()
            .filter(|(k, _)| k.as_str() != STATUS_FIELD)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        _ => Default::default(),
    };
    Ok(())
}

#[instrument(skip_all, fields(kind = %kind.gvk(), name = %state.metadata.name))]
pub async fn apply_and_reconcile(
    client: &dyn ObjectClient,
    kind: &CrdKind,
    state: &mut ResourceState,
    params: &ApplyParams,
    cancel: &CancellationToken,
) -> EmptyResult {
    let obj_ref = kind.object_ref(state)?;
    let doc = desired_document(kind, state)?;
    let applied = cancellable(cancel, &format!("applying {obj_ref}"), client.apply(&obj_ref, &doc, params)).await?;
    absorb(kind, state, &applied)?;
    info!("applied {obj_ref}");
    Ok(())
}

#[instrument(skip_all, fields(kind = %kind.gvk(), name = %state.metadata.name))]
pub async fn read_and_reconcile(
    client: &dyn ObjectClient,
    kind: &CrdKind,
    state: &mut ResourceState,
    cancel: &CancellationToken,
) -> EmptyResult {
    let obj_ref = kind.object_ref(state)?;
    match cancellable(cancel, &format!("reading {obj_ref}"), client.get(&obj_ref)).await {
        Ok(Some(obj)) => absorb(kind, state, &obj),
        Ok(None) => bail!(ProviderError::resource_missing(&obj_ref.to_string())),
        Err(err) if has_api_status(&err, 404) => bail!(ProviderError::resource_missing(&obj_ref.to_string())),
        Err(err) => Err(err),
    }
}

#[instrument(skip_all, fields(kind = %kind.gvk(), name = %state.metadata.name))]
pub async fn delete_object(
    client: &dyn ObjectClient,
    kind: &CrdKind,
    state: &ResourceState,
    cancel: &CancellationToken,
) -> anyhow::Result<DeleteOutcome> {
    let obj_ref = kind.object_ref(state)?;
    let outcome = cancellable(cancel, &format!("deleting {obj_ref}"), client.delete(&obj_ref)).await?;
    info!("delete {obj_ref}: {outcome:?}");
    Ok(outcome)
}
