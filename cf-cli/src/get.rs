use cf_core::prelude::*;
use cf_provider::identity::parse_id;
use cf_provider::{
    ProviderError,
    ResourceResponse,
    ResourceState,
};

use crate::session::{
    Session,
    report,
    write_state,
};

#[derive(clap::Args)]
pub struct Args {
    #[arg(long_help = "resource type name, e.g. k8s_acid_zalan_do_postgresql_v1")]
    pub type_name: String,

    #[arg(long_help = "object ID: \"<namespace>/<name>\", or \"<name>\" for cluster-scoped kinds")]
    pub id: String,

    #[arg(short, long, long_help = "write the state here instead of stdout")]
    pub output: Option<String>,
}

pub(crate) async fn get(session: &Session, type_name: &str, id: &str) -> anyhow::Result<ResourceResponse> {
    let provider = &session.provider;
    let Some(kind) = provider.catalog().find(provider.type_name(), type_name) else {
        return Err(ProviderError::unknown_type(type_name));
    };

    let (namespace, name) = parse_id(id, kind.scope())?;
    let config = ResourceState::new(namespace.as_deref(), &name);
    Ok(provider.data_source(type_name)?.read(&config, &session.cancel).await)
}

pub(crate) async fn import(session: &Session, type_name: &str, id: &str) -> anyhow::Result<ResourceResponse> {
    let resource = session.provider.resource(type_name)?;
    let mut state = ResourceState::default();
    let diags = resource.import_state(id, &mut state);
    if diags.has_error() {
        return Ok(ResourceResponse::failed(diags));
    }
    Ok(resource.read(&state, &session.cancel).await)
}

fn finish(resp: ResourceResponse, output: Option<&str>) -> EmptyResult {
    if let Some(state) = &resp.state {
        write_state(state, output)?;
    }
    report(&resp.diagnostics)
}

pub async fn get_cmd(args: &Args, session: &Session) -> EmptyResult {
    finish(get(session, &args.type_name, &args.id).await?, args.output.as_deref())
}

pub async fn import_cmd(args: &Args, session: &Session) -> EmptyResult {
    finish(import(session, &args.type_name, &args.id).await?, args.output.as_deref())
}
