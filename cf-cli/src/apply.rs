use cf_core::prelude::*;
use cf_provider::{
    ResourceConfig,
    ResourceResponse,
    ResourceState,
};

use crate::session::{
    Session,
    load_state,
    report,
    write_state,
};

#[derive(clap::Args)]
pub struct Args {
    #[arg(long_help = "resource type name, e.g. k8s_acid_zalan_do_postgresql_v1")]
    pub type_name: String,

    #[arg(short, long, long_help = "configuration file (YAML)")]
    pub file: String,

    #[arg(long, long_help = "previously saved state; the apply is treated as an update of it")]
    pub prior: Option<String>,

    #[arg(short, long, long_help = "write the resulting state here instead of stdout")]
    pub output: Option<String>,
}

pub(crate) async fn apply(
    session: &Session,
    type_name: &str,
    config: &ResourceConfig,
    prior: Option<&ResourceState>,
) -> anyhow::Result<ResourceResponse> {
    let resource = session.provider.resource(type_name)?;
    let resp = match prior {
        Some(prior) => resource.update(config, prior, &session.cancel).await,
        None => resource.create(config, &session.cancel).await,
    };
    Ok(resp)
}

pub async fn cmd(args: &Args, session: &Session) -> EmptyResult {
    let config = ResourceConfig::load(&args.file)?;
    let prior = args.prior.as_deref().map(load_state).transpose()?;

    // state is written even when a wait condition failed; the object exists regardless
    let resp = apply(session, &args.type_name, &config, prior.as_ref()).await?;
    if let Some(state) = &resp.state {
        write_state(state, args.output.as_deref())?;
    }
    report(&resp.diagnostics)
}
