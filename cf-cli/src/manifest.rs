use cf_core::prelude::*;
use cf_provider::{
    ResourceConfig,
    ResourceResponse,
    ResourceState,
};

use crate::session::{
    Session,
    report,
};

#[derive(clap::Args)]
pub struct Args {
    #[arg(long_help = "resource type name, with or without the _manifest suffix")]
    pub type_name: String,

    #[arg(short, long, long_help = "configuration file (YAML)")]
    pub file: String,
}

pub(crate) fn manifest_type_name(type_name: &str) -> String {
    let suffix = format!("_{MANIFEST_TYPE_SUFFIX}");
    if type_name.ends_with(&suffix) { type_name.into() } else { format!("{type_name}{suffix}") }
}

pub(crate) async fn render(session: &Session, type_name: &str, config: &ResourceState) -> anyhow::Result<ResourceResponse> {
    let ds = session.provider.data_source(&manifest_type_name(type_name))?;
    Ok(ds.read(config, &session.cancel).await)
}

pub async fn cmd(args: &Args, session: &Session) -> EmptyResult {
    // wait options are accepted and ignored so the same file works for apply and manifest
    let config = ResourceConfig::load(&args.file)?;
    let resp = render(session, &args.type_name, &config.state).await?;
    if let Some(yaml) = resp.state.as_ref().and_then(|s| s.yaml.as_ref()) {
        print!("---\n{yaml}");
    }
    report(&resp.diagnostics)
}
