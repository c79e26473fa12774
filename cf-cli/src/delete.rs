use std::time::Duration;

use cf_core::prelude::*;
use cf_provider::{
    DeleteWait,
    Diagnostics,
    ResourceConfig,
};

use crate::session::{
    Session,
    report,
};

#[derive(clap::Args)]
pub struct Args {
    #[arg(long_help = "resource type name, e.g. k8s_acid_zalan_do_postgresql_v1")]
    pub type_name: String,

    #[arg(
        required_unless_present = "file",
        conflicts_with = "file",
        long_help = "object ID: \"<namespace>/<name>\", or \"<name>\" for cluster-scoped kinds"
    )]
    pub id: Option<String>,

    #[arg(short, long, long_help = "configuration file (YAML) naming the object")]
    pub file: Option<String>,

    #[arg(long, long_help = "wait until the object is gone")]
    pub wait: bool,

    #[arg(
        long,
        requires = "wait",
        value_parser = humantime::parse_duration,
        long_help = "how long to wait for the object to be gone, e.g. 5m"
    )]
    pub timeout: Option<Duration>,
}

pub(crate) fn config_from_id(session: &Session, type_name: &str, id: &str) -> anyhow::Result<ResourceConfig> {
    let resource = session.provider.resource(type_name)?;
    let mut config = ResourceConfig::default();
    let diags = resource.import_state(id, &mut config.state);
    report(&diags)?;
    Ok(config)
}

pub(crate) async fn delete(session: &Session, type_name: &str, config: &ResourceConfig) -> anyhow::Result<Diagnostics> {
    let resource = session.provider.resource(type_name)?;
    Ok(resource.delete(config, &session.cancel).await)
}

pub async fn cmd(args: &Args, session: &Session) -> EmptyResult {
    let mut config = match (&args.id, &args.file) {
        (Some(id), _) => config_from_id(session, &args.type_name, id)?,
        (None, Some(file)) => ResourceConfig::load(file)?,
        (None, None) => anyhow::bail!("either an ID or a configuration file is required"),
    };

    // flags win over whatever the file says
    if args.wait {
        let mut wait = config.wait_for_delete.take().unwrap_or_default();
        if let Some(timeout) = args.timeout {
            wait.timeout = timeout;
        }
        config.wait_for_delete = Some(wait);
    }

    println!("deleting {} {}...", args.type_name, config.state.metadata.name);
    report(&delete(session, &args.type_name, &config).await?)
}
