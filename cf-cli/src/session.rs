use std::fs::{
    self,
    File,
};

use anyhow::bail;
use cf_core::prelude::*;
use cf_provider::{
    Diagnostics,
    Provider,
    ProviderConfig,
    ResourceState,
};
use tokio_util::sync::CancellationToken;
use tracing::*;

#[derive(clap::Args, Default)]
pub struct ProviderArgs {
    #[arg(long, global = true, long_help = "provider configuration file (YAML); flags override its values")]
    pub provider_config: Option<String>,

    #[arg(long, global = true, long_help = "path to the kubeconfig file")]
    pub kubeconfig: Option<String>,

    #[arg(long, global = true, long_help = "kubeconfig context to use")]
    pub context: Option<String>,

    #[arg(long, global = true, long_help = "server-side apply field manager")]
    pub field_manager: Option<String>,

    #[arg(long, global = true, long_help = "take ownership of fields owned by other managers")]
    pub force_conflicts: bool,

    #[arg(long, global = true, long_help = "never contact the cluster; only manifest rendering works")]
    pub offline: bool,
}

impl ProviderArgs {
    pub fn load_config(&self) -> anyhow::Result<ProviderConfig> {
        let mut config = match &self.provider_config {
            Some(path) => ProviderConfig::load(path)?,
            None => ProviderConfig::default(),
        };

        if self.kubeconfig.is_some() {
            config.kubeconfig.clone_from(&self.kubeconfig);
        }
        if self.context.is_some() {
            config.context.clone_from(&self.context);
        }
        if let Some(fm) = &self.field_manager {
            config.field_manager.clone_from(fm);
        }
        config.force_conflicts |= self.force_conflicts;
        config.offline |= self.offline;
        Ok(config)
    }

    pub fn unconfigured(&self) -> anyhow::Result<Provider> {
        Provider::new(self.load_config()?)
    }
}

// A configured provider plus the token that Ctrl-C trips
pub struct Session {
    pub provider: Provider,
    pub cancel: CancellationToken,
}

impl Session {
    pub fn new(provider: Provider) -> Session {
        Session { provider, cancel: CancellationToken::new() }
    }

    pub async fn connect(args: &ProviderArgs) -> anyhow::Result<Session> {
        let mut provider = args.unconfigured()?;
        report(&provider.configure().await)?;

        let session = Session::new(provider);
        session.cancel_on_ctrl_c();
        Ok(session)
    }

    pub fn offline(args: &ProviderArgs) -> anyhow::Result<Session> {
        let mut provider = args.unconfigured()?;
        provider.configure_with_client(None);
        Ok(Session::new(provider))
    }

    fn cancel_on_ctrl_c(&self) {
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, cancelling the running operation");
                cancel.cancel();
            }
        });
    }
}

// Every diagnostic goes to stderr; any error turns into a failed command
pub fn report(diags: &Diagnostics) -> EmptyResult {
    for diag in diags {
        eprintln!("{diag}\n");
    }

    if let Some(diag) = diags.first_error() {
        bail!("{} ({} diagnostic(s))", diag.summary, diags.len());
    }
    Ok(())
}

pub fn load_state(path: &str) -> anyhow::Result<ResourceState> {
    Ok(serde_yaml::from_reader(File::open(path)?)?)
}

pub fn write_state(state: &ResourceState, output: Option<&str>) -> EmptyResult {
    let yaml = state.to_yaml()?;
    match output {
        Some(path) => {
            fs::write(path, yaml)?;
            info!("state written to {path}");
        },
        None => print!("{yaml}"),
    }
    Ok(())
}
