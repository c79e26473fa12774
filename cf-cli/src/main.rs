#![cfg_attr(coverage, feature(coverage_attribute))]
mod apply;
mod completions;
mod delete;
mod get;
mod manifest;
mod schema;
mod session;
mod types;

use clap::{
    CommandFactory,
    Parser,
    Subcommand,
    crate_version,
};
use cf_core::logging;
use cf_core::prelude::*;

use crate::session::{
    ProviderArgs,
    Session,
};

#[derive(Parser)]
#[command(
    about = "command-line app for managing custom resources with the crdform provider",
    version,
    propagate_version = true
)]
struct CfCommandRoot {
    #[command(subcommand)]
    subcommand: CfSubcommand,

    #[command(flatten)]
    provider: ProviderArgs,

    #[arg(short, long, global = true, default_value = "warn")]
    verbosity: String,

    #[arg(long, global = true, long_help = "include source locations and span events in log output")]
    verbose_logs: bool,
}

#[derive(Subcommand)]
enum CfSubcommand {
    #[command(about = "create or update an object from a configuration file", visible_alias = "a")]
    Apply(apply::Args),

    #[command(about = "generate shell completions for cfctl")]
    Completions(completions::Args),

    #[command(about = "delete an object", visible_aliases = &["d", "del", "rm"])]
    Delete(delete::Args),

    #[command(about = "read an object through its data source")]
    Get(get::Args),

    #[command(about = "import an existing object and print its state")]
    Import(get::Args),

    #[command(about = "render an object as YAML without talking to the cluster")]
    Manifest(manifest::Args),

    #[command(about = "print the schema of a resource or data source type")]
    Schema(schema::Args),

    #[command(about = "list all resource and data source types")]
    Types,

    #[command(about = "crdform version")]
    Version,
}

#[tokio::main]
async fn main() -> EmptyResult {
    let args = CfCommandRoot::parse();
    logging::setup_for_cli(&args.verbosity, args.verbose_logs);

    // Only the commands that talk to the cluster configure the provider, so that schema and
    // manifest rendering work without a kubeconfig
    match &args.subcommand {
        CfSubcommand::Completions(cargs) => completions::cmd(cargs, CfCommandRoot::command()),
        CfSubcommand::Types => types::cmd(&args.provider.unconfigured()?),
        CfSubcommand::Schema(sargs) => schema::cmd(sargs, &args.provider.unconfigured()?),
        CfSubcommand::Manifest(margs) => manifest::cmd(margs, &Session::offline(&args.provider)?).await,
        CfSubcommand::Apply(aargs) => apply::cmd(aargs, &Session::connect(&args.provider).await?).await,
        CfSubcommand::Get(gargs) => get::get_cmd(gargs, &Session::connect(&args.provider).await?).await,
        CfSubcommand::Import(gargs) => get::import_cmd(gargs, &Session::connect(&args.provider).await?).await,
        CfSubcommand::Delete(dargs) => delete::cmd(dargs, &Session::connect(&args.provider).await?).await,
        CfSubcommand::Version => {
            println!("cfctl {}", crate_version!());
            Ok(())
        },
    }
}

#[cfg(test)]
mod tests;
