use cf_core::prelude::*;
use cf_provider::Provider;
use cf_provider::schema::Schema;

#[derive(clap::Args)]
pub struct Args {
    #[arg(long_help = "resource or data source type name, e.g. k8s_acid_zalan_do_postgresql_v1")]
    pub type_name: String,

    #[arg(long, long_help = "show the data source schema even if a resource of the same name exists")]
    pub data_source: bool,
}

// Resources and their lookup data sources share type names, so resources win unless asked otherwise
pub(crate) fn schema_for(provider: &Provider, type_name: &str, data_source: bool) -> anyhow::Result<Schema> {
    if !data_source && let Ok(resource) = provider.resource(type_name) {
        return Ok(resource.schema());
    }
    Ok(provider.data_source(type_name)?.schema())
}

pub fn cmd(args: &Args, provider: &Provider) -> EmptyResult {
    let schema = schema_for(provider, &args.type_name, args.data_source)?;
    print!("{}", serde_yaml::to_string(&schema)?);
    Ok(())
}
