use cf_core::prelude::*;
use cf_provider::Provider;

pub fn cmd(provider: &Provider) -> EmptyResult {
    println!("resources:");
    for name in provider.resource_type_names() {
        println!("  {name}");
    }

    println!("data sources:");
    for name in provider.data_source_type_names() {
        println!("  {name}");
    }
    Ok(())
}
