mod data_source_test;
mod schema_test;
mod wait_test;

use std::sync::Arc;

use assertables::*;
use cf_core::k8s::{
    KubeObjectClient,
    MockObjectClient,
};
use cf_core::prelude::*;
use cf_testutils::*;
use rstest::*;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing_test::traced_test;

use super::*;
use crate::errors::*;

const PG_TYPE_NAME: &str = "k8s_acid_zalan_do_postgresql_v1";

#[fixture]
fn pg_kind() -> CrdKind {
    Catalog::builtin()
        .find(PROVIDER_TYPE_NAME, PG_TYPE_NAME)
        .cloned()
        .expect("postgresql is a builtin kind")
}

#[fixture]
fn pg_ref(pg_kind: CrdKind) -> ObjectRef {
    ObjectRef::new(&pg_kind.target, Some(TEST_NAMESPACE), TEST_PG_NAME)
}

#[fixture]
fn pg_state() -> ResourceState {
    let mut state = ResourceState::new(Some(TEST_NAMESPACE), TEST_PG_NAME).with_body("spec", test_pg_spec());
    state.metadata.labels.insert("team".into(), "acid".into());
    state
}

#[fixture]
fn pg_config(pg_state: ResourceState) -> ResourceConfig {
    ResourceConfig::from_state(pg_state)
}

#[fixture]
fn cancel() -> CancellationToken {
    CancellationToken::new()
}

fn test_provider_config() -> ProviderConfig {
    ProviderConfig {
        field_manager: TEST_FIELD_MANAGER.into(),
        force_conflicts: true,
        ..Default::default()
    }
}

fn kube_data(client: kube::Client) -> ProviderData {
    ProviderData::new(Some(Arc::new(KubeObjectClient::new(client))), &test_provider_config())
}

fn mock_data(client: MockObjectClient) -> ProviderData {
    ProviderData::new(Some(Arc::new(client)), &test_provider_config())
}

fn pg_obj(cluster_status: &str) -> DynamicObject {
    serde_json::from_value(test_postgresql_from_server(cluster_status)).unwrap()
}

fn api_err(code: u16) -> anyhow::Error {
    let resp: kube::core::ErrorResponse = serde_json::from_value(status_failure(code)).unwrap();
    anyhow::Error::new(kube::Error::Api(resp.into())).context("talking to the fake apiserver")
}

fn assert_provider_err(err: &anyhow::Error, check: impl Fn(&ProviderError) -> bool) {
    let perr = assert_some!(err.downcast_ref::<ProviderError>());
    assert!(check(perr), "unexpected error variant: {perr:?}");
}
