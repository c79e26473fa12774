use httpmock::Method::*;

use super::*;
use crate::data_source::CrdDataSource;
use crate::manifest::ManifestDataSource;

#[rstest]
#[traced_test]
#[tokio::test]
async fn test_data_source_read(pg_kind: CrdKind, cancel: CancellationToken) {
    let (mut fake_apiserver, client) = make_fake_apiserver();
    fake_apiserver
        .handle(|when, then| {
            when.method(GET).path(TEST_PG_PATH);
            then.json_body(test_postgresql_from_server("Running"));
        })
        .build();

    let mut ds = CrdDataSource::new(pg_kind);
    ds.configure(Some(&kube_data(client)));
    let resp = ds.read(&ResourceState::new(Some(TEST_NAMESPACE), TEST_PG_NAME), &cancel).await;
    fake_apiserver.assert();

    assert!(resp.diagnostics.is_empty(), "{:?}", resp.diagnostics);
    let state = assert_some!(resp.state);
    assert_eq!(state.id.as_deref(), Some("test-namespace/acid-minimal-cluster"));
    assert_eq!(state.kind.as_deref(), Some(PG_KIND));
    assert_eq!(state.body["spec"]["teamId"], "acid");
    assert!(!state.body.contains_key("status"));
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn test_data_source_missing(pg_kind: CrdKind, cancel: CancellationToken) {
    let (mut fake_apiserver, client) = make_fake_apiserver();
    fake_apiserver.handle_not_found(TEST_PG_PATH.into()).build();

    let mut ds = CrdDataSource::new(pg_kind);
    ds.configure(Some(&kube_data(client)));
    let resp = ds.read(&ResourceState::new(Some(TEST_NAMESPACE), TEST_PG_NAME), &cancel).await;
    fake_apiserver.assert();

    assert_none!(resp.state);
    assert_eq!(assert_some!(resp.diagnostics.first_error()).summary, "Resource missing");
}

#[rstest]
#[tokio::test]
async fn test_data_source_offline(pg_kind: CrdKind, cancel: CancellationToken) {
    let mut ds = CrdDataSource::new(pg_kind);
    ds.configure(Some(&ProviderData::new(None, &test_provider_config())));
    let resp = ds.read(&ResourceState::new(Some(TEST_NAMESPACE), TEST_PG_NAME), &cancel).await;

    assert_none!(resp.state);
    assert_eq!(assert_some!(resp.diagnostics.first_error()).summary, "Provider is in offline mode");
}

#[rstest]
#[tokio::test]
async fn test_manifest(pg_kind: CrdKind, cancel: CancellationToken) {
    let mut ds = ManifestDataSource::new(pg_kind);
    ds.configure(None);

    let config = ResourceState::new(None, TEST_PG_NAME).with_body("spec", test_pg_spec());
    let resp = ds.read(&config, &cancel).await;
    assert!(resp.diagnostics.is_empty(), "{:?}", resp.diagnostics);

    let state = assert_some!(resp.state);
    assert_eq!(state.id.as_deref(), Some("default/acid-minimal-cluster"));
    assert_eq!(state.metadata.namespace.as_deref(), Some(DEFAULT_NAMESPACE));

    let yaml = assert_some!(state.yaml);
    let rendered: serde_json::Value = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(rendered["apiVersion"], PG_API_VERSION);
    assert_eq!(rendered["kind"], PG_KIND);
    assert_eq!(rendered["metadata"]["namespace"], DEFAULT_NAMESPACE);
    assert_eq!(rendered["spec"], test_pg_spec());
}

#[rstest]
#[tokio::test]
async fn test_manifest_invalid(cancel: CancellationToken) {
    let catalog = Catalog::builtin();
    let policy = assert_some!(catalog.find_manifest(PROVIDER_TYPE_NAME, "k8s_k8s_nginx_org_policy_v1_manifest"));
    let ds = ManifestDataSource::new(policy.clone());

    let config = ResourceState::new(Some(TEST_NAMESPACE), TEST_POLICY_NAME)
        .with_body("spec", json!({"rateLimit": {"rate": "lots", "key": "${binary_remote_addr}", "zoneSize": "10M"}}));
    let resp = ds.read(&config, &cancel).await;

    assert_none!(resp.state);
    let diag = assert_some!(resp.diagnostics.first_error());
    assert_eq!(diag.summary, "Invalid attribute value");
    assert_starts_with!(diag.detail, "spec.rateLimit.rate:");
}
