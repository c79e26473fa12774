
use std::sync::Arc;

use assertables::*;
use cf_core::k8s::KubeObjectClient;
use cf_provider::{
    Provider,
    ProviderConfig,
};
use cf_testutils::*;
use rstest::*;

use super::*;

fn test_provider() -> Provider {
    Provider::new(ProviderConfig {
        field_manager: TEST_FIELD_MANAGER.into(),
        force_conflicts: true,
        ..Default::default()
    })
    .unwrap()
}

fn fake_session(client: kube::Client) -> Session {
    let mut provider = test_provider();
    provider.configure_with_client(Some(Arc::new(KubeObjectClient::new(client))));
    Session::new(provider)
}

fn offline_session() -> Session {
    let mut provider = test_provider();
    provider.configure_with_client(None);
    Session::new(provider)
}

#[rstest]
fn test_cli_definition() {
    CfCommandRoot::command().debug_assert();
}

#[rstest]
#[case::types(&["cfctl", "--offline", "types"], true)]
#[case::delete_by_id(&["cfctl", "delete", "k8s_acid_zalan_do_postgresql_v1", "test-namespace/acid-minimal-cluster"], true)]
#[case::delete_by_file(&["cfctl", "delete", "k8s_acid_zalan_do_postgresql_v1", "-f", "pg.yml", "--wait", "--timeout", "5m"], true)]
#[case::delete_needs_target(&["cfctl", "delete", "k8s_acid_zalan_do_postgresql_v1"], false)]
#[case::delete_both_targets(&["cfctl", "delete", "k8s_acid_zalan_do_postgresql_v1", "ns/name", "-f", "pg.yml"], false)]
#[case::timeout_needs_wait(&["cfctl", "delete", "k8s_acid_zalan_do_postgresql_v1", "ns/name", "--timeout", "5m"], false)]
#[case::bad_timeout(&["cfctl", "delete", "k8s_acid_zalan_do_postgresql_v1", "ns/name", "--wait", "--timeout", "soon"], false)]
#[case::apply_needs_file(&["cfctl", "apply", "k8s_acid_zalan_do_postgresql_v1"], false)]
fn test_cli_parsing(#[case] argv: &[&str], #[case] ok: bool) {
    assert_eq!(CfCommandRoot::try_parse_from(argv).is_ok(), ok);
}

#[rstest]
fn test_provider_flags_override_defaults() {
    let args = ProviderArgs {
        context: Some("kind-kind".into()),
        field_manager: Some("ci".into()),
        force_conflicts: true,
        ..Default::default()
    };
    let config = args.load_config().unwrap();
    assert_eq!(config.context.as_deref(), Some("kind-kind"));
    assert_eq!(config.field_manager, "ci");
    assert!(config.force_conflicts);
    assert!(!config.offline);
    assert_none!(config.kubeconfig);
}

#[rstest]
fn test_provider_config_file_missing() {
    let args = ProviderArgs {
        provider_config: Some("/nonexistent/provider.yml".into()),
        ..Default::default()
    };
    assert_err!(args.load_config());
}
