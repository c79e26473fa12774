use super::*;
use crate::diagnostics::Severity;
use crate::schema::*;

fn pg_config_json() -> serde_json::Value {
    json!({
        "metadata": {"name": TEST_PG_NAME, "namespace": TEST_NAMESPACE, "labels": {"team": "acid"}},
        "force_conflicts": true,
        "spec": test_pg_spec(),
        "wait_for": [{"jsonpath": "{.status.PostgresClusterStatus}", "value": "Running", "timeout": "10m"}],
    })
}

fn error_details(diags: &Diagnostics) -> Vec<String> {
    diags
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .map(|d| d.detail.clone())
        .collect()
}

#[rstest]
fn test_valid_config(pg_kind: CrdKind) {
    let diags = pg_kind.resource_schema().validate(&pg_config_json());
    assert!(diags.is_empty(), "{diags:?}");
}

#[rstest]
fn test_valid_config_from_struct(pg_kind: CrdKind, pg_config: ResourceConfig) {
    let diags = pg_kind.resource_schema().validate_config(&pg_config);
    assert!(!diags.has_error(), "{diags:?}");
}

#[rstest]
#[case::missing_name(&["metadata", "name"], None, "metadata.name: attribute is required")]
#[case::missing_team(&["spec", "teamId"], None, "spec.teamId: attribute is required")]
#[case::missing_body(&["spec"], None, "spec: attribute is required")]
#[case::bad_name(&["metadata", "name"], Some(json!("Not_A_Name")), "metadata.name: must be a lowercase RFC 1123 subdomain")]
#[case::bad_namespace(&["metadata", "namespace"], Some(json!("a.b")), "metadata.namespace: must be a lowercase RFC 1123 label")]
#[case::wrong_type(&["spec", "numberOfInstances"], Some(json!("two")), "spec.numberOfInstances: expected integer, got string")]
#[case::float_for_int(&["spec", "numberOfInstances"], Some(json!(2.5)), "spec.numberOfInstances: expected integer, got number")]
#[case::negative(&["spec", "numberOfInstances"], Some(json!(-1)), "spec.numberOfInstances: must be at least 0, got -1")]
#[case::bad_version(&["spec", "postgresql", "version"], Some(json!("9.6")), "spec.postgresql.version: must be one of")]
#[case::bad_quantity(&["spec", "volume", "size"], Some(json!("lots")), "spec.volume.size: must be a Kubernetes quantity")]
#[case::list_elem(&["spec", "allowedSourceRanges"], Some(json!(["10.0.0.0/8", 7])), "spec.allowedSourceRanges[1]: expected string, got integer")]
#[case::map_elem(&["spec", "users"], Some(json!({"zalando": "superuser"})), "spec.users[\"zalando\"]: expected list of string, got string")]
#[case::bad_duration(&["wait_for"], Some(json!([{"jsonpath": ".status", "timeout": "soon"}])), "wait_for[0].timeout: must be a duration")]
#[case::unknown_duration_unit(&["wait_for"], Some(json!([{"jsonpath": ".status", "poll_interval": "5 parsecs"}])), "wait_for[0].poll_interval: must be a duration")]
#[case::bad_jsonpath(&["wait_for"], Some(json!([{"jsonpath": "{.status["}])), "wait_for[0].jsonpath: must be a JSONPath expression")]
#[case::missing_jsonpath(&["wait_for"], Some(json!([{"value": "Running"}])), "wait_for[0].jsonpath: attribute is required")]
#[case::wrong_api_version(&["api_version"], Some(json!("acid.zalan.do/v2")), "api_version: must be one of [\"acid.zalan.do/v1\"]")]
#[case::empty_field_manager(&["field_manager"], Some(json!("")), "field_manager: length must be between 1 and 128, got 0")]
fn test_invalid_config(pg_kind: CrdKind, #[case] path: &[&str], #[case] value: Option<serde_json::Value>, #[case] expected: &str) {
    let mut doc = pg_config_json();
    let (last, parents) = path.split_last().unwrap();
    let mut target = &mut doc;
    for p in parents {
        target = &mut target[*p];
    }
    let fields = target.as_object_mut().unwrap();
    match value {
        Some(v) => fields.insert(last.to_string(), v),
        None => fields.remove(*last),
    };

    let diags = pg_kind.resource_schema().validate(&doc);
    let errs = error_details(&diags);
    assert_eq!(errs.len(), 1, "{errs:?}");
    assert_starts_with!(errs[0], expected);
}

#[rstest]
fn test_unknown_top_level_attribute(pg_kind: CrdKind) {
    let mut doc = pg_config_json();
    doc["status"] = json!({"PostgresClusterStatus": "Running"});

    let diags = pg_kind.resource_schema().validate(&doc);
    let diag = assert_some!(diags.first_error());
    assert_eq!(diag.summary, "Unsupported attribute");
    assert_eq!(diag.detail, "status: attribute is not supported by this type");
}

#[rstest]
fn test_unknown_nested_attribute_allowed(pg_kind: CrdKind) {
    let mut doc = pg_config_json();
    doc["spec"]["enableLogicalBackup"] = json!(true);
    assert!(pg_kind.resource_schema().validate(&doc).is_empty());
}

#[rstest]
fn test_computed_attribute_warns(pg_kind: CrdKind) {
    let mut doc = pg_config_json();
    doc["id"] = json!("test-namespace/acid-minimal-cluster");

    let diags = pg_kind.resource_schema().validate(&doc);
    assert!(!diags.has_error());
    assert_eq!(diags.len(), 1);
}

#[rstest]
fn test_non_object_document(pg_kind: CrdKind) {
    assert!(pg_kind.resource_schema().validate(&json!(["nope"])).has_error());
}

#[rstest]
#[case(Validator::IntBetween { min: 400, max: 599 }, json!(429), true)]
#[case(Validator::IntBetween { min: 400, max: 599 }, json!(600), false)]
#[case(Validator::LengthBetween { min: 1, max: 3 }, json!(["a", "b"]), true)]
#[case(Validator::LengthBetween { min: 1, max: 3 }, json!("abcd"), false)]
#[case(Validator::one_of(&["on", "off"]), json!("on"), true)]
#[case(Validator::regex("[", "broken"), json!("x"), false)]
#[case(Validator::IntAtLeast { min: 0 }, json!("not a number"), true)]
#[case(Validator::Duration, json!("1h 30m"), true)]
#[case(Validator::Duration, json!("5 parsecs"), false)]
#[case(Validator::JsonPath, json!("{.status.conditions[?(@.type == 'Ready')].status}"), true)]
#[case(Validator::JsonPath, json!("{.status["), false)]
fn test_validator_check(#[case] validator: Validator, #[case] value: serde_json::Value, #[case] ok: bool) {
    assert_eq!(validator.check(&value).is_none(), ok);
}

#[rstest]
fn test_attribute_lookup(pg_kind: CrdKind) {
    let schema = pg_kind.resource_schema();
    assert!(assert_some!(schema.attribute("metadata.name")).required);
    assert!(assert_some!(schema.attribute("id")).is_computed_only());
    assert!(assert_some!(schema.attribute("spec.volume.size")).required);
    assert_none!(schema.attribute("spec.volume.size.more"));
    assert_none!(schema.attribute("nope"));
}
