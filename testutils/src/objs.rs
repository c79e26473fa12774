use kube::api::{
    ApiResource,
    DynamicObject,
    GroupVersionKind,
};
use rstest::fixture;
use serde_json::json;

use crate::constants::*;

pub fn test_pg_spec() -> serde_json::Value {
    json!({
        "teamId": "acid",
        "numberOfInstances": 2,
        "volume": {"size": "1Gi"},
        "users": {"zalando": ["superuser", "createdb"]},
        "databases": {"foo": "zalando"},
        "postgresql": {"version": "16"},
    })
}

#[fixture]
pub fn test_postgresql(#[default(TEST_PG_NAME)] name: &str) -> DynamicObject {
    let gvk = GroupVersionKind::gvk("acid.zalan.do", "v1", PG_KIND);
    DynamicObject::new(name, &ApiResource::from_gvk_with_plural(&gvk, PG_PLURAL))
        .within(TEST_NAMESPACE)
        .data(json!({"spec": test_pg_spec()}))
}

// What the apiserver hands back after an apply: the applied fields plus everything the server
// and the operator fill in on their own
#[fixture]
pub fn test_postgresql_from_server(#[default("Running")] cluster_status: &str) -> serde_json::Value {
    let mut spec = test_pg_spec();
    spec["enableMasterLoadBalancer"] = json!(false);

    json!({
        "apiVersion": PG_API_VERSION,
        "kind": PG_KIND,
        "metadata": {
            "name": TEST_PG_NAME,
            "namespace": TEST_NAMESPACE,
            "uid": "0f5b8c4e-1f6a-4c55-9d55-0d2b1a1c9a11",
            "resourceVersion": "4242",
            "generation": 1,
            "labels": {"team": "acid"},
            "managedFields": [{
                "manager": TEST_FIELD_MANAGER,
                "operation": "Apply",
                "apiVersion": PG_API_VERSION,
                "fieldsType": "FieldsV1",
                "fieldsV1": {"f:spec": {}},
            }],
        },
        "spec": spec,
        "status": {"PostgresClusterStatus": cluster_status},
    })
}

#[fixture]
pub fn test_policy_from_server() -> serde_json::Value {
    json!({
        "apiVersion": POLICY_API_VERSION,
        "kind": POLICY_KIND,
        "metadata": {
            "name": TEST_POLICY_NAME,
            "namespace": TEST_NAMESPACE,
            "annotations": {"owner": "edge-team"},
        },
        "spec": {
            "rateLimit": {"rate": "10r/s", "key": "${binary_remote_addr}", "zoneSize": "10M"},
        },
        "status": {
            "state": "Valid",
            "reason": "AddedOrUpdated",
            "conditions": [
                {"type": "Ready", "status": "True"},
                {"type": "Synced", "status": "False"},
            ],
        },
    })
}
