use cf_core::prelude::*;

use super::CrdKind;
use crate::schema::{
    Attribute,
    AttributeType,
    Validator,
};

const ZALANDO_GROUP: &str = "acid.zalan.do";
const QUANTITY_PATTERN: &str = r"^[0-9]+(\.[0-9]+)?(m|k|M|G|T|P|E|Ki|Mi|Gi|Ti|Pi|Ei)?$";

fn quantity(description: &str) -> Attribute {
    Attribute::string(description).with_validator(Validator::regex(QUANTITY_PATTERN, "a Kubernetes quantity like \"500m\" or \"1Gi\""))
}

fn resource_list(description: &str) -> Attribute {
    Attribute::object([("cpu", quantity("")), ("memory", quantity(""))], description)
}

pub(super) fn postgresql() -> CrdKind {
    let spec = Attribute::object(
        [
            ("teamId", Attribute::string("owning team, used as the cluster name prefix").required()),
            (
                "numberOfInstances",
                Attribute::int("number of Postgres pods")
                    .required()
                    .with_validator(Validator::IntAtLeast { min: 0 }),
            ),
            ("dockerImage", Attribute::string("Spilo image override")),
            (
                "volume",
                Attribute::object(
                    [
                        ("size", quantity("persistent volume size").required()),
                        ("storageClass", Attribute::string("")),
                        ("subPath", Attribute::string("")),
                    ],
                    "data volume",
                )
                .required(),
            ),
            (
                "postgresql",
                Attribute::object(
                    [
                        (
                            "version",
                            Attribute::string("major Postgres version")
                                .required()
                                .with_validator(Validator::one_of(&["13", "14", "15", "16", "17"])),
                        ),
                        ("parameters", Attribute::map(AttributeType::String, "postgresql.conf overrides")),
                    ],
                    "",
                )
                .required(),
            ),
            ("users", Attribute::map(AttributeType::List(Box::new(AttributeType::String)), "role name to role flags")),
            ("databases", Attribute::map(AttributeType::String, "database name to owner role")),
            ("preparedDatabases", Attribute::dynamic("")),
            ("enableMasterLoadBalancer", Attribute::bool("")),
            ("enableReplicaLoadBalancer", Attribute::bool("")),
            ("allowedSourceRanges", Attribute::list(AttributeType::String, "CIDRs allowed through the load balancers")),
            (
                "resources",
                Attribute::object(
                    [("requests", resource_list("")), ("limits", resource_list(""))],
                    "resources for the Postgres container",
                ),
            ),
            ("patroni", Attribute::dynamic("Patroni configuration")),
            ("tolerations", Attribute::list(AttributeType::Dynamic, "")),
            ("maintenanceWindows", Attribute::list(AttributeType::String, "")),
        ],
        "cluster specification",
    )
    .required();

    CrdKind::new(
        ResourceTarget::new(GVK::new(ZALANDO_GROUP, "v1", "postgresql"), "postgresqls", Scope::Namespaced),
        "spec",
        spec,
        "Postgres cluster managed by the Zalando postgres-operator",
    )
}

pub(super) fn operator_configuration() -> CrdKind {
    let configuration = Attribute::object(
        [
            ("docker_image", Attribute::string("default Spilo image")),
            ("workers", Attribute::int("number of operator workers").with_validator(Validator::IntAtLeast { min: 1 })),
            ("min_instances", Attribute::int("").with_validator(Validator::IntAtLeast { min: -1 })),
            ("max_instances", Attribute::int("").with_validator(Validator::IntAtLeast { min: -1 })),
            ("resync_period", Attribute::string("")),
            ("repair_period", Attribute::string("")),
            ("etcd_host", Attribute::string("")),
            ("enable_lazy_spilo_upgrade", Attribute::bool("")),
            ("set_memory_request_to_limit", Attribute::bool("")),
            (
                "kubernetes",
                Attribute::object(
                    [
                        ("cluster_domain", Attribute::string("")),
                        ("pod_service_account_name", Attribute::string("")),
                        ("enable_pod_antiaffinity", Attribute::bool("")),
                        ("watched_namespace", Attribute::string("")),
                        (
                            "pod_management_policy",
                            Attribute::string("").with_validator(Validator::one_of(&["ordered_ready", "parallel"])),
                        ),
                    ],
                    "",
                ),
            ),
            (
                "postgres_pod_resources",
                Attribute::object(
                    [
                        ("default_cpu_request", quantity("")),
                        ("default_memory_request", quantity("")),
                        ("default_cpu_limit", quantity("")),
                        ("default_memory_limit", quantity("")),
                    ],
                    "",
                ),
            ),
            (
                "load_balancer",
                Attribute::object(
                    [
                        ("enable_master_load_balancer", Attribute::bool("")),
                        ("db_hosted_zone", Attribute::string("")),
                        (
                            "external_traffic_policy",
                            Attribute::string("").with_validator(Validator::one_of(&["Cluster", "Local"])),
                        ),
                    ],
                    "",
                ),
            ),
            (
                "users",
                Attribute::object(
                    [("super_username", Attribute::string("")), ("replication_username", Attribute::string(""))],
                    "",
                ),
            ),
            ("logical_backup", Attribute::dynamic("")),
            ("connection_pooler", Attribute::dynamic("")),
        ],
        "operator configuration",
    )
    .required();

    CrdKind::new(
        ResourceTarget::new(GVK::new(ZALANDO_GROUP, "v1", "OperatorConfiguration"), "operatorconfigurations", Scope::Namespaced),
        "configuration",
        configuration,
        "configuration for the Zalando postgres-operator",
    )
}
