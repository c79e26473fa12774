use cf_core::prelude::*;

use super::CrdKind;
use crate::schema::{
    Attribute,
    AttributeType,
    Validator,
};

pub(super) fn policy() -> CrdKind {
    let rate_limit = Attribute::object(
        [
            (
                "rate",
                Attribute::string("e.g. \"10r/s\"")
                    .required()
                    .with_validator(Validator::regex(r"^[0-9]+r/[sm]$", "a rate like \"10r/s\" or \"300r/m\"")),
            ),
            ("key", Attribute::string("request key to limit on").required()),
            (
                "zoneSize",
                Attribute::string("shared memory zone size")
                    .required()
                    .with_validator(Validator::regex(r"^[0-9]+[kKmMgG]?$", "a size like \"10M\"")),
            ),
            ("delay", Attribute::int("").with_validator(Validator::IntAtLeast { min: 0 })),
            ("noDelay", Attribute::bool("")),
            ("burst", Attribute::int("").with_validator(Validator::IntAtLeast { min: 0 })),
            ("dryRun", Attribute::bool("")),
            ("logLevel", Attribute::string("").with_validator(Validator::one_of(&["info", "notice", "warn", "error"]))),
            ("rejectCode", Attribute::int("").with_validator(Validator::IntBetween { min: 400, max: 599 })),
            ("scale", Attribute::bool("")),
        ],
        "",
    );

    let spec = Attribute::object(
        [
            ("ingressClassName", Attribute::string("")),
            (
                "accessControl",
                Attribute::object(
                    [
                        ("allow", Attribute::list(AttributeType::String, "")),
                        ("deny", Attribute::list(AttributeType::String, "")),
                    ],
                    "",
                ),
            ),
            ("rateLimit", rate_limit),
            (
                "jwt",
                Attribute::object(
                    [
                        ("realm", Attribute::string("").required()),
                        ("secret", Attribute::string("")),
                        ("token", Attribute::string("")),
                        ("jwksURI", Attribute::string("")),
                        ("keyCache", Attribute::string("")),
                    ],
                    "",
                ),
            ),
            (
                "basicAuth",
                Attribute::object(
                    [("realm", Attribute::string("")), ("secret", Attribute::string("").required())],
                    "",
                ),
            ),
            (
                "ingressMTLS",
                Attribute::object(
                    [
                        ("clientCertSecret", Attribute::string("").required()),
                        (
                            "verifyClient",
                            Attribute::string("").with_validator(Validator::one_of(&["on", "off", "optional", "optional_no_ca"])),
                        ),
                        ("verifyDepth", Attribute::int("").with_validator(Validator::IntAtLeast { min: 0 })),
                    ],
                    "",
                ),
            ),
            ("egressMTLS", Attribute::dynamic("")),
            ("oidc", Attribute::dynamic("")),
            (
                "waf",
                Attribute::object(
                    [
                        ("enable", Attribute::bool("").required()),
                        ("apPolicy", Attribute::string("")),
                        ("apBundle", Attribute::string("")),
                        ("securityLog", Attribute::dynamic("")),
                    ],
                    "",
                ),
            ),
        ],
        "policy specification; set exactly one policy type",
    )
    .required();

    CrdKind::new(
        ResourceTarget::new(GVK::new("k8s.nginx.org", "v1", "Policy"), "policies", Scope::Namespaced),
        "spec",
        spec,
        "NGINX Ingress Controller policy",
    )
}
