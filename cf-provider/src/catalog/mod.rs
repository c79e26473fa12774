mod nginx;
mod zalando;

use cf_core::prelude::*;
use lazy_static::lazy_static;

use crate::config::ExtraKind;
use crate::errors::*;
use crate::schema::{
    Attribute,
    AttributeType,
    Schema,
    Validator,
    DNS_LABEL_PATTERN,
    DNS_SUBDOMAIN_PATTERN,
};
use crate::state::ResourceState;

lazy_static! {
    static ref BUILTIN_KINDS: Vec<CrdKind> = vec![
        zalando::operator_configuration(),
        zalando::postgresql(),
        nginx::policy(),
    ];
}

// A CrdKind is everything the generic entities need to know about one custom resource type: where
// it lives in the API, which top-level field holds its body, and what that body looks like.
#[derive(Clone, Debug, PartialEq)]
pub struct CrdKind {
    pub target: ResourceTarget,
    pub body_field: String,
    pub body: Attribute,
    pub description: String,
}

impl CrdKind {
    pub fn new(target: ResourceTarget, body_field: &str, body: Attribute, description: &str) -> CrdKind {
        CrdKind {
            target,
            body_field: body_field.into(),
            body,
            description: description.into(),
        }
    }

    pub fn from_extra(extra: &ExtraKind) -> anyhow::Result<CrdKind> {
        let gvk = GVK::from_api_version(&extra.api_version, &extra.kind)
            .map_err(|err| ProviderError::invalid_configuration(&format!("extra kind {}: {err}", extra.kind)))?;
        if extra.plural.is_empty() || extra.body_field.is_empty() {
            bail!(ProviderError::invalid_configuration(&format!("extra kind {gvk}: plural and body_field must be non-empty")));
        }

        let scope = if extra.cluster_scoped { Scope::Cluster } else { Scope::Namespaced };
        let description = format!("{} {}", gvk.api_version(), gvk.kind);
        Ok(CrdKind::new(
            ResourceTarget::new(gvk, &extra.plural, scope),
            &extra.body_field,
            Attribute::dynamic("object body, sent to the cluster as-is").required(),
            &description,
        ))
    }

    pub fn gvk(&self) -> &GVK {
        &self.target.gvk
    }

    pub fn scope(&self) -> Scope {
        self.target.scope
    }

    // e.g. k8s_acid_zalan_do_postgresql_v1
    pub fn type_name(&self, provider_type_name: &str) -> String {
        let gvk = self.gvk();
        let group = gvk.group.replace(['.', '-'], "_");
        let kind = to_snake_case(&gvk.kind);
        if group.is_empty() {
            format!("{provider_type_name}_{kind}_{}", gvk.version)
        } else {
            format!("{provider_type_name}_{group}_{kind}_{}", gvk.version)
        }
    }

    pub fn manifest_type_name(&self, provider_type_name: &str) -> String {
        format!("{}_{MANIFEST_TYPE_SUFFIX}", self.type_name(provider_type_name))
    }

    // Namespaced kinds fall back to the default namespace, same as kubectl
    pub fn object_ref(&self, state: &ResourceState) -> anyhow::Result<ObjectRef> {
        let name = &state.metadata.name;
        if name.is_empty() {
            bail!(ProviderError::invalid_configuration(&format!("{}: metadata.name must be set", self.gvk())));
        }

        let namespace = match self.scope() {
            Scope::Namespaced => Some(state.metadata.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)),
            Scope::Cluster => None,
        };
        Ok(ObjectRef::new(&self.target, namespace, name))
    }

    pub fn resource_schema(&self) -> Schema {
        Schema::new(
            &format!("Manages a {} {}", self.gvk().api_version(), self.description),
            [
                ("id", id_attribute()),
                ("api_version", self.api_version_attribute()),
                ("kind", self.kind_attribute()),
                ("metadata", self.metadata_attribute(false)),
                (
                    "field_manager",
                    Attribute::string("server-side apply field manager; defaults to the provider's")
                        .with_validator(Validator::LengthBetween { min: 1, max: 128 }),
                ),
                ("force_conflicts", Attribute::bool("take ownership of conflicting fields; defaults to the provider's")),
                ("wait_for", wait_for_attribute()),
                ("wait_for_delete", wait_for_delete_attribute()),
                (self.body_field.as_str(), self.body.clone()),
            ],
        )
    }

    pub fn data_source_schema(&self) -> Schema {
        Schema::new(
            &format!("Reads a {} {}", self.gvk().api_version(), self.description),
            [
                ("id", id_attribute()),
                ("api_version", Attribute::string("").computed()),
                ("kind", Attribute::string("").computed()),
                ("metadata", self.metadata_attribute(true)),
                (self.body_field.as_str(), Attribute::dynamic("object body as stored in the cluster").computed()),
            ],
        )
    }

    pub fn manifest_schema(&self) -> Schema {
        Schema::new(
            &format!("Renders a {} {} as YAML without talking to the cluster", self.gvk().api_version(), self.description),
            [
                ("id", id_attribute()),
                ("api_version", self.api_version_attribute()),
                ("kind", self.kind_attribute()),
                ("metadata", self.metadata_attribute(false)),
                (self.body_field.as_str(), self.body.clone()),
                ("yaml", Attribute::string("the rendered manifest").computed()),
            ],
        )
    }

    fn api_version_attribute(&self) -> Attribute {
        Attribute::string("")
            .optional_computed()
            .with_validator(Validator::one_of(&[self.gvk().api_version().as_str()]))
    }

    fn kind_attribute(&self) -> Attribute {
        Attribute::string("")
            .optional_computed()
            .with_validator(Validator::one_of(&[self.gvk().kind.as_str()]))
    }

    fn metadata_attribute(&self, read_only: bool) -> Attribute {
        let mut attrs = vec![(
            "name",
            Attribute::string("object name")
                .required()
                .with_validator(Validator::LengthBetween { min: 1, max: 253 })
                .with_validator(Validator::regex(DNS_SUBDOMAIN_PATTERN, "a lowercase RFC 1123 subdomain")),
        )];
        if self.target.is_namespaced() {
            attrs.push((
                "namespace",
                Attribute::string("object namespace; defaults to \"default\"")
                    .optional_computed()
                    .with_validator(Validator::LengthBetween { min: 1, max: 63 })
                    .with_validator(Validator::regex(DNS_LABEL_PATTERN, "a lowercase RFC 1123 label")),
            ));
        }

        let labels = Attribute::map(AttributeType::String, "object labels");
        let annotations = Attribute::map(AttributeType::String, "object annotations");
        if read_only {
            attrs.push(("labels", labels.computed()));
            attrs.push(("annotations", annotations.computed()));
        } else {
            attrs.push(("labels", labels.optional_computed()));
            attrs.push(("annotations", annotations.optional_computed()));
        }
        Attribute::object(attrs, "standard object metadata").required()
    }
}

fn id_attribute() -> Attribute {
    Attribute::string("\"<namespace>/<name>\", or \"<name>\" for cluster-scoped kinds").computed()
}

fn duration_attribute(description: &str) -> Attribute {
    Attribute::string(description).with_validator(Validator::Duration)
}

fn wait_for_attribute() -> Attribute {
    let condition = AttributeType::Object(crate::schema::collect_attrs([
        (
            "jsonpath",
            Attribute::string("JSONPath expression evaluated against the live object")
                .required()
                .with_validator(Validator::JsonPath),
        ),
        ("value", Attribute::string("expected value; any non-empty match if unset")),
        ("timeout", duration_attribute("how long to wait; defaults to 20m")),
        ("poll_interval", duration_attribute("how often to check; defaults to 5s")),
    ]));
    Attribute::list(condition, "conditions to wait for after create or update, checked in order")
}

fn wait_for_delete_attribute() -> Attribute {
    Attribute::object(
        [
            ("timeout", duration_attribute("how long to wait; defaults to 20m")),
            ("poll_interval", duration_attribute("how often to check; defaults to 5s")),
        ],
        "wait for the object to be gone after delete",
    )
}

pub(crate) fn to_snake_case(s: &str) -> String {
    let chars: Vec<_> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

#[derive(Clone, Debug)]
pub struct Catalog {
    kinds: Vec<CrdKind>,
}

impl Catalog {
    pub fn builtin() -> Catalog {
        Catalog { kinds: BUILTIN_KINDS.clone() }
    }

    pub fn with_extra_kinds(extra: &[ExtraKind]) -> anyhow::Result<Catalog> {
        let mut catalog = Catalog::builtin();
        for ek in extra {
            let kind = CrdKind::from_extra(ek)?;
            if catalog.kinds.iter().any(|k| k.gvk() == kind.gvk()) {
                bail!(ProviderError::invalid_configuration(&format!("{} is registered more than once", kind.gvk())));
            }
            catalog.kinds.push(kind);
        }
        Ok(catalog)
    }

    pub fn kinds(&self) -> &[CrdKind] {
        &self.kinds
    }

    pub fn find(&self, provider_type_name: &str, type_name: &str) -> Option<&CrdKind> {
        self.kinds.iter().find(|k| k.type_name(provider_type_name) == type_name)
    }

    pub fn find_manifest(&self, provider_type_name: &str, type_name: &str) -> Option<&CrdKind> {
        self.kinds.iter().find(|k| k.manifest_type_name(provider_type_name) == type_name)
    }
}
