use cf_core::prelude::*;

use crate::errors::*;

// Namespaced objects are identified as "namespace/name", cluster-scoped ones by their bare name.
// The same string is used for the `id` attribute and for import, so the two always round-trip.
pub fn format_id(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{ns}/{name}"),
        None => name.into(),
    }
}

pub fn parse_id(id: &str, scope: Scope) -> anyhow::Result<(Option<String>, String)> {
    let parts: Vec<_> = id.split('/').collect();
    match (scope, &parts[..]) {
        (Scope::Namespaced, [ns, name]) if !ns.is_empty() && !name.is_empty() => {
            Ok((Some(ns.to_string()), name.to_string()))
        },
        (Scope::Cluster, [name]) if !name.is_empty() => Ok((None, name.to_string())),
        (Scope::Namespaced, _) => {
            bail!(ProviderError::invalid_import_id(&format!("{id:?}: expected \"<namespace>/<name>\" with both parts non-empty")))
        },
        (Scope::Cluster, _) => {
            bail!(ProviderError::invalid_import_id(&format!("{id:?}: expected a non-empty \"<name>\" with no slashes")))
        },
    }
}

#[cfg(test)]
mod test {
    use assertables::*;
    use rstest::*;

    use super::*;

    #[rstest]
    #[case(Some("test-namespace"), "acid-minimal-cluster", Scope::Namespaced, "test-namespace/acid-minimal-cluster")]
    #[case(None, "postgres-operator", Scope::Cluster, "postgres-operator")]
    fn test_id_round_trip(#[case] ns: Option<&str>, #[case] name: &str, #[case] scope: Scope, #[case] expected: &str) {
        let id = format_id(ns, name);
        assert_eq!(id, expected);
        assert_eq!(parse_id(&id, scope).unwrap(), (ns.map(String::from), name.to_string()));
    }

    #[rstest]
    #[case("", Scope::Namespaced)]
    #[case("onlyname", Scope::Namespaced)]
    #[case("a/b/c", Scope::Namespaced)]
    #[case("/name", Scope::Namespaced)]
    #[case("ns/", Scope::Namespaced)]
    #[case("", Scope::Cluster)]
    #[case("ns/name", Scope::Cluster)]
    fn test_parse_id_invalid(#[case] id: &str, #[case] scope: Scope) {
        let err = assert_err!(parse_id(id, scope));
        assert!(matches!(err.downcast_ref::<ProviderError>(), Some(ProviderError::InvalidImportId(_))));
        assert_contains!(err.to_string(), &format!("{id:?}"));
    }
}
