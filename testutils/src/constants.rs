pub const TEST_NAMESPACE: &str = "test-namespace";
pub const TEST_PG_NAME: &str = "acid-minimal-cluster";
pub const TEST_POLICY_NAME: &str = "rate-limit-policy";
pub const TEST_FIELD_MANAGER: &str = "crdform-test";

pub const PG_API_VERSION: &str = "acid.zalan.do/v1";
pub const PG_KIND: &str = "postgresql";
pub const PG_PLURAL: &str = "postgresqls";
pub const POLICY_API_VERSION: &str = "k8s.nginx.org/v1";
pub const POLICY_KIND: &str = "Policy";
pub const POLICY_PLURAL: &str = "policies";

pub const TEST_PG_PATH: &str = "/apis/acid.zalan.do/v1/namespaces/test-namespace/postgresqls/acid-minimal-cluster";
pub const TEST_POLICY_PATH: &str = "/apis/k8s.nginx.org/v1/namespaces/test-namespace/policies/rate-limit-policy";
