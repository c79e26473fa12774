// Provider identity
pub const PROVIDER_TYPE_NAME: &str = "k8s";
pub const DEFAULT_FIELD_MANAGER: &str = "crdform";
pub const MANIFEST_TYPE_SUFFIX: &str = "manifest";

// Defaults
pub const DEFAULT_NAMESPACE: &str = "default";

// Timing
pub const DEFAULT_WAIT_TIMEOUT_SECONDS: u64 = 1200;
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 5;

// Body fields the server owns; these never flow back into state
pub const STATUS_FIELD: &str = "status";
