pub use cf_core::errors::*;

err_impl! {ProviderError,
    #[error("resource missing: {0}")]
    ResourceMissing(String),

    #[error("timed out waiting for {0}")]
    WaitTimeout(String),

    #[error("cancelled while {0}")]
    Cancelled(String),

    #[error("provider is in offline mode, cannot {0}")]
    OfflineMode(String),

    #[error("invalid import ID {0}")]
    InvalidImportId(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unknown type: {0}")]
    UnknownType(String),
}
