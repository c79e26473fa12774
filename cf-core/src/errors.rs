pub use anyhow::{
    anyhow,
    bail,
    ensure,
};
pub use paste::paste;
pub use thiserror::Error;

pub type EmptyResult = anyhow::Result<()>;

// Builds a thiserror enum plus one snake_case constructor per variant that returns the variant
// already wrapped in an anyhow::Error, so call sites can write `bail!(FooError::bar_baz(x))` and
// callers further up can still `downcast_ref::<FooError>()` to branch on the variant.
#[macro_export]
macro_rules! err_impl {
    (@hidden $errtype:ident, $item:ident, String) => {
        paste! {
            pub fn [<$item:snake>](in_: &str) -> anyhow::Error {
                anyhow!{$errtype::$item(in_.into())}
            }
        }
    };

    (@hidden $errtype:ident, $item:ident, $($dtype:tt)::+) => {
        paste! {
            pub fn [<$item:snake>](in_: &$($dtype)::+) -> anyhow::Error {
                anyhow!{$errtype::$item(in_.clone())}
            }
        }
    };

    ($errtype:ident,
        $(#[$errinfo:meta] $item:ident($($dtype:tt)::+),)+
    ) => {
        #[derive(Debug, Error)]
        pub enum $errtype {
            $(#[$errinfo] $item($($dtype)::+)),+
        }

        impl $errtype {
            $(err_impl! {@hidden $errtype, $item, $($dtype)::+})+
        }
    };
}

pub use err_impl;

// Walks the anyhow chain looking for a kube API error response with the given status code
pub fn has_api_status(err: &anyhow::Error, code: u16) -> bool {
    err.chain().any(|cause| match cause.downcast_ref::<kube::Error>() {
        Some(kube::Error::Api(resp)) => resp.code == code,
        _ => false,
    })
}

pub fn is_kube_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(resp) if resp.code == 404)
}
