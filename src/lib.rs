#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::expect_used,
    clippy::panic,
    clippy::unwrap_used
)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/", "README.md"))]

pub mod connectors;
pub mod consts;
pub mod crypto;
pub mod enums;
pub mod errors;
pub mod request;
pub mod types;

pub use connectors::Adyen;
