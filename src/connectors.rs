//! Connector modules.

pub mod adyen;

pub use self::adyen::Adyen;
