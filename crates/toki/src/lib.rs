//! Runtime support for toki-generated translation bundles.
//!
//! A generated bundle module declares its own `Reader` trait and catalog
//! types; this crate only provides the locale-negotiation layer those
//! bundles wire themselves into.

mod localizer;

pub use localizer::{BundleError, Confidence, Localizer};
