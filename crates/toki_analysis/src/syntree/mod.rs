//! Read-only typed view of the host project consumed by the source
//! analyzer.
//!
//! The host-language type-checker proper is out of scope; the loader
//! performs the local inference needed to type argument expressions
//! (literals, local bindings, struct literals, casts) and discovers the
//! bundle module's identity: its `Reader` trait, `Gender` type, struct
//! shapes and the `TOKI_VERSION` / `DEFAULT_LOCALE` constants.

mod loader;
mod types;

#[cfg(test)]
mod test;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

pub use loader::{LoadError, load_project};
pub use types::{HostType, TypeScope, host_type_from_text, infer_expr, type_text};

/// A compilation unit: one host source file outside the bundle.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the module root, `/`-separated.
    pub rel_path: String,
    pub source: String,
}

/// Identity and constants discovered from the bundle module.
#[derive(Debug, Clone, Default)]
pub struct BundleInfo {
    pub dir: PathBuf,
    /// Last path segment of the bundle directory, e.g. `tokibundle`.
    pub module_name: String,
    /// Fully-qualified `Reader` trait identity, e.g. `tokibundle::Reader`.
    pub reader_type: String,
    /// Fully-qualified gender type identity, e.g. `tokibundle::Gender`.
    pub gender_type: String,
    /// `TOKI_VERSION` constant value, empty when absent.
    pub toki_version: String,
    /// `DEFAULT_LOCALE` constant value, empty when absent.
    pub default_locale: String,
    /// Struct shapes declared by the bundle: name → (field, type text).
    pub structs: HashMap<String, Vec<(String, String)>>,
    /// Bundle functions returning reader handles, e.g. `default`,
    /// `match_locales`.
    pub reader_fns: HashSet<String>,
}

/// The loaded project: compilation units in deterministic order plus the
/// bundle identity, if a bundle module exists.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub units: Vec<SourceUnit>,
    pub bundle: Option<BundleInfo>,
}
