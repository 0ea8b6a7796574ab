//! Core analysis library of the toki i18n toolchain.
//!
//! The pipeline, leaves first: TIK parsing and TIK→ICU lowering (`tik`),
//! ICU MessageFormat tokenization and message analysis (`icumsg`), CLDR
//! plural-rule access (`cldr`), the ARB catalog codec (`arb`), the typed
//! syntax-tree view over host sources (`syntree`), the source analyzer
//! feeding a [`Scan`](scan::Scan), and the catalog reconciler (`reconcile`).

pub mod analyzer;
pub mod arb;
pub mod cldr;
pub mod icumsg;
pub mod reconcile;
pub mod scan;
pub mod sync;
pub mod syntree;
pub mod tik;

pub use analyzer::{SourceAnalyzer, hash_message};
pub use scan::{Catalog, Scan, SourceError, Statistics, Text};
