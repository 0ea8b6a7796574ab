//! Rust code emitter of the toki i18n toolchain.
//!
//! Emits two kinds of files per run: a bundle façade (`bundle_gen.rs` plus
//! the `mod.rs` wiring) and one dispatch file per catalog
//! (`catalog_<locale>_gen.rs`), generated by a single pass over each
//! message's ICU token stream. The emitter is deterministic: identical
//! input produces byte-identical output.

mod bundle;
mod catalog;
mod emitter;
mod filenames;

#[cfg(test)]
mod test;

use unic_langid::LanguageIdentifier;

pub use bundle::Writer;
pub use emitter::RustEmitter;
pub use filenames::{catalog_file_name, locale_camel, locale_snake};

/// First line of every generated file; the version-mismatch purge deletes
/// files whose first line starts with it.
pub const GENERATED_HEADER: &str = "// Generated by toki. DO NOT EDIT.";

/// Name of the main bundle file whose absence marks a first run.
pub const MAIN_BUNDLE_FILE: &str = "bundle_gen.rs";

/// Name of the generated module-wiring file.
pub const MOD_FILE: &str = "mod.rs";

/// A message to emit into a catalog dispatch table.
#[derive(Debug, Clone)]
pub struct EmitMessage {
    pub id: String,
    /// The raw TIK: the dispatch key call-sites pass at runtime.
    pub tik: String,
    pub icu_message: String,
    pub icu_tokens: Vec<toki_analysis::icumsg::Token>,
}

/// Everything the bundle façade needs to know about a run.
#[derive(Debug, Clone)]
pub struct BundleSpec {
    pub version: String,
    pub default_locale: LanguageIdentifier,
    /// Catalog locales in deterministic order.
    pub locales: Vec<LanguageIdentifier>,
}
