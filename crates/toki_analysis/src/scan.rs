//! The working set produced by a toki run: discovered call-site texts,
//! catalogs, counters and collected source errors.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};

use unic_langid::LanguageIdentifier;

use crate::{arb, sync, tik};

/// A source position of a call-site or diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Position {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A discovered call-site. Immutable once created.
#[derive(Debug, Clone)]
pub struct Text {
    pub position: Position,
    pub tik: tik::Tik,
    pub id_hash: String,
    /// Leading line-comments immediately above the call, trimmed.
    pub comments: Vec<String>,
}

impl Text {
    pub fn context(&self) -> Option<&str> {
        self.tik.context()
    }
}

/// A per-call-site diagnostic attached to a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub position: Position,
    pub message: String,
}

/// Lock-free monotonic counters updated by analysis tasks.
#[derive(Debug, Default)]
pub struct Statistics {
    pub string_calls: AtomicI64,
    pub write_calls: AtomicI64,
    pub files_traversed: AtomicI64,
}

impl Statistics {
    pub fn string_calls(&self) -> i64 {
        self.string_calls.load(Ordering::Relaxed)
    }

    pub fn write_calls(&self) -> i64 {
        self.write_calls.load(Ordering::Relaxed)
    }

    pub fn files_traversed(&self) -> i64 {
        self.files_traversed.load(Ordering::Relaxed)
    }
}

/// A discovered ARB catalog and its absolute file path.
#[derive(Debug)]
pub struct Catalog {
    pub arb: arb::File,
    pub path: PathBuf,
    /// Updated by the reconciler only.
    pub messages_incomplete: AtomicI64,
}

impl Catalog {
    pub fn new(arb: arb::File, path: PathBuf) -> Self {
        Self {
            arb,
            path,
            messages_incomplete: AtomicI64::new(0),
        }
    }

    pub fn incomplete(&self) -> i64 {
        self.messages_incomplete.load(Ordering::Relaxed)
    }

    /// Ratio `(messages − incomplete) / messages`, 1 for empty catalogs.
    pub fn completeness(&self) -> f64 {
        let total = self.arb.messages.len() as f64;
        if total > 0.0 {
            (total - self.incomplete() as f64) / total
        } else {
            1.0
        }
    }
}

/// The working set of a run. Owns all texts, catalogs and counters.
#[derive(Debug)]
pub struct Scan {
    pub statistics: Statistics,
    /// Toolchain version discovered from the bundle, empty if absent.
    pub toki_version: String,
    /// `und` until discovered from the bundle or set from configuration.
    pub default_locale: LanguageIdentifier,
    pub texts: sync::Slice<Text>,
    /// Maps each ID to the index of its first occurrence in `texts`.
    pub text_index_by_id: sync::Map<String, usize>,
    pub source_errors: sync::Slice<SourceError>,
    pub catalogs: sync::Slice<Catalog>,
}

impl Scan {
    pub fn new(default_locale: LanguageIdentifier, toki_version: &str) -> Self {
        Self {
            statistics: Statistics::default(),
            toki_version: toki_version.to_owned(),
            default_locale,
            texts: sync::Slice::new(0),
            text_index_by_id: sync::Map::new(0),
            source_errors: sync::Slice::new(0),
            catalogs: sync::Slice::new(1),
        }
    }

    /// Records a discovered text, indexing its first occurrence by ID.
    pub fn record_text(&self, text: Text) {
        let id = text.id_hash.clone();
        self.text_index_by_id.access(|index| {
            let at = self.texts.push(text);
            index.entry(id).or_insert(at);
        });
    }
}
