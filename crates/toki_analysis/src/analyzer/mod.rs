//! The source analyzer: walks host compilation units, detects
//! reader-method calls, extracts TIK constants, verifies argument arity and
//! type compatibility against the placeholder schema and collects leading
//! comments. Also discovers ARB catalogs in the bundle directory.
//!
//! Units may be analyzed on parallel threads; per-unit outcomes are merged
//! in unit order so the observable order of discovered texts is stable.


use std::path::Path;
use std::sync::atomic::Ordering;

use syn::spanned::Spanned;
use syn::visit::Visit;
use unic_langid::LanguageIdentifier;
use xxhash_rust::xxh64::xxh64;

use crate::icumsg::{self, OptionUnknownPolicy, OptionsPresencePolicy, SelectPolicy};
use crate::scan::{Catalog, Position, Scan, SourceError, Text};
use crate::syntree::{BundleInfo, Project, SourceUnit, TypeScope, host_type_from_text, infer_expr,
    type_text};
use crate::{arb, tik};

pub const FN_STRING: &str = "string";
pub const FN_WRITE: &str = "write";

/// Message identity: `"msg" + lowercase_hex(xxhash64(tik))`,
/// stable under byte-identical TIKs.
pub fn hash_message(tik_raw: &str) -> String {
    format!("msg{:x}", xxh64(tik_raw.as_bytes(), 0))
}

/// The default select-option policy: argument names ending in `_gender`
/// require exactly `male` and `female` and reject anything else.
pub fn default_select_policy(arg_name: &str) -> Option<SelectPolicy> {
    if arg_name.ends_with("_gender") {
        return Some(SelectPolicy {
            options: vec!["male".to_owned(), "female".to_owned()],
            presence: OptionsPresencePolicy::Required,
            unknown: OptionUnknownPolicy::Reject,
        });
    }
    None
}

/// Classifies a message as incomplete for its locale. Shell messages
/// (empty ICU) always count as incomplete. Rejected select options are
/// recorded against the catalog file.
pub fn is_message_incomplete(
    scan: &Scan,
    locale: &LanguageIdentifier,
    file_name: &str,
    message: &arb::Message,
) -> bool {
    if message.icu_message.trim().is_empty() {
        return true;
    }
    let mut incomplete = false;
    icumsg::analyze(
        locale,
        &message.icu_message,
        &message.icu_tokens,
        &default_select_policy,
        &mut |_| incomplete = true,
        &mut |_argument, option| {
            let name = message.icu_tokens[option].text(&message.icu_message);
            scan.source_errors.push(SourceError {
                position: Position {
                    file: file_name.to_owned(),
                    line: 0,
                    column: 0,
                },
                message: format!("unsupported select option: {name:?}"),
            });
        },
    );
    incomplete
}

#[derive(Debug, thiserror::Error)]
pub enum CollectArbError {
    #[error("reading bundle directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing .arb file {file:?}: {source}")]
    Decode {
        file: String,
        source: arb::DecodeError,
    },
    #[error("locale in ARB file ({file_locale}) differs from file name ({name_locale}): {file}")]
    LocaleMismatch {
        file_locale: String,
        name_locale: String,
        file: String,
    },
}

#[derive(Debug, Default)]
struct UnitOutcome {
    texts: Vec<Text>,
    errors: Vec<SourceError>,
}

#[derive(Debug, Clone, Copy)]
pub struct SourceAnalyzer {
    pub trim_path: bool,
}

impl SourceAnalyzer {
    pub fn new(trim_path: bool) -> Self {
        Self { trim_path }
    }

    /// Analyzes all compilation units of the project, feeding the scan.
    pub fn analyze_project(&self, project: &Project, scan: &Scan) {
        let bundle = project.bundle.as_ref();
        let units = &project.units;
        if units.is_empty() {
            return;
        }

        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(units.len());
        let chunk_size = units.len().div_ceil(workers);

        let outcomes: Vec<Vec<UnitOutcome>> = std::thread::scope(|s| {
            let handles: Vec<_> = units
                .chunks(chunk_size)
                .map(|chunk| {
                    s.spawn(move || {
                        chunk
                            .iter()
                            .map(|unit| self.analyze_unit(unit, bundle, scan))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        // Merge in unit order so text order is stable across runs.
        for outcome in outcomes.into_iter().flatten() {
            for text in outcome.texts {
                log::debug!("discovered TIK at {} ({})", text.position, text.id_hash);
                scan.record_text(text);
            }
            for error in outcome.errors {
                scan.source_errors.push(error);
            }
        }
    }

    fn analyze_unit(
        &self,
        unit: &SourceUnit,
        bundle: Option<&BundleInfo>,
        scan: &Scan,
    ) -> UnitOutcome {
        let mut outcome = UnitOutcome::default();
        scan.statistics.files_traversed.fetch_add(1, Ordering::Relaxed);

        let ast = match syn::parse_file(&unit.source) {
            Ok(ast) => ast,
            Err(e) => {
                // The loader validated syntax already; treat this as a
                // diagnostic rather than a panic.
                outcome.errors.push(SourceError {
                    position: Position {
                        file: self.display_path(unit),
                        line: 0,
                        column: 0,
                    },
                    message: format!("parsing unit: {e}"),
                });
                return outcome;
            }
        };

        let mut scopes = ScopeCollector {
            bundle,
            scope: TypeScope::default(),
        };
        scopes.visit_file(&ast);

        let mut collector = CallCollector {
            analyzer: self,
            unit,
            bundle,
            scope: scopes.scope,
            scan,
            outcome: &mut outcome,
        };
        collector.visit_file(&ast);
        log::debug!("traversed unit {}", unit.rel_path);
        outcome
    }

    fn display_path(&self, unit: &SourceUnit) -> String {
        if self.trim_path {
            unit.rel_path.clone()
        } else {
            unit.path.to_string_lossy().into_owned()
        }
    }

    /// Discovers `catalog_<locale>.arb` files in the bundle directory and
    /// counts incomplete messages per catalog.
    pub fn collect_arb_files(&self, bundle_dir: &Path, scan: &Scan) -> Result<(), CollectArbError> {
        if !bundle_dir.is_dir() {
            return Ok(());
        }
        let mut entries: Vec<_> = std::fs::read_dir(bundle_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        entries.sort();

        let mut decoder = arb::Decoder::new();
        for path in entries {
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(String::from)
            else {
                continue;
            };
            let Some(stem) = name.strip_suffix(".arb") else {
                continue;
            };
            let locale: LanguageIdentifier = match stem
                .strip_prefix("catalog_")
                .and_then(|tag| tag.parse().ok())
            {
                Some(locale) => locale,
                None => {
                    log::debug!("ignoring inactive translation file {name}");
                    continue;
                }
            };
            log::debug!("translation file detected: {name} ({locale})");

            let file = std::fs::File::open(&path)?;
            let arb_file = decoder
                .decode(std::io::BufReader::new(file))
                .map_err(|source| CollectArbError::Decode {
                    file: name.clone(),
                    source,
                })?;
            if arb_file.locale != locale {
                return Err(CollectArbError::LocaleMismatch {
                    file_locale: arb_file.locale.to_string(),
                    name_locale: locale.to_string(),
                    file: name,
                });
            }

            let abs_path = std::fs::canonicalize(&path).unwrap_or(path);
            let catalog = Catalog::new(arb_file, abs_path);
            let mut incomplete = 0;
            for message in catalog.arb.messages.values() {
                if is_message_incomplete(scan, &catalog.arb.locale, &name, message) {
                    incomplete += 1;
                }
            }
            catalog.messages_incomplete.store(incomplete, Ordering::Relaxed);
            scan.catalogs.push(catalog);
        }
        Ok(())
    }
}

/// First pass over a unit: local bindings, string constants and reader
/// handles.
struct ScopeCollector<'a> {
    bundle: Option<&'a BundleInfo>,
    scope: TypeScope,
}

impl<'a, 'ast> Visit<'ast> for ScopeCollector<'a> {
    fn visit_item_const(&mut self, item: &'ast syn::ItemConst) {
        if let syn::Expr::Lit(lit) = item.expr.as_ref() {
            if let syn::Lit::Str(value) = &lit.lit {
                self.scope
                    .consts
                    .insert(item.ident.to_string(), value.value());
            }
        }
        syn::visit::visit_item_const(self, item);
    }

    fn visit_local(&mut self, local: &'ast syn::Local) {
        self.collect_local(local);
        syn::visit::visit_local(self, local);
    }
}

impl<'a> ScopeCollector<'a> {
    fn collect_local(&mut self, local: &syn::Local) {
        let Some(init) = &local.init else { return };
        let init_expr = unwrap_expr(&init.expr);

        match &local.pat {
            syn::Pat::Ident(pat) => {
                let name = pat.ident.to_string();
                if is_reader_expr(self.bundle, init_expr) {
                    self.scope.readers.insert(name);
                } else {
                    let inferred = infer_expr(&self.scope, self.bundle, init_expr);
                    self.scope.locals.insert(name, inferred);
                }
            }
            syn::Pat::Type(pat) => {
                let syn::Pat::Ident(inner) = pat.pat.as_ref() else {
                    return;
                };
                let name = inner.ident.to_string();
                let text = type_text(&pat.ty);
                if text.contains("Reader") {
                    self.scope.readers.insert(name);
                } else {
                    self.scope.locals.insert(name, host_type_from_text(&text));
                }
            }
            syn::Pat::Tuple(pat) => {
                // `let (reader, confidence) = bundle::match_locales(…);`
                if !is_reader_expr(self.bundle, init_expr) {
                    return;
                }
                if let Some(syn::Pat::Ident(first)) = pat.elems.first() {
                    self.scope.readers.insert(first.ident.to_string());
                }
            }
            _ => {}
        }
    }
}

fn unwrap_expr(expr: &syn::Expr) -> &syn::Expr {
    match expr {
        syn::Expr::Reference(r) => unwrap_expr(&r.expr),
        syn::Expr::Paren(p) => unwrap_expr(&p.expr),
        syn::Expr::Group(g) => unwrap_expr(&g.expr),
        _ => expr,
    }
}

/// A call into one of the bundle's reader-returning functions,
/// e.g. `tokibundle::default()` or `tokibundle::match_locales(…)`.
fn is_reader_expr(bundle: Option<&BundleInfo>, expr: &syn::Expr) -> bool {
    let Some(bundle) = bundle else { return false };
    let syn::Expr::Call(call) = unwrap_expr(expr) else {
        return false;
    };
    let syn::Expr::Path(func) = call.func.as_ref() else {
        return false;
    };
    let segments: Vec<String> = func
        .path
        .segments
        .iter()
        .map(|s| s.ident.to_string())
        .collect();
    let Some(last) = segments.last() else {
        return false;
    };
    if !bundle.reader_fns.contains(last) {
        return false;
    }
    segments.len() == 1 || segments.iter().any(|s| *s == bundle.module_name)
}

/// Second pass: detects reader-method calls and checks them against their
/// TIK's placeholder schema.
struct CallCollector<'a> {
    analyzer: &'a SourceAnalyzer,
    unit: &'a SourceUnit,
    bundle: Option<&'a BundleInfo>,
    scope: TypeScope,
    scan: &'a Scan,
    outcome: &'a mut UnitOutcome,
}

impl<'a, 'ast> Visit<'ast> for CallCollector<'a> {
    fn visit_expr_method_call(&mut self, call: &'ast syn::ExprMethodCall) {
        self.check_call(call);
        syn::visit::visit_expr_method_call(self, call);
    }

    fn visit_macro(&mut self, mac: &'ast syn::Macro) {
        // Macro bodies are opaque token streams; re-parse the common
        // comma-separated-expressions shape so calls inside `println!` and
        // friends are still discovered. Token spans survive re-parsing, so
        // positions stay correct.
        use syn::punctuated::Punctuated;
        if let Ok(arguments) =
            mac.parse_body_with(Punctuated::<syn::Expr, syn::Token![,]>::parse_terminated)
        {
            for argument in &arguments {
                syn::visit::visit_expr(self, argument);
            }
        }
        syn::visit::visit_macro(self, mac);
    }
}

impl<'a> CallCollector<'a> {
    fn check_call(&mut self, call: &syn::ExprMethodCall) {
        let method = call.method.to_string();
        let arg_offset = match method.as_str() {
            FN_STRING => 0,
            FN_WRITE => 1,
            _ => return,
        };
        if !self.is_reader_receiver(&call.receiver) {
            return;
        }

        match method.as_str() {
            FN_STRING => {
                self.scan.statistics.string_calls.fetch_add(1, Ordering::Relaxed);
            }
            _ => {
                self.scan.statistics.write_calls.fetch_add(1, Ordering::Relaxed);
            }
        }

        let position = self.position_of(call.span());

        // The TIK slot must hold a compile-time string constant.
        let Some(tik_expr) = call.args.iter().nth(arg_offset) else {
            self.error(position, "TIK: not a string constant".to_owned());
            return;
        };
        let tik_position = self.position_of(tik_expr.span());
        let Some(tik_source) = self.const_string_value(tik_expr) else {
            self.error(tik_position, "TIK: not a string constant".to_owned());
            return;
        };

        let parsed = match tik::parse(&tik_source) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.error(tik_position, format!("TIK: {e}"));
                return;
            }
        };
        let placeholders: Vec<tik::Token> = parsed.placeholders().copied().collect();

        let mut ok = true;
        let elements = match call.args.iter().nth(arg_offset + 1) {
            None => Some(Vec::new()),
            Some(args_expr) => unpack_arg_slice(args_expr),
        };
        match elements {
            None => {
                if !placeholders.is_empty() {
                    self.error(
                        tik_position.clone(),
                        "TIK: can't unpack composite literal".to_owned(),
                    );
                    ok = false;
                }
            }
            Some(elements) => {
                for (index, element) in elements.iter().enumerate() {
                    let Some(placeholder) = placeholders.get(index) else {
                        self.error(
                            tik_position.clone(),
                            format!("TIK: arg {index} doesn't match any TIK placeholder"),
                        );
                        ok = false;
                        continue;
                    };
                    if let Some(message) = self.check_arg_type(index, placeholder, element) {
                        self.error(tik_position.clone(), message);
                        ok = false;
                    }
                }
                for (index, placeholder) in
                    placeholders.iter().enumerate().skip(elements.len())
                {
                    self.error(
                        tik_position.clone(),
                        format!(
                            "TIK: missing argument {index} for placeholder ({})",
                            placeholder.token_type.describe()
                        ),
                    );
                    ok = false;
                }
            }
        }

        if !ok {
            return;
        }

        let comments = leading_comments(&self.unit.source, position.line);
        let id_hash = hash_message(&parsed.raw);
        self.outcome.texts.push(Text {
            position,
            tik: parsed,
            id_hash,
            comments,
        });
    }

    /// Returns a diagnostic when the argument expression is incompatible
    /// with the placeholder.
    fn check_arg_type(
        &self,
        index: usize,
        placeholder: &tik::Token,
        element: &syn::Expr,
    ) -> Option<String> {
        let value_expr = unwrap_value_wrapper(element);
        let host_type = infer_expr(&self.scope, self.bundle, value_expr);
        let (ok, expected) = match placeholder.token_type {
            tik::TokenType::Text => (host_type.is_string(), "a string"),
            tik::TokenType::TextWithGender => {
                (host_type.is_string_with_gender(), "a gendered string")
            }
            tik::TokenType::Integer => (host_type.is_integer(), "an integer"),
            tik::TokenType::Number => (host_type.is_float(), "a float"),
            tik::TokenType::CardinalPluralStart | tik::TokenType::OrdinalPlural => {
                (host_type.is_numeric(), "numeric")
            }
            tik::TokenType::Currency => (host_type.is_currency(), "a Currency"),
            _ => (host_type.is_time(), "a SystemTime"),
        };
        if ok {
            return None;
        }
        Some(format!(
            "TIK: arg {index} must be {expected} but received: {}",
            host_type.display()
        ))
    }

    fn is_reader_receiver(&self, receiver: &syn::Expr) -> bool {
        match unwrap_expr(receiver) {
            syn::Expr::Path(path) => path
                .path
                .get_ident()
                .is_some_and(|ident| self.scope.readers.contains(&ident.to_string())),
            expr => is_reader_expr(self.bundle, expr),
        }
    }

    fn const_string_value(&self, expr: &syn::Expr) -> Option<String> {
        match unwrap_expr(expr) {
            syn::Expr::Lit(lit) => match &lit.lit {
                syn::Lit::Str(value) => Some(value.value()),
                _ => None,
            },
            syn::Expr::Path(path) => {
                let ident = path.path.get_ident()?;
                self.scope.consts.get(&ident.to_string()).cloned()
            }
            _ => None,
        }
    }

    fn position_of(&self, span: proc_macro2::Span) -> Position {
        let start = span.start();
        Position {
            file: self.analyzer.display_path(self.unit),
            line: start.line,
            column: start.column + 1,
        }
    }

    fn error(&mut self, position: Position, message: String) {
        self.outcome.errors.push(SourceError { position, message });
    }
}

/// Unpacks the `&[…]` argument-slice literal into its elements.
/// Returns `None` for anything that is not a composite literal.
fn unpack_arg_slice(expr: &syn::Expr) -> Option<Vec<&syn::Expr>> {
    match unwrap_expr(expr) {
        syn::Expr::Array(array) => Some(array.elems.iter().collect()),
        _ => None,
    }
}

/// Sees through `expr.into()`, `Value::from(expr)` and
/// `Value::Variant(expr)` wrappers to the payload expression.
fn unwrap_value_wrapper(expr: &syn::Expr) -> &syn::Expr {
    match unwrap_expr(expr) {
        syn::Expr::MethodCall(call)
            if call.method == "into" && call.args.is_empty() =>
        {
            unwrap_value_wrapper(&call.receiver)
        }
        syn::Expr::Call(call) if call.args.len() == 1 => {
            if let syn::Expr::Path(func) = call.func.as_ref() {
                let wraps = func.path.segments.len() >= 2
                    && func.path.segments.iter().any(|s| s.ident == "Value");
                if wraps {
                    return unwrap_value_wrapper(call.args.first().unwrap());
                }
            }
            unwrap_expr(expr)
        }
        other => other,
    }
}

/// Contiguous `//` comments on the lines immediately above `call_line`
/// (1-based), trimmed, in source order.
fn leading_comments(source: &str, call_line: usize) -> Vec<String> {
    let lines: Vec<&str> = source.lines().collect();
    if call_line < 2 || call_line > lines.len() + 1 {
        return Vec::new();
    }
    let mut collected = Vec::new();
    let mut index = call_line - 1; // line above the call, 1-based
    while index >= 1 {
        let line = lines[index - 1].trim();
        let Some(text) = line.strip_prefix("//") else {
            break;
        };
        collected.push(text.trim().to_owned());
        index -= 1;
    }
    collected.reverse();
    collected
}
