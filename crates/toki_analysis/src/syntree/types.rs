use std::collections::{HashMap, HashSet};

use quote::ToTokens;

use super::BundleInfo;

/// The host type model, as far as local inference can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostType {
    /// `&str` / `String`.
    Str,
    /// A primitive integer; carries the type name.
    Int(&'static str),
    /// A primitive float; carries the type name.
    Float(&'static str),
    /// `std::time::SystemTime`.
    SystemTime,
    /// A named struct with its field types.
    Struct {
        path: String,
        fields: Vec<(String, HostType)>,
    },
    /// Any other named type.
    Named(String),
    /// Not resolvable by local inference. Accepted by every predicate:
    /// the full host type-checker is the authority on these.
    Unknown,
}

impl HostType {
    pub fn display(&self) -> String {
        match self {
            HostType::Str => "&str".to_owned(),
            HostType::Int(name) => (*name).to_owned(),
            HostType::Float(name) => (*name).to_owned(),
            HostType::SystemTime => "SystemTime".to_owned(),
            HostType::Struct { path, .. } => path.clone(),
            HostType::Named(path) => path.clone(),
            HostType::Unknown => "unknown type".to_owned(),
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, HostType::Str | HostType::Unknown)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, HostType::Int(_) | HostType::Unknown)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, HostType::Float(_) | HostType::Unknown)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub fn is_time(&self) -> bool {
        matches!(self, HostType::SystemTime | HostType::Unknown)
    }

    /// A named struct with fields `value` (string) and `gender`
    /// (the bundle's gender type).
    pub fn is_string_with_gender(&self) -> bool {
        if matches!(self, HostType::Unknown) {
            return true;
        }
        let HostType::Struct { fields, .. } = self else {
            return false;
        };
        let mut has_value = false;
        let mut has_gender = false;
        for (name, field_type) in fields {
            match name.as_str() {
                "value" => has_value = matches!(field_type, HostType::Str),
                "gender" => {
                    has_gender = matches!(
                        field_type,
                        HostType::Named(path) if last_segment(path) == "Gender"
                    );
                }
                _ => {}
            }
        }
        has_value && has_gender
    }

    /// A named struct with fields `amount: f64` and `code` (the standard
    /// ISO-4217 currency code type).
    pub fn is_currency(&self) -> bool {
        if matches!(self, HostType::Unknown) {
            return true;
        }
        let HostType::Struct { fields, .. } = self else {
            return false;
        };
        let mut has_amount = false;
        let mut has_code = false;
        for (name, field_type) in fields {
            match name.as_str() {
                "amount" => has_amount = matches!(field_type, HostType::Float("f64")),
                "code" => {
                    has_code = matches!(
                        field_type,
                        HostType::Named(path) if last_segment(path) == "Currency"
                    );
                }
                _ => {}
            }
        }
        has_amount && has_code
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Renders a syntax type without whitespace or lifetimes,
/// e.g. `&'a str` → `&str`, `iso_currency :: Currency` →
/// `iso_currency::Currency`.
pub fn type_text(ty: &syn::Type) -> String {
    let rendered = ty.to_token_stream().to_string();
    let mut out = String::new();
    for token in rendered.split_whitespace() {
        if token.starts_with('\'') {
            continue;
        }
        out.push_str(token);
    }
    out
}

fn path_text(path: &syn::Path) -> String {
    path.to_token_stream().to_string().replace(' ', "")
}

/// Maps a rendered type text to a host type.
pub fn host_type_from_text(text: &str) -> HostType {
    let text = text.trim_start_matches('&');
    match text {
        "str" | "String" => HostType::Str,
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" => HostType::Int(int_name(text)),
        "u8" | "u16" | "u32" | "u64" | "u128" | "usize" => HostType::Int(int_name(text)),
        "f32" => HostType::Float("f32"),
        "f64" => HostType::Float("f64"),
        "SystemTime" | "std::time::SystemTime" | "time::SystemTime" => HostType::SystemTime,
        other if !other.is_empty() => HostType::Named(other.to_owned()),
        _ => HostType::Unknown,
    }
}

fn int_name(text: &str) -> &'static str {
    match text {
        "i8" => "i8",
        "i16" => "i16",
        "i32" => "i32",
        "i64" => "i64",
        "i128" => "i128",
        "isize" => "isize",
        "u8" => "u8",
        "u16" => "u16",
        "u32" => "u32",
        "u64" => "u64",
        "u128" => "u128",
        _ => "usize",
    }
}

/// Per-file inference scope: local bindings, string constants and
/// identifiers bound to reader handles.
#[derive(Debug, Default)]
pub struct TypeScope {
    pub locals: HashMap<String, HostType>,
    /// `const NAME: &str = "…"` values usable as TIK constants.
    pub consts: HashMap<String, String>,
    /// Identifiers bound to bundle reader handles.
    pub readers: HashSet<String>,
}

/// Best-effort local inference of an argument expression's host type.
pub fn infer_expr(scope: &TypeScope, bundle: Option<&BundleInfo>, expr: &syn::Expr) -> HostType {
    match expr {
        syn::Expr::Lit(lit) => match &lit.lit {
            syn::Lit::Str(_) => HostType::Str,
            syn::Lit::Int(int) => {
                let suffix = int.suffix();
                if suffix.is_empty() {
                    HostType::Int("i32")
                } else {
                    host_type_from_text(suffix)
                }
            }
            syn::Lit::Float(float) => {
                let suffix = float.suffix();
                if suffix.is_empty() {
                    HostType::Float("f64")
                } else {
                    host_type_from_text(suffix)
                }
            }
            syn::Lit::Bool(_) => HostType::Named("bool".to_owned()),
            syn::Lit::Char(_) => HostType::Named("char".to_owned()),
            _ => HostType::Unknown,
        },
        syn::Expr::Unary(unary) if matches!(unary.op, syn::UnOp::Neg(_)) => {
            infer_expr(scope, bundle, &unary.expr)
        }
        syn::Expr::Reference(reference) => infer_expr(scope, bundle, &reference.expr),
        syn::Expr::Paren(paren) => infer_expr(scope, bundle, &paren.expr),
        syn::Expr::Group(group) => infer_expr(scope, bundle, &group.expr),
        syn::Expr::Cast(cast) => host_type_from_text(&type_text(&cast.ty)),
        syn::Expr::Path(path) => {
            if let Some(ident) = path.path.get_ident() {
                let name = ident.to_string();
                if let Some(found) = scope.locals.get(&name) {
                    return found.clone();
                }
                if scope.consts.contains_key(&name) {
                    return HostType::Str;
                }
                return HostType::Unknown;
            }
            // A multi-segment path is typically an enum variant:
            // the type is the path without the variant segment.
            let text = path_text(&path.path);
            match text.rsplit_once("::") {
                Some((type_path, _)) => HostType::Named(type_path.to_owned()),
                None => HostType::Unknown,
            }
        }
        syn::Expr::Call(call) => {
            let syn::Expr::Path(func) = call.func.as_ref() else {
                return HostType::Unknown;
            };
            let text = path_text(&func.path);
            if text.ends_with("SystemTime::now") {
                return HostType::SystemTime;
            }
            if text == "String::from" || text == "str::to_owned" {
                return HostType::Str;
            }
            HostType::Unknown
        }
        syn::Expr::MethodCall(call) => match call.method.to_string().as_str() {
            "to_string" | "to_owned" => HostType::Str,
            _ => HostType::Unknown,
        },
        syn::Expr::Macro(mac) => {
            let text = path_text(&mac.mac.path);
            if text == "format" || text == "concat" {
                return HostType::Str;
            }
            HostType::Unknown
        }
        syn::Expr::Struct(expr_struct) => {
            let path = path_text(&expr_struct.path);
            let name = last_segment(&path).to_owned();
            if let Some(declared) = bundle.and_then(|b| b.structs.get(&name)) {
                let fields = declared
                    .iter()
                    .map(|(field, text)| (field.clone(), host_type_from_text(text)))
                    .collect();
                return HostType::Struct { path, fields };
            }
            // Unknown struct: type the literal's own field values.
            let fields = expr_struct
                .fields
                .iter()
                .filter_map(|field| match &field.member {
                    syn::Member::Named(ident) => Some((
                        ident.to_string(),
                        infer_expr(scope, bundle, &field.expr),
                    )),
                    syn::Member::Unnamed(_) => None,
                })
                .collect();
            HostType::Struct { path, fields }
        }
        _ => HostType::Unknown,
    }
}
