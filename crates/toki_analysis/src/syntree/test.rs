use std::path::PathBuf;

use super::*;

fn expr(source: &str) -> syn::Expr {
    syn::parse_str(source).unwrap()
}

fn infer(source: &str) -> HostType {
    infer_expr(&TypeScope::default(), None, &expr(source))
}

#[test]
fn test_host_type_from_text() {
    assert_eq!(HostType::Str, host_type_from_text("&str"));
    assert_eq!(HostType::Str, host_type_from_text("String"));
    assert_eq!(HostType::Int("i64"), host_type_from_text("i64"));
    assert_eq!(HostType::Float("f64"), host_type_from_text("f64"));
    assert_eq!(
        HostType::SystemTime,
        host_type_from_text("std::time::SystemTime")
    );
    assert_eq!(
        HostType::Named("iso_currency::Currency".to_owned()),
        host_type_from_text("iso_currency::Currency")
    );
}

#[test]
fn test_type_text_strips_lifetimes() {
    let ty: syn::Type = syn::parse_str("&'a str").unwrap();
    assert_eq!("&str", type_text(&ty));
    let ty: syn::Type = syn::parse_str("iso_currency :: Currency").unwrap();
    assert_eq!("iso_currency::Currency", type_text(&ty));
}

#[test]
fn test_infer_literals() {
    assert_eq!(HostType::Str, infer(r#""hello""#));
    assert_eq!(HostType::Int("i32"), infer("42"));
    assert_eq!(HostType::Int("i64"), infer("42i64"));
    assert_eq!(HostType::Int("u8"), infer("7u8"));
    assert_eq!(HostType::Float("f64"), infer("2.5"));
    assert_eq!(HostType::Float("f32"), infer("2.5f32"));
    assert_eq!(HostType::Int("i32"), infer("-42"));
    assert_eq!(HostType::Str, infer(r#"&"borrowed""#));
}

#[test]
fn test_infer_casts_and_calls() {
    assert_eq!(HostType::Int("i64"), infer("x as i64"));
    assert_eq!(HostType::SystemTime, infer("std::time::SystemTime::now()"));
    assert_eq!(HostType::SystemTime, infer("SystemTime::now()"));
    assert_eq!(HostType::Str, infer(r#"String::from("x")"#));
    assert_eq!(HostType::Str, infer(r#"format!("{}", x)"#));
    assert_eq!(HostType::Str, infer(r#"x.to_string()"#));
    assert_eq!(HostType::Unknown, infer("compute()"));
}

#[test]
fn test_infer_locals() {
    let mut scope = TypeScope::default();
    scope.locals.insert("count".to_owned(), HostType::Int("u32"));
    scope.consts.insert("NAME".to_owned(), "toki".to_owned());
    assert_eq!(
        HostType::Int("u32"),
        infer_expr(&scope, None, &expr("count"))
    );
    assert_eq!(HostType::Str, infer_expr(&scope, None, &expr("NAME")));
    assert_eq!(HostType::Unknown, infer_expr(&scope, None, &expr("other")));
}

#[test]
fn test_infer_enum_variant_path() {
    assert_eq!(
        HostType::Named("tokibundle::Gender".to_owned()),
        infer("tokibundle::Gender::Male")
    );
}

#[test]
fn test_predicates() {
    assert!(HostType::Str.is_string());
    assert!(!HostType::Str.is_numeric());
    assert!(HostType::Int("i8").is_integer());
    assert!(HostType::Int("u64").is_numeric());
    assert!(!HostType::Int("i32").is_float());
    assert!(HostType::Float("f32").is_float());
    assert!(HostType::SystemTime.is_time());
    // Unresolved types are the type-checker's problem, not ours.
    assert!(HostType::Unknown.is_string());
    assert!(HostType::Unknown.is_currency());
}

#[test]
fn test_gender_and_currency_predicates() {
    let gendered = HostType::Struct {
        path: "tokibundle::Str".to_owned(),
        fields: vec![
            ("value".to_owned(), HostType::Str),
            (
                "gender".to_owned(),
                HostType::Named("tokibundle::Gender".to_owned()),
            ),
        ],
    };
    assert!(gendered.is_string_with_gender());
    assert!(!gendered.is_currency());

    let currency = HostType::Struct {
        path: "tokibundle::Currency".to_owned(),
        fields: vec![
            ("amount".to_owned(), HostType::Float("f64")),
            (
                "code".to_owned(),
                HostType::Named("iso_currency::Currency".to_owned()),
            ),
        ],
    };
    assert!(currency.is_currency());
    assert!(!currency.is_string_with_gender());

    let wrong = HostType::Struct {
        path: "x::Currency".to_owned(),
        fields: vec![("amount".to_owned(), HostType::Float("f32"))],
    };
    assert!(!wrong.is_currency());
}

fn write_tree(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, content) in files {
        let full = dir.path().join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }
    dir
}

const BUNDLE_GEN: &str = r#"
pub const TOKI_VERSION: &str = "0.8.0";
pub const DEFAULT_LOCALE: &str = "en";

pub enum Gender { Neutral, Male, Female }

pub struct Str<'a> {
    pub value: &'a str,
    pub gender: Gender,
}

pub struct Currency {
    pub amount: f64,
    pub code: iso_currency::Currency,
}

pub trait Reader {}

pub fn default() -> &'static dyn Reader {
    unimplemented!()
}

pub fn match_locales(requested: &[u8]) -> (&'static dyn Reader, u8) {
    unimplemented!()
}
"#;

#[test]
fn test_load_project() {
    let dir = write_tree(&[
        ("src/main.rs", "fn main() {}\n"),
        ("src/b.rs", "pub fn b() {}\n"),
        ("src/a.rs", "pub fn a() {}\n"),
        ("src/tokibundle/mod.rs", "mod bundle_gen;\npub use bundle_gen::*;\n"),
        ("src/tokibundle/bundle_gen.rs", BUNDLE_GEN),
        ("target/debug/ignored.rs", "not even rust"),
    ]);

    let project = load_project(dir.path(), &PathBuf::from("src/tokibundle")).unwrap();
    let unit_paths: Vec<&str> = project.units.iter().map(|u| u.rel_path.as_str()).collect();
    assert_eq!(vec!["src/a.rs", "src/b.rs", "src/main.rs"], unit_paths);

    let bundle = project.bundle.expect("bundle discovered");
    assert_eq!("tokibundle", bundle.module_name);
    assert_eq!("tokibundle::Reader", bundle.reader_type);
    assert_eq!("tokibundle::Gender", bundle.gender_type);
    assert_eq!("0.8.0", bundle.toki_version);
    assert_eq!("en", bundle.default_locale);
    assert!(bundle.reader_fns.contains("default"));
    assert!(bundle.reader_fns.contains("match_locales"));
    assert_eq!(
        vec![
            ("value".to_owned(), "&str".to_owned()),
            ("gender".to_owned(), "Gender".to_owned()),
        ],
        bundle.structs["Str"]
    );
    assert_eq!(
        vec![
            ("amount".to_owned(), "f64".to_owned()),
            ("code".to_owned(), "iso_currency::Currency".to_owned()),
        ],
        bundle.structs["Currency"]
    );
}

#[test]
fn test_load_project_without_bundle() {
    let dir = write_tree(&[("src/main.rs", "fn main() {}\n")]);
    let project = load_project(dir.path(), &PathBuf::from("src/tokibundle")).unwrap();
    assert!(project.bundle.is_none());
    assert_eq!(1, project.units.len());
}

#[test]
fn test_load_project_parse_error_is_fatal() {
    let dir = write_tree(&[("src/main.rs", "this file is broken")]);
    let err = load_project(dir.path(), &PathBuf::from("src/tokibundle")).unwrap_err();
    assert!(matches!(err, LoadError::Parse { .. }));
}
