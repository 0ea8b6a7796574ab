use toki_analysis::icumsg::Tokenizer;
use unic_langid::LanguageIdentifier;

use super::*;

fn langid(s: &str) -> LanguageIdentifier {
    s.parse().unwrap()
}

fn emit_message(id: &str, tik: &str, icu: &str) -> EmitMessage {
    let tokens = Tokenizer::default()
        .tokenize(&langid("en"), Vec::new(), icu)
        .unwrap();
    EmitMessage {
        id: id.to_owned(),
        tik: tik.to_owned(),
        icu_message: icu.to_owned(),
        icu_tokens: tokens,
    }
}

#[test]
fn test_locale_names() {
    assert_eq!("en", locale_snake(&langid("en")));
    assert_eq!("en_us", locale_snake(&langid("en-US")));
    assert_eq!("En", locale_camel(&langid("en")));
    assert_eq!("EnUs", locale_camel(&langid("en-US")));
    assert_eq!("catalog_en_us_gen.rs", catalog_file_name(&langid("en-US")));
}

#[test]
fn test_catalog_source_literal_message() {
    let writer = Writer::new(&[]);
    let messages = vec![emit_message("msgaaa", "just text", "just text")];
    let source = writer.catalog_source(&langid("en"), &messages);

    assert!(source.starts_with(GENERATED_HEADER), "{source}");
    let dispatch = r#"fn writer_en(tik: &str) -> Option<WriterFn> {
    match tik {
        // msgaaa
        "just text" => Some(|w, _args| {
            write_str(w, "just text")
        }),
        _ => None,
    }
}
"#;
    assert!(source.ends_with(dispatch), "{source}");
}

#[test]
fn test_catalog_source_simple_arg() {
    let writer = Writer::new(&[]);
    let messages = vec![emit_message(
        "msgbbb",
        "Nothing found in folder {text}",
        "Nothing found in folder {var0}",
    )];
    let source = writer.catalog_source(&langid("en"), &messages);
    let body = r#"        "Nothing found in folder {text}" => Some(|w, args| {
            let mut written = 0usize;
            written += write_str(w, "Nothing found in folder ")?;
            written += write_str(w, &simple_value(&args[0]))?;
            Ok(written)
        }),
"#;
    assert!(source.contains(body), "{source}");
}

#[test]
fn test_catalog_source_plural() {
    let writer = Writer::new(&[]);
    let messages = vec![emit_message(
        "msgccc",
        "{# files}",
        "{var0, plural, other {# files}}",
    )];
    let source = writer.catalog_source(&langid("en"), &messages);
    let body = r#"            match plural_rule_cardinal(locale_en(), &args[0]) {
                _ => {
                    written += write_str(w, &simple_value(&args[0]))?;
                    written += write_str(w, " files")?;
                }
            }
"#;
    assert!(source.contains(body), "{source}");
}

#[test]
fn test_catalog_source_plural_branches_and_offset() {
    let writer = Writer::new(&[]);
    let messages = vec![emit_message(
        "msgddd",
        "{# things}",
        "{var0, plural, offset:1 one {one thing} other {# things}}",
    )];
    let source = writer.catalog_source(&langid("en"), &messages);
    assert!(source.contains("PluralCategory::One => {"), "{source}");
    assert!(
        source.contains("simple_value(&subtract(&args[0], 1))"),
        "{source}"
    );
}

#[test]
fn test_catalog_source_selectordinal() {
    let writer = Writer::new(&[]);
    let messages = vec![emit_message(
        "msgeee",
        "{ordinal}",
        "{var0, selectordinal, one {#st} other {#th}}",
    )];
    let source = writer.catalog_source(&langid("en"), &messages);
    assert!(
        source.contains("match plural_rule_ordinal(locale_en(), &args[0]) {"),
        "{source}"
    );
    assert!(source.contains(r#"written += write_str(w, "st")?;"#), "{source}");
}

#[test]
fn test_catalog_source_select() {
    let writer = Writer::new(&[]);
    let messages = vec![emit_message(
        "msgfff",
        "{text-gender} finished",
        "{var0_gender, select, male {he finished} female {she finished} other {{var0} finished}}",
    )];
    let source = writer.catalog_source(&langid("en"), &messages);
    let body = r#"            match select_value(&args[0]) {
                "male" => {
                    written += write_str(w, "he finished")?;
                }
                "female" => {
                    written += write_str(w, "she finished")?;
                }
                _ => {
                    written += write_str(w, &simple_value(&args[0]))?;
                    written += write_str(w, " finished")?;
                }
            }
"#;
    assert!(source.contains(body), "{source}");
}

#[test]
fn test_catalog_source_date_time() {
    let writer = Writer::new(&[]);
    let messages = vec![emit_message(
        "msgggg",
        "on {date-full} at {time-short}",
        "on {var0, date, full} at {var1, time, short}",
    )];
    let source = writer.catalog_source(&langid("en"), &messages);
    assert!(
        source.contains("written += write_str(w, &fmt_date_full(locale_en(), &args[0]))?;"),
        "{source}"
    );
    assert!(
        source.contains("written += write_str(w, &fmt_time_short(locale_en(), &args[1]))?;"),
        "{source}"
    );
}

#[test]
fn test_catalog_source_head_lines() {
    let header_lines = ["Copyright - All Rights Reserved".to_owned()];
    let writer = Writer::new(&header_lines);
    let source = writer.catalog_source(&langid("en"), &[]);
    assert!(
        source.starts_with(
            "// Generated by toki. DO NOT EDIT.\n// Copyright - All Rights Reserved\n"
        ),
        "{source}"
    );
}

#[test]
fn test_catalog_source_is_deterministic() {
    let writer = Writer::new(&[]);
    let messages = vec![
        emit_message("msgaaa", "just text", "just text"),
        emit_message("msgbbb", "with {text}", "with {var0}"),
    ];
    let first = writer.catalog_source(&langid("en"), &messages);
    let second = writer.catalog_source(&langid("en"), &messages);
    assert_eq!(first, second);
}

#[test]
fn test_bundle_source() {
    let writer = Writer::new(&[]);
    let spec = BundleSpec {
        version: "0.8.0".to_owned(),
        default_locale: langid("en"),
        locales: vec![langid("de"), langid("en")],
    };
    let source = writer.bundle_source(&spec);
    assert!(source.starts_with(GENERATED_HEADER), "{source}");
    assert!(source.contains("pub const TOKI_VERSION: &str = \"0.8.0\";"));
    assert!(source.contains("pub const DEFAULT_LOCALE: &str = \"en\";"));
    assert!(source.contains("pub trait Reader: Sync {"));
    assert!(source.contains("pub enum Gender {"));
    assert!(source.contains("pub struct Str<'a> {"));
    assert!(source.contains("pub struct Currency {"));
    assert!(source.contains("super::catalog_de_gen::CATALOG_DE"));
    assert!(source.contains("super::catalog_en_gen::CATALOG_EN"));
    assert!(source.contains("pub fn match_locales(requested: &[LanguageIdentifier])"));
    assert!(source.contains("pub fn missing_translation"));
}

#[test]
fn test_mod_source() {
    let writer = Writer::new(&[]);
    let spec = BundleSpec {
        version: "0.8.0".to_owned(),
        default_locale: langid("en"),
        locales: vec![langid("de"), langid("en")],
    };
    let expected = "// Generated by toki. DO NOT EDIT.\n\nmod bundle_gen;\nmod catalog_de_gen;\nmod catalog_en_gen;\n\npub use bundle_gen::*;\n";
    assert_eq!(expected, writer.mod_source(&spec));
}
