use unic_langid::LanguageIdentifier;

use crate::catalog;
use crate::emitter::RustEmitter;
use crate::filenames::locale_snake;
use crate::{BundleSpec, EmitMessage, GENERATED_HEADER};

/// Generates the bundle façade, the module wiring and per-catalog dispatch
/// files as Rust source text.
///
/// Generated code depends on `toki`, `unic-langid`, `icu_plurals`,
/// `icu_datetime` and `iso_currency`; the toolchain only emits the text.
pub struct Writer<'a> {
    head: &'a [String],
}

impl<'a> Writer<'a> {
    pub fn new(head: &'a [String]) -> Self {
        Self { head }
    }

    /// `mod.rs`: wires the generated files into one module.
    pub fn mod_source(&self, spec: &BundleSpec) -> String {
        let mut e = RustEmitter::new();
        self.header(&mut e);
        e.blank_line();
        e.write_line("mod bundle_gen;");
        for locale in &spec.locales {
            e.write_line(&format!("mod catalog_{}_gen;", locale_snake(locale)));
        }
        e.blank_line();
        e.write_line("pub use bundle_gen::*;");
        e.finish()
    }

    /// `catalog_<locale>_gen.rs`: the dispatch table for one catalog.
    pub fn catalog_source(
        &self,
        locale: &LanguageIdentifier,
        messages: &[EmitMessage],
    ) -> String {
        catalog::catalog_source(locale, messages, self.head)
    }

    /// `bundle_gen.rs`: the bundle façade.
    pub fn bundle_source(&self, spec: &BundleSpec) -> String {
        let mut e = RustEmitter::new();
        self.header(&mut e);
        e.blank_line();
        e.write_line("#![allow(dead_code)]");
        e.blank_line();
        e.write_line("use std::io;");
        e.write_line("use std::sync::OnceLock;");
        e.write_line("use std::time::SystemTime;");
        e.blank_line();
        e.write_line("use unic_langid::LanguageIdentifier;");
        e.blank_line();

        e.write_line(&format!("pub const TOKI_VERSION: &str = {:?};", spec.version));
        e.write_line(&format!(
            "pub const DEFAULT_LOCALE: &str = {:?};",
            spec.default_locale.to_string()
        ));
        e.blank_line();

        self.value_types(&mut e);
        self.reader_trait(&mut e);
        self.localizer(&mut e, spec);
        self.helpers(&mut e);
        e.finish()
    }

    fn header(&self, e: &mut RustEmitter) {
        e.write_raw(GENERATED_HEADER);
        for line in self.head {
            e.write_raw(&format!("// {line}"));
        }
    }

    fn value_types(&self, e: &mut RustEmitter) {
        e.write_line("#[derive(Debug, Clone, Copy, PartialEq, Eq)]");
        e.open("pub enum Gender {");
        e.write_line("Neutral,");
        e.write_line("Male,");
        e.write_line("Female,");
        e.close("}");
        e.blank_line();

        e.write_line("/// A string carrying gender information.");
        e.write_line("#[derive(Debug, Clone, Copy)]");
        e.open("pub struct Str<'a> {");
        e.write_line("pub value: &'a str,");
        e.write_line("pub gender: Gender,");
        e.close("}");
        e.blank_line();

        e.write_line("/// An amount with its ISO-4217 currency code.");
        e.write_line("#[derive(Debug, Clone, Copy)]");
        e.open("pub struct Currency {");
        e.write_line("pub amount: f64,");
        e.write_line("pub code: iso_currency::Currency,");
        e.close("}");
        e.blank_line();

        e.write_line("/// A translation argument.");
        e.write_line("#[derive(Debug, Clone, Copy)]");
        e.open("pub enum Value<'a> {");
        e.write_line("Str(&'a str),");
        e.write_line("Int(i64),");
        e.write_line("Uint(u64),");
        e.write_line("Float(f64),");
        e.write_line("Gendered(Str<'a>),");
        e.write_line("Time(SystemTime),");
        e.write_line("Currency(Currency),");
        e.close("}");
        e.blank_line();

        let conversions = [
            ("&'a str", "Value::Str(v)"),
            ("i64", "Value::Int(v)"),
            ("i32", "Value::Int(v as i64)"),
            ("u64", "Value::Uint(v)"),
            ("u32", "Value::Uint(v as u64)"),
            ("f64", "Value::Float(v)"),
            ("f32", "Value::Float(v as f64)"),
            ("Str<'a>", "Value::Gendered(v)"),
            ("SystemTime", "Value::Time(v)"),
            ("Currency", "Value::Currency(v)"),
        ];
        for (source, body) in conversions {
            e.open(&format!("impl<'a> From<{source}> for Value<'a> {{"));
            e.open(&format!("fn from(v: {source}) -> Self {{"));
            e.write_line(body);
            e.close("}");
            e.close("}");
            e.blank_line();
        }
    }

    fn reader_trait(&self, e: &mut RustEmitter) {
        e.write_line("/// Reads localized data for one catalog locale.");
        e.open("pub trait Reader: Sync {");
        e.write_line("/// The locale this reader localizes for.");
        e.write_line("fn locale(&self) -> &LanguageIdentifier;");
        e.blank_line();
        e.write_line("/// A localized translation string for the given TIK.");
        e.write_line("fn string(&self, tik: &str, args: &[Value<'_>]) -> String;");
        e.blank_line();
        e.write_line("/// Writes a localized translation for the given TIK.");
        e.write_line(
            "fn write(&self, writer: &mut dyn io::Write, tik: &str, args: &[Value<'_>]) -> io::Result<usize>;",
        );
        e.close("}");
        e.blank_line();
    }

    fn localizer(&self, e: &mut RustEmitter, spec: &BundleSpec) {
        e.write_line(
            "static LOCALIZER: OnceLock<toki::Localizer<&'static dyn Reader>> = OnceLock::new();",
        );
        e.blank_line();
        e.open("fn localizer() -> &'static toki::Localizer<&'static dyn Reader> {");
        e.open("LOCALIZER.get_or_init(|| {");
        e.open("toki::Localizer::new(");
        e.write_line("DEFAULT_LOCALE.parse().expect(\"default locale tag\"),");
        e.open("[");
        for locale in &spec.locales {
            let snake = locale_snake(locale);
            e.write_line(&format!(
                "(Reader::locale(&super::catalog_{snake}_gen::CATALOG_{}).clone(), &super::catalog_{snake}_gen::CATALOG_{} as &'static dyn Reader),",
                snake.to_uppercase(),
                snake.to_uppercase()
            ));
        }
        e.close("],");
        e.close(")");
        e.write_line(".expect(\"bundle catalogs\")");
        e.close("})");
        e.close("}");
        e.blank_line();

        e.write_line("/// The best matching reader for the requested locales.");
        e.open(
            "pub fn match_locales(requested: &[LanguageIdentifier]) -> (&'static dyn Reader, toki::Confidence) {",
        );
        e.write_line("localizer().match_locales(requested)");
        e.close("}");
        e.blank_line();

        e.write_line("/// The reader for the default locale.");
        e.open("pub fn default() -> &'static dyn Reader {");
        e.write_line("localizer().default()");
        e.close("}");
        e.blank_line();

        e.write_line("/// The reader for a base language, or the default reader.");
        e.open("pub fn for_base(language: unic_langid::subtags::Language) -> &'static dyn Reader {");
        e.write_line("localizer().for_base(language)");
        e.close("}");
        e.blank_line();

        e.write_line("/// All locales of the bundle.");
        e.open("pub fn locales() -> &'static [LanguageIdentifier] {");
        e.write_line("localizer().locales()");
        e.close("}");
        e.blank_line();

        e.write_line("/// All available readers.");
        e.open("pub fn readers() -> &'static [&'static dyn Reader] {");
        e.write_line("localizer().readers()");
        e.close("}");
        e.blank_line();

        e.write_line("/// Iterates over all catalogs of the bundle.");
        e.open("pub fn catalogs() -> impl Iterator<Item = &'static dyn Reader> {");
        e.write_line("localizer().readers().iter().copied()");
        e.close("}");
        e.blank_line();
    }

    fn helpers(&self, e: &mut RustEmitter) {
        e.write_line("/// Fallback for TIKs without a translation: the TIK itself.");
        e.open(
            "pub fn missing_translation(writer: &mut dyn io::Write, locale: &LanguageIdentifier, tik: &str, args: &[Value<'_>]) -> io::Result<usize> {",
        );
        e.write_line("let _ = (locale, args);");
        e.write_line("write_str(writer, tik)");
        e.close("}");
        e.blank_line();

        e.open("pub(crate) fn write_str(writer: &mut dyn io::Write, s: &str) -> io::Result<usize> {");
        e.write_line("writer.write_all(s.as_bytes())?;");
        e.write_line("Ok(s.len())");
        e.close("}");
        e.blank_line();

        e.open("pub(crate) fn simple_value(value: &Value<'_>) -> String {");
        e.open("match value {");
        e.write_line("Value::Str(s) => (*s).to_owned(),");
        e.write_line("Value::Int(i) => i.to_string(),");
        e.write_line("Value::Uint(u) => u.to_string(),");
        e.write_line("Value::Float(f) => f.to_string(),");
        e.write_line("Value::Gendered(s) => s.value.to_owned(),");
        e.write_line("Value::Time(_) => String::new(),");
        e.write_line(
            "Value::Currency(c) => format!(\"{} {:.2}\", c.code.code(), c.amount),",
        );
        e.close("}");
        e.close("}");
        e.blank_line();

        e.write_line("/// The value a `select` argument dispatches on.");
        e.open("pub(crate) fn select_value<'a>(value: &'a Value<'_>) -> &'a str {");
        e.open("match value {");
        e.write_line("Value::Str(s) => s,");
        e.open("Value::Gendered(s) => match s.gender {");
        e.write_line("Gender::Male => \"male\",");
        e.write_line("Gender::Female => \"female\",");
        e.write_line("Gender::Neutral => \"neutral\",");
        e.close("},");
        e.write_line("_ => \"\",");
        e.close("}");
        e.close("}");
        e.blank_line();

        e.open("pub(crate) fn subtract(value: &Value<'_>, offset: u64) -> Value<'static> {");
        e.open("match value {");
        e.write_line("Value::Int(i) => Value::Int(i - offset as i64),");
        e.write_line("Value::Uint(u) => Value::Uint(u.saturating_sub(offset)),");
        e.write_line("Value::Float(f) => Value::Float(f - offset as f64),");
        e.write_line("_ => Value::Int(0),");
        e.close("}");
        e.close("}");
        e.blank_line();

        e.open("fn plural_operand(value: &Value<'_>) -> icu_plurals::PluralOperands {");
        e.open("match value {");
        e.write_line("Value::Int(i) => (*i).into(),");
        e.write_line("Value::Uint(u) => (*u).into(),");
        e.write_line("Value::Float(f) => (*f as i64).into(),");
        e.write_line("_ => 0i64.into(),");
        e.close("}");
        e.close("}");
        e.blank_line();

        e.open(
            "fn plural_rule(locale: &LanguageIdentifier, value: &Value<'_>, rule_type: icu_plurals::PluralRuleType) -> icu_plurals::PluralCategory {",
        );
        e.write_line("let parsed: icu_locid::Locale = locale");
        e.write_line("    .to_string()");
        e.write_line("    .parse()");
        e.write_line("    .unwrap_or_else(|_| icu_locid::Locale::default());");
        e.write_line("match icu_plurals::PluralRules::try_new(&parsed.into(), rule_type) {");
        e.write_line("    Ok(rules) => rules.category_for(plural_operand(value)),");
        e.write_line("    Err(_) => icu_plurals::PluralCategory::Other,");
        e.write_line("}");
        e.close("}");
        e.blank_line();

        e.open(
            "pub(crate) fn plural_rule_cardinal(locale: &LanguageIdentifier, value: &Value<'_>) -> icu_plurals::PluralCategory {",
        );
        e.write_line("plural_rule(locale, value, icu_plurals::PluralRuleType::Cardinal)");
        e.close("}");
        e.blank_line();

        e.open(
            "pub(crate) fn plural_rule_ordinal(locale: &LanguageIdentifier, value: &Value<'_>) -> icu_plurals::PluralCategory {",
        );
        e.write_line("plural_rule(locale, value, icu_plurals::PluralRuleType::Ordinal)");
        e.close("}");
        e.blank_line();

        let lengths = [
            ("full", "Full"),
            ("long", "Long"),
            ("medium", "Medium"),
            ("short", "Short"),
        ];
        for (name, variant) in lengths {
            e.open(&format!(
                "pub(crate) fn fmt_date_{name}(locale: &LanguageIdentifier, value: &Value<'_>) -> String {{"
            ));
            e.write_line(&format!(
                "fmt_moment(locale, value, Some(icu_datetime::options::length::Date::{variant}), None)"
            ));
            e.close("}");
            e.blank_line();
        }
        for (name, variant) in lengths {
            e.open(&format!(
                "pub(crate) fn fmt_time_{name}(locale: &LanguageIdentifier, value: &Value<'_>) -> String {{"
            ));
            e.write_line(&format!(
                "fmt_moment(locale, value, None, Some(icu_datetime::options::length::Time::{variant}))"
            ));
            e.close("}");
            e.blank_line();
        }

        e.open(
            "fn fmt_moment(locale: &LanguageIdentifier, value: &Value<'_>, date: Option<icu_datetime::options::length::Date>, time: Option<icu_datetime::options::length::Time>) -> String {",
        );
        e.write_line("let Value::Time(moment) = value else { return String::new() };");
        e.write_line("let since_epoch = moment");
        e.write_line("    .duration_since(SystemTime::UNIX_EPOCH)");
        e.write_line("    .unwrap_or_default();");
        e.write_line("let parsed: icu_locid::Locale = locale");
        e.write_line("    .to_string()");
        e.write_line("    .parse()");
        e.write_line("    .unwrap_or_else(|_| icu_locid::Locale::default());");
        e.write_line("let minutes = (since_epoch.as_secs() / 60) as i32;");
        e.write_line("let datetime = icu_calendar::DateTime::from_minutes_since_local_unix_epoch(minutes);");
        e.open("let bag = icu_datetime::options::length::Bag::from_date_time_style(");
        e.write_line("date.unwrap_or(icu_datetime::options::length::Date::Medium),");
        e.write_line("time.unwrap_or(icu_datetime::options::length::Time::Medium),");
        e.close(");");
        e.write_line("let bag = match (date, time) {");
        e.write_line("    (Some(d), None) => icu_datetime::options::length::Bag::from_date_style(d),");
        e.write_line("    (None, Some(t)) => icu_datetime::options::length::Bag::from_time_style(t),");
        e.write_line("    _ => bag,");
        e.write_line("};");
        e.write_line("let formatter = icu_datetime::DateTimeFormatter::try_new(&parsed.into(), bag.into());");
        e.open("match formatter {");
        e.write_line("Ok(f) => f");
        e.write_line("    .format_to_string(&datetime.to_any())");
        e.write_line("    .unwrap_or_default(),");
        e.write_line("Err(_) => String::new(),");
        e.close("}");
        e.close("}");
    }
}
