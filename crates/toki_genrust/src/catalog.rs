use toki_analysis::icumsg::{self, Token, TokenType};
use unic_langid::LanguageIdentifier;

use crate::emitter::RustEmitter;
use crate::filenames::{locale_camel, locale_snake};
use crate::{EmitMessage, GENERATED_HEADER};

/// Emits a per-locale catalog dispatch file: a `writer_<locale>` lookup
/// from the raw TIK to a writer function lowered from the message's ICU
/// token stream.
pub(crate) fn catalog_source(
    locale: &LanguageIdentifier,
    messages: &[EmitMessage],
    head: &[String],
) -> String {
    let snake = locale_snake(locale);
    let camel = locale_camel(locale);
    let mut e = RustEmitter::new();

    e.write_raw(GENERATED_HEADER);
    for line in head {
        e.write_raw(&format!("// {line}"));
    }
    e.blank_line();
    e.write_line("use std::io;");
    e.write_line("use std::sync::OnceLock;");
    e.blank_line();
    e.write_line("use icu_plurals::PluralCategory;");
    e.write_line("use unic_langid::LanguageIdentifier;");
    e.blank_line();
    e.write_line("#[allow(unused_imports)]");
    e.open("use super::{");
    e.write_line("Reader, Value, fmt_date_full, fmt_date_long, fmt_date_medium,");
    e.write_line("fmt_date_short, fmt_time_full, fmt_time_long, fmt_time_medium,");
    e.write_line("fmt_time_short, missing_translation, plural_rule_cardinal,");
    e.write_line("plural_rule_ordinal, select_value, simple_value, subtract, write_str,");
    e.close("};");
    e.blank_line();

    e.write_line(&format!(
        "static LOCALE_{}: OnceLock<LanguageIdentifier> = OnceLock::new();",
        snake.to_uppercase()
    ));
    e.blank_line();
    e.open(&format!(
        "fn locale_{snake}() -> &'static LanguageIdentifier {{"
    ));
    e.write_line(&format!(
        "LOCALE_{}.get_or_init(|| {:?}.parse().expect(\"locale tag\"))",
        snake.to_uppercase(),
        locale.to_string()
    ));
    e.close("}");
    e.blank_line();

    e.write_line(&format!("pub(super) struct Catalog{camel};"));
    e.blank_line();
    e.write_line(&format!(
        "pub(super) static CATALOG_{}: Catalog{camel} = Catalog{camel};",
        snake.to_uppercase()
    ));
    e.blank_line();

    e.open(&format!("impl Reader for Catalog{camel} {{"));
    e.open("fn locale(&self) -> &LanguageIdentifier {");
    e.write_line(&format!("locale_{snake}()"));
    e.close("}");
    e.blank_line();
    e.open("fn string(&self, tik: &str, args: &[Value<'_>]) -> String {");
    e.write_line("let mut buffer = Vec::new();");
    e.write_line("let _ = self.write(&mut buffer, tik, args);");
    e.write_line("String::from_utf8_lossy(&buffer).into_owned()");
    e.close("}");
    e.blank_line();
    e.open(
        "fn write(&self, writer: &mut dyn io::Write, tik: &str, args: &[Value<'_>]) -> io::Result<usize> {",
    );
    e.open(&format!("match writer_{snake}(tik) {{"));
    e.write_line("Some(f) => f(writer, args),");
    e.write_line(&format!(
        "None => missing_translation(writer, locale_{snake}(), tik, args),"
    ));
    e.close("}");
    e.close("}");
    e.close("}");
    e.blank_line();

    e.write_line("type WriterFn = fn(&mut dyn io::Write, &[Value]) -> io::Result<usize>;");
    e.blank_line();

    e.open(&format!("fn writer_{snake}(tik: &str) -> Option<WriterFn> {{"));
    e.open("match tik {");
    for message in messages {
        MessageWriter {
            e: &mut e,
            raw: &message.icu_message,
            tokens: &message.icu_tokens,
            i: 0,
            locale_fn: format!("locale_{snake}()"),
        }
        .write_message(&message.id, &message.tik);
    }
    e.write_line("_ => None,");
    e.close("}");
    e.close("}");

    e.finish()
}

/// Lowers one message's token stream into a writer-function match arm.
struct MessageWriter<'a> {
    e: &'a mut RustEmitter,
    raw: &'a str,
    tokens: &'a [Token],
    i: usize,
    locale_fn: String,
}

impl<'a> MessageWriter<'a> {
    fn write_message(mut self, id: &str, tik: &str) {
        self.e.write_line(&format!("// {id}"));
        let args_used = self
            .tokens
            .iter()
            .any(|t| t.token_type != TokenType::Literal);
        let args_param = if args_used { "args" } else { "_args" };

        if let Some(folded) = self.literal_concat(self.tokens.len()) {
            // A pure-literal message folds into a single write.
            self.e
                .open(&format!("{tik:?} => Some(|w, {args_param}| {{"));
            self.e.write_line(&format!("write_str(w, {folded:?})"));
            self.e.close("}),");
            return;
        }

        self.e
            .open(&format!("{tik:?} => Some(|w, {args_param}| {{"));
        self.e.write_line("let mut written = 0usize;");
        self.write_expr(self.tokens.len());
        self.e.write_line("Ok(written)");
        self.e.close("}),");
    }

    /// Folds the remaining tokens into one string when they are all
    /// literals.
    fn literal_concat(&self, end: usize) -> Option<String> {
        let rest = &self.tokens[self.i..end];
        if rest.is_empty() || !rest.iter().all(|t| t.token_type == TokenType::Literal) {
            return None;
        }
        let mut folded = String::new();
        for token in rest {
            folded.push_str(&icumsg::unescape_literal(token.text(self.raw)));
        }
        Some(folded)
    }

    fn write_expr(&mut self, end: usize) {
        while self.i < end {
            match self.tokens[self.i].token_type {
                TokenType::Literal => {
                    let text = icumsg::unescape_literal(self.tokens[self.i].text(self.raw));
                    self.write_str(&text);
                    self.i += 1;
                }
                TokenType::SimpleArg => self.write_simple_arg(),
                TokenType::Plural => self.write_plural(false),
                TokenType::SelectOrdinal => self.write_plural(true),
                TokenType::Select => self.write_select(),
                _ => self.i += 1,
            }
        }
    }

    fn write_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.e
            .write_line(&format!("written += write_str(w, {text:?})?;"));
    }

    fn arg_index(&self, name_token: usize) -> usize {
        parse_arg_index(self.tokens[name_token].text(self.raw))
    }

    fn write_simple_arg(&mut self) {
        let container_end = self.tokens[self.i].index_end;
        let arg = self.arg_index(self.i + 1);
        let arg_type = self
            .tokens
            .get(self.i + 2)
            .filter(|t| self.i + 2 <= container_end && t.token_type.is_arg_type())
            .map(|t| t.token_type);
        let style = self
            .tokens
            .get(self.i + 3)
            .filter(|t| self.i + 3 <= container_end && t.token_type.is_arg_style())
            .map(|t| t.token_type);

        let call = match (arg_type, style) {
            (Some(TokenType::ArgTypeDate), style) => {
                format!("{}({}, &args[{arg}])", date_formatter(style), self.locale_fn)
            }
            (Some(TokenType::ArgTypeTime), style) => {
                format!("{}({}, &args[{arg}])", time_formatter(style), self.locale_fn)
            }
            // Number styles fall back to the plain formatter.
            _ => format!("simple_value(&args[{arg}])"),
        };
        self.e
            .write_line(&format!("written += write_str(w, &{call})?;"));
        self.i = container_end + 1;
    }

    fn write_plural(&mut self, ordinal: bool) {
        let container = self.i;
        let container_end = self.tokens[container].index_end;
        let arg = self.arg_index(container + 1);

        let mut offset: u64 = 0;
        if let Some(token) = self.tokens.get(container + 2) {
            if token.token_type == TokenType::PluralOffset {
                offset = token.text(self.raw).parse().unwrap_or(0);
            }
        }

        let getter = if ordinal {
            "plural_rule_ordinal"
        } else {
            "plural_rule_cardinal"
        };

        let mut zero = None;
        let mut one = None;
        let mut two = None;
        let mut few = None;
        let mut many = None;
        let mut other = None;
        for index in icumsg::options(self.tokens, container) {
            match self.tokens[index].token_type {
                TokenType::OptionZero => zero = Some(index),
                TokenType::OptionOne => one = Some(index),
                TokenType::OptionTwo => two = Some(index),
                TokenType::OptionFew => few = Some(index),
                TokenType::OptionMany => many = Some(index),
                TokenType::OptionOther => other = Some(index),
                _ => {} // Exact options are not dispatched.
            }
        }

        self.e.open(&format!(
            "match {getter}({}, &args[{arg}]) {{",
            self.locale_fn
        ));
        let branches = [
            ("PluralCategory::Zero =>", zero),
            ("PluralCategory::One =>", one),
            ("PluralCategory::Two =>", two),
            ("PluralCategory::Few =>", few),
            ("PluralCategory::Many =>", many),
        ];
        for (pattern, index) in branches {
            let Some(index) = index else { continue };
            self.e.open(&format!("{pattern} {{"));
            self.i = index;
            self.write_plural_option(arg, offset);
            self.e.close("}");
        }
        if let Some(index) = other {
            self.e.open("_ => {");
            self.i = index;
            self.write_plural_option(arg, offset);
            self.e.close("}");
        }
        self.e.close("}");
        self.i = container_end + 1;
    }

    /// Writes a plural option body; literal `#` substitutes the argument,
    /// shifted by the plural offset when one is present.
    fn write_plural_option(&mut self, arg: usize, offset: u64) {
        let end = self.tokens[self.i].index_end;
        self.i += 1;
        while self.i <= end {
            match self.tokens[self.i].token_type {
                TokenType::Literal => {
                    let text = self.tokens[self.i].text(self.raw).to_owned();
                    for part in icumsg::plural_literal_parts(&text) {
                        if part == "#" {
                            if offset != 0 {
                                self.e.write_line(&format!(
                                    "written += write_str(w, &simple_value(&subtract(&args[{arg}], {offset})))?;"
                                ));
                            } else {
                                self.e.write_line(&format!(
                                    "written += write_str(w, &simple_value(&args[{arg}]))?;"
                                ));
                            }
                            continue;
                        }
                        self.write_str(&icumsg::unescape_literal(part));
                    }
                    self.i += 1;
                }
                TokenType::SimpleArg => self.write_simple_arg(),
                TokenType::Plural => self.write_plural(false),
                TokenType::SelectOrdinal => self.write_plural(true),
                TokenType::Select => self.write_select(),
                _ => self.i += 1,
            }
        }
        self.i = end + 1;
    }

    fn write_select(&mut self) {
        let container = self.i;
        let container_end = self.tokens[container].index_end;
        let arg = self.arg_index(container + 1);

        self.e
            .open(&format!("match select_value(&args[{arg}]) {{"));
        let option_indices: Vec<usize> = icumsg::options(self.tokens, container).collect();
        for index in &option_indices {
            if self.tokens[*index].token_type != TokenType::OptionNamed {
                continue;
            }
            let name = self.tokens[*index].text(self.raw).to_owned();
            self.e.open(&format!("{name:?} => {{"));
            self.i = *index + 1;
            self.write_expr(self.tokens[*index].index_end + 1);
            self.e.close("}");
        }
        for index in &option_indices {
            if self.tokens[*index].token_type != TokenType::OptionOther {
                continue;
            }
            self.e.open("_ => {");
            self.i = *index + 1;
            self.write_expr(self.tokens[*index].index_end + 1);
            self.e.close("}");
        }
        self.e.close("}");
        self.i = container_end + 1;
    }
}

fn date_formatter(style: Option<TokenType>) -> &'static str {
    match style {
        Some(TokenType::ArgStyleFull) => "fmt_date_full",
        Some(TokenType::ArgStyleLong) => "fmt_date_long",
        Some(TokenType::ArgStyleShort) => "fmt_date_short",
        _ => "fmt_date_medium",
    }
}

fn time_formatter(style: Option<TokenType>) -> &'static str {
    match style {
        Some(TokenType::ArgStyleFull) => "fmt_time_full",
        Some(TokenType::ArgStyleLong) => "fmt_time_long",
        Some(TokenType::ArgStyleShort) => "fmt_time_short",
        _ => "fmt_time_medium",
    }
}

/// Extracts the argument index from a `var<N>[_suffix]` argument name.
fn parse_arg_index(name: &str) -> usize {
    let digits: String = name
        .trim_start_matches("var")
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}
