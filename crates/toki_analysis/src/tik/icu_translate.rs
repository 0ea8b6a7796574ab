use std::fmt::Write;

use super::{Tik, TokenType};

/// Lowers a parsed TIK into an ICU MessageFormat message.
///
/// The lowering is deterministic: placeholders become `var0`, `var1`, … in
/// document order. Plural and gender containers only carry the `other`
/// branch; further branches are added later in translation.
pub fn tik_to_icu(tik: &Tik) -> String {
    let mut out = String::with_capacity(tik.raw.len());
    let mut var = 0usize;
    for token in &tik.tokens {
        let text = token.text(&tik.raw);
        match token.token_type {
            TokenType::Context => {}
            TokenType::Literal => escape_into(&mut out, text),
            TokenType::Text | TokenType::Integer | TokenType::Number => {
                let _ = write!(out, "{{var{var}}}");
                var += 1;
            }
            TokenType::TextWithGender => {
                let _ = write!(out, "{{var{var}_gender, select, other {{{{var{var}}}}}}}");
                var += 1;
            }
            TokenType::CardinalPluralStart => {
                let _ = write!(out, "{{var{var}, plural, other {{");
                escape_into(&mut out, text);
                out.push_str("}}");
                var += 1;
            }
            TokenType::OrdinalPlural => {
                let _ = write!(out, "{{var{var}, selectordinal, other {{#}}}}");
                var += 1;
            }
            TokenType::DateFull => {
                let _ = write!(out, "{{var{var}, date, full}}");
                var += 1;
            }
            TokenType::DateLong => {
                let _ = write!(out, "{{var{var}, date, long}}");
                var += 1;
            }
            TokenType::DateMedium => {
                let _ = write!(out, "{{var{var}, date, medium}}");
                var += 1;
            }
            TokenType::DateShort => {
                let _ = write!(out, "{{var{var}, date, short}}");
                var += 1;
            }
            TokenType::TimeFull => {
                let _ = write!(out, "{{var{var}, time, full}}");
                var += 1;
            }
            TokenType::TimeLong => {
                let _ = write!(out, "{{var{var}, time, long}}");
                var += 1;
            }
            TokenType::TimeMedium => {
                let _ = write!(out, "{{var{var}, time, medium}}");
                var += 1;
            }
            TokenType::TimeShort => {
                let _ = write!(out, "{{var{var}, time, short}}");
                var += 1;
            }
            TokenType::Currency => {
                let _ = write!(out, "{{var{var}, number, currency}}");
                var += 1;
            }
        }
    }
    out
}

/// ICU literal escaping: single quotes are doubled.
fn escape_into(out: &mut String, literal: &str) {
    for c in literal.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
}
