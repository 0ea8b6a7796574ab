//! TIK (Translation Interpolation Key) parsing and lowering.
//!
//! A TIK is a non-empty template string: an optional leading `[context]`
//! token followed by literal fragments and typed placeholders from a closed
//! set. The ordered placeholder sequence is the argument schema of every
//! call-site using the TIK.

mod icu_translate;
mod parser;


pub use icu_translate::tik_to_icu;
pub use parser::{ParseError, ParseErrorKind, parse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Leading `[…]` context token.
    Context,
    Literal,
    /// `{text}` — arbitrary string.
    Text,
    /// `{text-gender}` — string with gender information.
    TextWithGender,
    /// `{integer}` — any signed or unsigned integer.
    Integer,
    /// `{number}` — floating point.
    Number,
    /// `{# …}` — cardinal plural with trailing literal.
    CardinalPluralStart,
    /// `{ordinal}` — ordinal plural.
    OrdinalPlural,
    DateFull,
    DateLong,
    DateMedium,
    DateShort,
    TimeFull,
    TimeLong,
    TimeMedium,
    TimeShort,
    /// `{currency}` — amount with an ISO-4217 code.
    Currency,
}

impl TokenType {
    pub fn is_placeholder(&self) -> bool {
        !matches!(self, TokenType::Context | TokenType::Literal)
    }

    /// Human-readable name used in arity diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenType::Context => "context",
            TokenType::Literal => "literal",
            TokenType::Text => "text",
            TokenType::TextWithGender => "text with gender",
            TokenType::Integer => "integer",
            TokenType::Number => "number",
            TokenType::CardinalPluralStart => "cardinal plural",
            TokenType::OrdinalPlural => "ordinal plural",
            TokenType::DateFull => "date full",
            TokenType::DateLong => "date long",
            TokenType::DateMedium => "date medium",
            TokenType::DateShort => "date short",
            TokenType::TimeFull => "time full",
            TokenType::TimeLong => "time long",
            TokenType::TimeMedium => "time medium",
            TokenType::TimeShort => "time short",
            TokenType::Currency => "currency",
        }
    }
}

/// A token of a parsed TIK. `start..end` is a byte range into the raw TIK;
/// for `Context` and `CardinalPluralStart` it covers the bracket/brace
/// interior, for `Literal` the fragment itself and for fixed placeholders
/// the whole `{…}` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'a>(&self, raw: &'a str) -> &'a str {
        &raw[self.start..self.end]
    }
}

/// A parsed TIK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tik {
    pub raw: String,
    pub tokens: Vec<Token>,
}

impl Tik {
    /// The placeholder tokens in document order: the argument schema.
    pub fn placeholders(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.token_type.is_placeholder())
    }

    /// The leading context token's text, if any.
    pub fn context(&self) -> Option<&str> {
        match self.tokens.first() {
            Some(t) if t.token_type == TokenType::Context => Some(t.text(&self.raw)),
            _ => None,
        }
    }
}
