//! ICU MessageFormat tokenization and message analysis.
//!
//! Messages are tokenized into a flat indexed array. Container tokens
//! (`SimpleArg`, `Plural`, `SelectOrdinal`, `Select` and option tokens)
//! carry `index_end`, the index of the last token of their subtree, so a
//! consumer can skip a subtree with `index_end + 1`. Token substrings are
//! accessed by raw-message byte offsets.

mod analyze;
mod tokenizer;

#[cfg(test)]
mod test;

pub use analyze::{
    AnalysisError, OptionUnknownPolicy, OptionsPresencePolicy, SelectPolicy, analysis_report,
    analyze, options,
};
pub use tokenizer::{Tokenizer, TokenizerError, TokenizerErrorKind, plural_literal_parts,
    unescape_literal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Literal,
    /// `{name}` or `{name, type[, style]}`; followed by `ArgName`.
    SimpleArg,
    ArgName,
    ArgTypeNumber,
    ArgTypeDate,
    ArgTypeTime,
    ArgStyleShort,
    ArgStyleMedium,
    ArgStyleLong,
    ArgStyleFull,
    ArgStyleInteger,
    ArgStyleCurrency,
    ArgStylePercent,
    ArgStyleCustom,
    ArgStyleSkeleton,
    /// `{name, plural, …}`; followed by `ArgName`, an optional
    /// `PluralOffset` and option subtrees.
    Plural,
    SelectOrdinal,
    Select,
    PluralOffset,
    OptionZero,
    OptionOne,
    OptionTwo,
    OptionFew,
    OptionMany,
    OptionOther,
    /// `=N {…}` exact plural option; the token text is the `=N` selector.
    OptionExact,
    /// Named select option; the token text is the option name.
    OptionNamed,
}

impl TokenType {
    pub fn is_option(&self) -> bool {
        matches!(
            self,
            TokenType::OptionZero
                | TokenType::OptionOne
                | TokenType::OptionTwo
                | TokenType::OptionFew
                | TokenType::OptionMany
                | TokenType::OptionOther
                | TokenType::OptionExact
                | TokenType::OptionNamed
        )
    }

    pub fn is_arg_type(&self) -> bool {
        matches!(
            self,
            TokenType::ArgTypeNumber | TokenType::ArgTypeDate | TokenType::ArgTypeTime
        )
    }

    pub fn is_arg_style(&self) -> bool {
        matches!(
            self,
            TokenType::ArgStyleShort
                | TokenType::ArgStyleMedium
                | TokenType::ArgStyleLong
                | TokenType::ArgStyleFull
                | TokenType::ArgStyleInteger
                | TokenType::ArgStyleCurrency
                | TokenType::ArgStylePercent
                | TokenType::ArgStyleCustom
                | TokenType::ArgStyleSkeleton
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    /// Byte offsets into the raw message.
    pub start: usize,
    pub end: usize,
    /// Index of the last token of this token's subtree;
    /// equals the token's own index for leaves.
    pub index_end: usize,
}

impl Token {
    pub fn text<'a>(&self, raw: &'a str) -> &'a str {
        &raw[self.start..self.end]
    }
}
