use unic_langid::LanguageIdentifier;

use super::{Token, TokenType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenizerErrorKind {
    #[error("unexpected end of message")]
    UnexpectedEnd,
    #[error("unexpected '}}'")]
    UnexpectedClosingBrace,
    #[error("expected argument name")]
    ExpectedArgName,
    #[error("expected ',' or '}}'")]
    ExpectedCommaOrBrace,
    #[error("unknown argument type")]
    UnknownArgType,
    #[error("invalid plural option")]
    InvalidPluralOption,
    #[error("expected option name")]
    ExpectedOptionName,
    #[error("expected '{{'")]
    ExpectedOptionBrace,
    #[error("duplicate option")]
    DuplicateOption,
    #[error("invalid plural offset")]
    InvalidPluralOffset,
    #[error("missing the mandatory 'other' option")]
    MissingOtherOption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("at index {pos}: {kind}")]
pub struct TokenizerError {
    pub pos: usize,
    pub kind: TokenizerErrorKind,
}

/// ICU MessageFormat tokenizer. The output buffer is taken and returned so
/// callers can reuse its allocation across messages.
#[derive(Debug, Default)]
pub struct Tokenizer;

impl Tokenizer {
    pub fn tokenize(
        &mut self,
        _locale: &LanguageIdentifier,
        mut buffer: Vec<Token>,
        message: &str,
    ) -> Result<Vec<Token>, TokenizerError> {
        buffer.clear();
        let mut parser = Parser {
            src: message,
            bytes: message.as_bytes(),
            pos: 0,
            tokens: buffer,
        };
        parser.message(false)?;
        if parser.pos < parser.bytes.len() {
            // A '}' at the top level is the only way to stop early.
            return Err(TokenizerError {
                pos: parser.pos,
                kind: TokenizerErrorKind::UnexpectedClosingBrace,
            });
        }
        Ok(parser.tokens)
    }
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Parser<'a> {
    fn fail(&self, pos: usize, kind: TokenizerErrorKind) -> TokenizerError {
        TokenizerError { pos, kind }
    }

    /// Parses message content. When `nested`, returns at an unconsumed `}`;
    /// at the top level it returns at a stray `}` (the caller reports it)
    /// or at the end of input.
    fn message(&mut self, nested: bool) -> Result<(), TokenizerError> {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'{' => self.argument()?,
                b'}' => return Ok(()),
                _ => self.literal(),
            }
        }
        if nested {
            return Err(self.fail(self.pos, TokenizerErrorKind::UnexpectedEnd));
        }
        Ok(())
    }

    fn literal(&mut self) {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'{' | b'}' => break,
                b'\'' => self.skip_quoted(),
                _ => self.pos += 1,
            }
        }
        self.push_leaf(TokenType::Literal, start, self.pos);
    }

    /// Advances past a quote at the current position, honouring ICU quoting:
    /// `''` is a literal apostrophe, a quote before a syntax character opens
    /// a quoted span until the next lone quote, any other quote is literal.
    fn skip_quoted(&mut self) {
        debug_assert_eq!(b'\'', self.bytes[self.pos]);
        match self.bytes.get(self.pos + 1) {
            Some(b'\'') => self.pos += 2,
            Some(b'{') | Some(b'}') | Some(b'#') => {
                self.pos += 2;
                while self.pos < self.bytes.len() {
                    if self.bytes[self.pos] == b'\'' {
                        if self.bytes.get(self.pos + 1) == Some(&b'\'') {
                            self.pos += 2;
                            continue;
                        }
                        self.pos += 1;
                        return;
                    }
                    self.pos += 1;
                }
            }
            _ => self.pos += 1,
        }
    }

    fn argument(&mut self) -> Result<(), TokenizerError> {
        let open = self.pos;
        self.pos += 1; // consume '{'
        self.skip_ws();
        let (name_start, name_end) = self.name();
        if name_start == name_end {
            return Err(self.fail(name_start, TokenizerErrorKind::ExpectedArgName));
        }
        self.skip_ws();

        match self.bytes.get(self.pos) {
            Some(b'}') => {
                self.pos += 1;
                let container = self.push_leaf(TokenType::SimpleArg, open, self.pos);
                self.push_leaf(TokenType::ArgName, name_start, name_end);
                self.patch_container(container);
                Ok(())
            }
            Some(b',') => {
                self.pos += 1;
                self.skip_ws();
                let (kw_start, kw_end) = self.name();
                match &self.src[kw_start..kw_end] {
                    "number" => self.simple_arg(open, name_start, name_end, TokenType::ArgTypeNumber, kw_start, kw_end),
                    "date" => self.simple_arg(open, name_start, name_end, TokenType::ArgTypeDate, kw_start, kw_end),
                    "time" => self.simple_arg(open, name_start, name_end, TokenType::ArgTypeTime, kw_start, kw_end),
                    "plural" => self.complex_arg(TokenType::Plural, open, name_start, name_end, true),
                    "selectordinal" => self.complex_arg(TokenType::SelectOrdinal, open, name_start, name_end, true),
                    "select" => self.complex_arg(TokenType::Select, open, name_start, name_end, false),
                    _ => Err(self.fail(kw_start, TokenizerErrorKind::UnknownArgType)),
                }
            }
            Some(_) => Err(self.fail(self.pos, TokenizerErrorKind::ExpectedCommaOrBrace)),
            None => Err(self.fail(self.pos, TokenizerErrorKind::UnexpectedEnd)),
        }
    }

    fn simple_arg(
        &mut self,
        open: usize,
        name_start: usize,
        name_end: usize,
        arg_type: TokenType,
        kw_start: usize,
        kw_end: usize,
    ) -> Result<(), TokenizerError> {
        let container = self.push_leaf(TokenType::SimpleArg, open, 0);
        self.push_leaf(TokenType::ArgName, name_start, name_end);
        self.push_leaf(arg_type, kw_start, kw_end);

        self.skip_ws();
        match self.bytes.get(self.pos) {
            Some(b',') => {
                self.pos += 1;
                self.skip_ws();
                let style_start = self.pos;
                while self.pos < self.bytes.len() && self.bytes[self.pos] != b'}' {
                    self.pos += 1;
                }
                if self.pos >= self.bytes.len() {
                    return Err(self.fail(self.pos, TokenizerErrorKind::UnexpectedEnd));
                }
                let style_end = style_start + self.src[style_start..self.pos].trim_end().len();
                let style = &self.src[style_start..style_end];
                let style_type = match style {
                    "short" => TokenType::ArgStyleShort,
                    "medium" => TokenType::ArgStyleMedium,
                    "long" => TokenType::ArgStyleLong,
                    "full" => TokenType::ArgStyleFull,
                    "integer" => TokenType::ArgStyleInteger,
                    "currency" => TokenType::ArgStyleCurrency,
                    "percent" => TokenType::ArgStylePercent,
                    _ if style.starts_with("::") => TokenType::ArgStyleSkeleton,
                    _ => TokenType::ArgStyleCustom,
                };
                self.push_leaf(style_type, style_start, style_end);
                self.pos += 1; // consume '}'
            }
            Some(b'}') => {
                self.pos += 1;
            }
            Some(_) => {
                return Err(self.fail(self.pos, TokenizerErrorKind::ExpectedCommaOrBrace));
            }
            None => return Err(self.fail(self.pos, TokenizerErrorKind::UnexpectedEnd)),
        }
        self.tokens[container].end = self.pos;
        self.patch_container(container);
        Ok(())
    }

    fn complex_arg(
        &mut self,
        container_type: TokenType,
        open: usize,
        name_start: usize,
        name_end: usize,
        plural_options: bool,
    ) -> Result<(), TokenizerError> {
        let container = self.push_leaf(container_type, open, 0);
        self.push_leaf(TokenType::ArgName, name_start, name_end);

        self.skip_ws();
        if self.bytes.get(self.pos) != Some(&b',') {
            return Err(self.fail(self.pos, TokenizerErrorKind::ExpectedCommaOrBrace));
        }
        self.pos += 1;
        self.skip_ws();

        if plural_options && self.src[self.pos..].starts_with("offset:") {
            self.pos += "offset:".len();
            self.skip_ws();
            let digits_start = self.pos;
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
            if digits_start == self.pos {
                return Err(self.fail(digits_start, TokenizerErrorKind::InvalidPluralOffset));
            }
            self.push_leaf(TokenType::PluralOffset, digits_start, self.pos);
        }

        let mut seen: Vec<String> = Vec::new();
        let mut has_other = false;
        loop {
            self.skip_ws();
            match self.bytes.get(self.pos) {
                None => return Err(self.fail(self.pos, TokenizerErrorKind::UnexpectedEnd)),
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                _ => {}
            }

            let key_start = self.pos;
            let option_type;
            if self.bytes[self.pos] == b'=' {
                if !plural_options {
                    return Err(self.fail(key_start, TokenizerErrorKind::ExpectedOptionName));
                }
                self.pos += 1;
                while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                    self.pos += 1;
                }
                if self.pos == key_start + 1 {
                    return Err(self.fail(key_start, TokenizerErrorKind::InvalidPluralOption));
                }
                option_type = TokenType::OptionExact;
            } else {
                let (start, end) = self.name();
                if start == end {
                    return Err(self.fail(start, TokenizerErrorKind::ExpectedOptionName));
                }
                option_type = if plural_options {
                    match &self.src[start..end] {
                        "zero" => TokenType::OptionZero,
                        "one" => TokenType::OptionOne,
                        "two" => TokenType::OptionTwo,
                        "few" => TokenType::OptionFew,
                        "many" => TokenType::OptionMany,
                        "other" => TokenType::OptionOther,
                        _ => {
                            return Err(
                                self.fail(start, TokenizerErrorKind::InvalidPluralOption)
                            );
                        }
                    }
                } else if &self.src[start..end] == "other" {
                    TokenType::OptionOther
                } else {
                    TokenType::OptionNamed
                };
            }
            let key_end = self.pos;
            let key = self.src[key_start..key_end].to_owned();
            if seen.contains(&key) {
                return Err(self.fail(key_start, TokenizerErrorKind::DuplicateOption));
            }
            seen.push(key);
            if option_type == TokenType::OptionOther {
                has_other = true;
            }

            self.skip_ws();
            if self.bytes.get(self.pos) != Some(&b'{') {
                return Err(self.fail(self.pos, TokenizerErrorKind::ExpectedOptionBrace));
            }
            self.pos += 1;
            let option = self.push_leaf(option_type, key_start, key_end);
            self.message(true)?;
            debug_assert_eq!(Some(&b'}'), self.bytes.get(self.pos));
            self.pos += 1;
            self.tokens[option].index_end = self.tokens.len() - 1;
        }

        if !has_other {
            return Err(self.fail(open, TokenizerErrorKind::MissingOtherOption));
        }
        self.tokens[container].end = self.pos;
        self.patch_container(container);
        Ok(())
    }

    fn push_leaf(&mut self, token_type: TokenType, start: usize, end: usize) -> usize {
        let index = self.tokens.len();
        self.tokens.push(Token {
            token_type,
            start,
            end,
            index_end: index,
        });
        index
    }

    fn patch_container(&mut self, index: usize) {
        self.tokens[index].index_end = self.tokens.len() - 1;
    }

    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    /// Reads an argument/option name: ASCII alphanumerics and underscores.
    fn name(&mut self) -> (usize, usize) {
        let start = self.pos;
        while self.pos < self.bytes.len()
            && (self.bytes[self.pos].is_ascii_alphanumeric() || self.bytes[self.pos] == b'_')
        {
            self.pos += 1;
        }
        (start, self.pos)
    }
}

/// Removes ICU quote escaping from a literal fragment.
pub fn unescape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\'' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('\'') => {
                chars.next();
                out.push('\'');
            }
            Some('{') | Some('}') | Some('#') => {
                while let Some(q) = chars.next() {
                    if q == '\'' {
                        if chars.peek() == Some(&'\'') {
                            chars.next();
                            out.push('\'');
                            continue;
                        }
                        break;
                    }
                    out.push(q);
                }
            }
            _ => out.push('\''),
        }
    }
    out
}

/// Splits a plural-option literal into parts, yielding `"#"` for every
/// unquoted number sign. Quoted `'#'` stays inside its surrounding part.
pub fn plural_literal_parts(s: &str) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'#' => {
                if start < i {
                    parts.push(&s[start..i]);
                }
                parts.push("#");
                i += 1;
                start = i;
            }
            b'\'' => match bytes.get(i + 1) {
                Some(b'\'') => i += 2,
                Some(b'{') | Some(b'}') | Some(b'#') => {
                    i += 2;
                    while i < bytes.len() {
                        if bytes[i] == b'\'' {
                            if bytes.get(i + 1) == Some(&b'\'') {
                                i += 2;
                                continue;
                            }
                            i += 1;
                            break;
                        }
                        i += 1;
                    }
                }
                _ => i += 1,
            },
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        parts.push(&s[start..]);
    }
    parts
}
