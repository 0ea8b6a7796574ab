use super::{Tik, Token, TokenType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("empty TIK")]
    Empty,
    #[error("unknown placeholder")]
    UnknownPlaceholder,
    #[error("unterminated placeholder")]
    UnterminatedPlaceholder,
    #[error("nested placeholder")]
    NestedPlaceholder,
    #[error("unterminated context")]
    UnterminatedContext,
    #[error("unexpected '[' outside context position")]
    UnexpectedBracket,
    #[error("unexpected '}}'")]
    UnexpectedClosingBrace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("at index {index}: {kind}")]
pub struct ParseError {
    pub index: usize,
    pub kind: ParseErrorKind,
}

fn err(index: usize, kind: ParseErrorKind) -> ParseError {
    ParseError { index, kind }
}

/// Parses a TIK source string into its token sequence.
pub fn parse(src: &str) -> Result<Tik, ParseError> {
    if src.is_empty() {
        return Err(err(0, ParseErrorKind::Empty));
    }

    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    // Optional leading context token.
    if bytes[0] == b'[' {
        let close = src
            .find(']')
            .ok_or_else(|| err(0, ParseErrorKind::UnterminatedContext))?;
        tokens.push(Token {
            token_type: TokenType::Context,
            start: 1,
            end: close,
        });
        i = close + 1;
    }

    let mut literal_start = i;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                if literal_start < i {
                    tokens.push(Token {
                        token_type: TokenType::Literal,
                        start: literal_start,
                        end: i,
                    });
                }
                let token = parse_placeholder(src, i)?;
                i = token.1;
                tokens.push(token.0);
                literal_start = i;
            }
            b'[' => return Err(err(i, ParseErrorKind::UnexpectedBracket)),
            b'}' => return Err(err(i, ParseErrorKind::UnexpectedClosingBrace)),
            _ => i += 1,
        }
    }
    if literal_start < bytes.len() {
        tokens.push(Token {
            token_type: TokenType::Literal,
            start: literal_start,
            end: bytes.len(),
        });
    }

    Ok(Tik {
        raw: src.to_owned(),
        tokens,
    })
}

/// Parses the placeholder starting at the `{` at byte `open`.
/// Returns the token and the index just past the closing `}`.
fn parse_placeholder(src: &str, open: usize) -> Result<(Token, usize), ParseError> {
    let bytes = src.as_bytes();
    let mut close = open + 1;
    while close < bytes.len() {
        match bytes[close] {
            b'}' => break,
            b'{' => return Err(err(close, ParseErrorKind::NestedPlaceholder)),
            _ => close += 1,
        }
    }
    if close >= bytes.len() {
        return Err(err(open, ParseErrorKind::UnterminatedPlaceholder));
    }

    let content = &src[open + 1..close];
    if content == "#" || content.starts_with("# ") {
        // Cardinal plural: the token covers the brace interior so the
        // trailing literal travels with it into the ICU lowering.
        return Ok((
            Token {
                token_type: TokenType::CardinalPluralStart,
                start: open + 1,
                end: close,
            },
            close + 1,
        ));
    }

    let token_type = match content {
        "text" => TokenType::Text,
        "text-gender" => TokenType::TextWithGender,
        "integer" => TokenType::Integer,
        "number" => TokenType::Number,
        "ordinal" => TokenType::OrdinalPlural,
        "date-full" => TokenType::DateFull,
        "date-long" => TokenType::DateLong,
        "date-medium" => TokenType::DateMedium,
        "date-short" => TokenType::DateShort,
        "time-full" => TokenType::TimeFull,
        "time-long" => TokenType::TimeLong,
        "time-medium" => TokenType::TimeMedium,
        "time-short" => TokenType::TimeShort,
        "currency" => TokenType::Currency,
        _ => return Err(err(open, ParseErrorKind::UnknownPlaceholder)),
    };
    Ok((
        Token {
            token_type,
            start: open,
            end: close + 1,
        },
        close + 1,
    ))
}
