use std::fmt::Write;

use unic_langid::LanguageIdentifier;

use crate::cldr::{self, PluralCategory};

use super::{Token, TokenType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsPresencePolicy {
    Optional,
    Required,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionUnknownPolicy {
    Allow,
    Reject,
}

/// Policy for a `select` argument, supplied per argument name.
#[derive(Debug, Clone)]
pub struct SelectPolicy {
    pub options: Vec<String>,
    pub presence: OptionsPresencePolicy,
    pub unknown: OptionUnknownPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    PluralMissingOptions {
        token_index: usize,
        missing: Vec<String>,
    },
    SelectMissingOptions {
        token_index: usize,
        missing: Vec<String>,
    },
    SelectInvalidOption {
        token_index_argument: usize,
        token_index_option: usize,
    },
}

/// Yields the indices of the option tokens directly inside a container.
pub fn options(tokens: &[Token], container: usize) -> impl Iterator<Item = usize> + '_ {
    let container_end = tokens[container].index_end;
    let mut i = container + 2; // skip the ArgName token
    if tokens.get(i).map(|t| t.token_type) == Some(TokenType::PluralOffset) {
        i += 1;
    }
    std::iter::from_fn(move || {
        while i <= container_end {
            let index = i;
            i = tokens[index].index_end + 1;
            if tokens[index].token_type.is_option() {
                return Some(index);
            }
        }
        None
    })
}

/// Analyses a tokenized message against the locale's plural rules and the
/// select-option policy. Classification is additive across nested
/// containers; errors are reported innermost-first.
pub fn errors(
    locale: &LanguageIdentifier,
    raw: &str,
    tokens: &[Token],
    select_policy: &dyn Fn(&str) -> Option<SelectPolicy>,
) -> Vec<AnalysisError> {
    let (cardinal, ordinal) = cldr::locale_plural_rules(locale);
    let mut found: Vec<(usize, AnalysisError)> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        match token.token_type {
            TokenType::Plural | TokenType::SelectOrdinal => {
                let required = if token.token_type == TokenType::Plural {
                    cardinal
                } else {
                    ordinal
                };
                let mut present = cldr::PluralRuleSet::default();
                for option in options(tokens, i) {
                    if let Some(category) = option_category(tokens[option].token_type) {
                        present.insert(category);
                    }
                }
                let missing: Vec<String> = required
                    .iter()
                    .filter(|c| *c != PluralCategory::Other && !present.contains(*c))
                    .map(|c| c.as_str().to_owned())
                    .collect();
                if !missing.is_empty() {
                    found.push((
                        token.index_end,
                        AnalysisError::PluralMissingOptions {
                            token_index: i,
                            missing,
                        },
                    ));
                }
            }
            TokenType::Select => {
                let arg_name = tokens[i + 1].text(raw);
                let Some(policy) = select_policy(arg_name) else {
                    continue;
                };
                let mut present: Vec<&str> = Vec::new();
                for option in options(tokens, i) {
                    let option_token = &tokens[option];
                    match option_token.token_type {
                        TokenType::OptionOther => present.push("other"),
                        TokenType::OptionNamed => {
                            let name = option_token.text(raw);
                            present.push(name);
                            if policy.unknown == OptionUnknownPolicy::Reject
                                && !policy.options.iter().any(|o| o == name)
                            {
                                found.push((
                                    option_token.index_end,
                                    AnalysisError::SelectInvalidOption {
                                        token_index_argument: i,
                                        token_index_option: option,
                                    },
                                ));
                            }
                        }
                        _ => {}
                    }
                }
                if policy.presence == OptionsPresencePolicy::Required {
                    let missing: Vec<String> = policy
                        .options
                        .iter()
                        .filter(|o| !present.contains(&o.as_str()))
                        .cloned()
                        .collect();
                    if !missing.is_empty() {
                        found.push((
                            token.index_end,
                            AnalysisError::SelectMissingOptions {
                                token_index: i,
                                missing,
                            },
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    // Innermost containers end first; stable sort keeps document order
    // between siblings.
    found.sort_by_key(|(end, _)| *end);
    found.into_iter().map(|(_, e)| e).collect()
}

fn option_category(token_type: TokenType) -> Option<PluralCategory> {
    match token_type {
        TokenType::OptionZero => Some(PluralCategory::Zero),
        TokenType::OptionOne => Some(PluralCategory::One),
        TokenType::OptionTwo => Some(PluralCategory::Two),
        TokenType::OptionFew => Some(PluralCategory::Few),
        TokenType::OptionMany => Some(PluralCategory::Many),
        TokenType::OptionOther => Some(PluralCategory::Other),
        _ => None,
    }
}

/// Runs the analysis and dispatches each finding to the given callbacks:
/// `on_incomplete(container_index)` for messages that need more branches,
/// `on_rejected(container_index, option_index)` for unsupported options.
pub fn analyze(
    locale: &LanguageIdentifier,
    raw: &str,
    tokens: &[Token],
    select_policy: &dyn Fn(&str) -> Option<SelectPolicy>,
    on_incomplete: &mut dyn FnMut(usize),
    on_rejected: &mut dyn FnMut(usize, usize),
) {
    for error in errors(locale, raw, tokens, select_policy) {
        match error {
            AnalysisError::PluralMissingOptions { token_index, .. }
            | AnalysisError::SelectMissingOptions { token_index, .. } => {
                on_incomplete(token_index);
            }
            AnalysisError::SelectInvalidOption {
                token_index_argument,
                token_index_option,
            } => on_rejected(token_index_argument, token_index_option),
        }
    }
}

/// A human-readable report of everything keeping the message incomplete.
pub fn analysis_report(
    locale: &LanguageIdentifier,
    raw: &str,
    tokens: &[Token],
    select_policy: &dyn Fn(&str) -> Option<SelectPolicy>,
) -> Vec<String> {
    let mut report = Vec::new();
    for error in errors(locale, raw, tokens, select_policy) {
        match error {
            AnalysisError::PluralMissingOptions {
                token_index,
                missing,
            }
            | AnalysisError::SelectMissingOptions {
                token_index,
                missing,
            } => {
                let arg_name = tokens[token_index + 1].text(raw);
                let mut line = String::new();
                let _ = write!(line, "Argument {arg_name:?} is missing options [");
                line.push_str(&missing.join(","));
                line.push(']');
                report.push(line);
            }
            AnalysisError::SelectInvalidOption {
                token_index_argument,
                token_index_option,
            } => {
                let arg_name = tokens[token_index_argument + 1].text(raw);
                let option = tokens[token_index_option].text(raw);
                report.push(format!(
                    "Argument {arg_name:?}: invalid select option {option:?}"
                ));
            }
        }
    }
    report
}
