use std::collections::BTreeMap;
use std::io::Read;

use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use unic_langid::LanguageIdentifier;

use crate::icumsg;

use super::{File, Message, MessageType, Placeholder, PlaceholderType};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    MalformedJson(String),
    #[error("missing required @@locale")]
    MissingRequiredLocale,
    #[error("invalid @@locale value {value:?}: {reason}")]
    InvalidLocale { value: String, reason: String },
    #[error("invalid @@last_modified format: {0}")]
    InvalidLastModified(String),
    #[error("for key {0:?}: empty ICU message")]
    EmptyIcuMessage(String),
    #[error("invalid ICU message: {0}")]
    InvalidIcuMessage(icumsg::TokenizerError),
    #[error("invalid message type: unsupported message type: {0:?}")]
    InvalidMessageType(String),
    #[error("invalid placeholder type (for key {key:?}): unsupported placeholder type: {value:?}")]
    InvalidPlaceholderType { key: String, value: String },
    #[error("undefined placeholder: {0:?}")]
    UndefinedPlaceholder(String),
}

/// Strict ARB decoder. Holds a reusable ICU token buffer.
#[derive(Debug, Default)]
pub struct Decoder {
    tokenizer: icumsg::Tokenizer,
    buffer: Vec<icumsg::Token>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, reader: impl Read) -> Result<File, DecodeError> {
        let raw: serde_json::Map<String, Value> = serde_json::from_reader(reader)
            .map_err(|e| DecodeError::MalformedJson(e.to_string()))?;

        let get_string = |key: &str| -> Result<String, DecodeError> {
            match raw.get(key) {
                None => Ok(String::new()),
                Some(Value::String(s)) => Ok(s.clone()),
                Some(_) => Err(DecodeError::MalformedJson(format!(
                    "string expected for key {key:?}"
                ))),
            }
        };

        // @@locale is required.
        let locale_str = get_string("@@locale")?;
        if locale_str.is_empty() {
            return Err(DecodeError::MissingRequiredLocale);
        }
        let locale: LanguageIdentifier =
            locale_str
                .parse()
                .map_err(|e| DecodeError::InvalidLocale {
                    value: locale_str.clone(),
                    reason: format!("{e:?}"),
                })?;

        let mut file = File::new(locale);
        file.context = get_string("@@context")?;
        file.author = get_string("@@author")?;
        file.comment = get_string("@@comment")?;

        if let Some(value) = raw.get("@@last_modified") {
            let Value::String(s) = value else {
                return Err(DecodeError::MalformedJson(
                    "string expected for key \"@@last_modified\"".to_owned(),
                ));
            };
            let parsed = OffsetDateTime::parse(s, &Rfc3339)
                .map_err(|e| DecodeError::InvalidLastModified(e.to_string()))?;
            file.last_modified = Some(parsed);
        }

        for (key, value) in &raw {
            if key.starts_with("@@x-") {
                file.custom_attributes.insert(key.clone(), value.clone());
            }
        }

        for (key, value) in &raw {
            if key.starts_with('@') {
                continue; // Metadata keys.
            }
            let Value::String(icu_message) = value else {
                return Err(DecodeError::MalformedJson(format!(
                    "message text expected for key {key:?}"
                )));
            };

            let mut message = Message {
                id: key.clone(),
                icu_message: icu_message.clone(),
                ..Message::default()
            };

            let meta = raw.get(&format!("@{key}"));

            if icu_message.trim().is_empty() {
                // Shell messages written by the reconciler are metadata-only.
                if meta.is_none() {
                    return Err(DecodeError::EmptyIcuMessage(key.clone()));
                }
            } else {
                let buffer = std::mem::take(&mut self.buffer);
                let tokens = self
                    .tokenizer
                    .tokenize(&file.locale, buffer, icu_message)
                    .map_err(DecodeError::InvalidIcuMessage)?;
                message.icu_tokens = tokens.clone();
                self.buffer = tokens;
            }

            if let Some(meta) = meta {
                let Value::Object(meta) = meta else {
                    return Err(DecodeError::MalformedJson(format!(
                        "metadata object expected for key {key:?}"
                    )));
                };
                self.decode_metadata(key, meta, &mut message)?;

                for token in &message.icu_tokens {
                    if token.token_type == icumsg::TokenType::ArgName {
                        let name = token.text(&message.icu_message);
                        if !message.placeholders.contains_key(name) {
                            return Err(DecodeError::UndefinedPlaceholder(name.to_owned()));
                        }
                    }
                }
            }

            file.messages.insert(key.clone(), message);
        }

        Ok(file)
    }

    fn decode_metadata(
        &self,
        key: &str,
        meta: &serde_json::Map<String, Value>,
        message: &mut Message,
    ) -> Result<(), DecodeError> {
        let meta_string = |field: &str| -> Result<String, DecodeError> {
            match meta.get(field) {
                None => Ok(String::new()),
                Some(Value::String(s)) => Ok(s.clone()),
                Some(_) => Err(DecodeError::MalformedJson(format!(
                    "string expected for {field:?} of key {key:?}"
                ))),
            }
        };

        message.description = meta_string("description")?;
        message.comment = meta_string("comment")?;
        message.context = meta_string("context")?;

        let type_str = meta_string("type")?;
        message.message_type = if type_str.is_empty() {
            Some(MessageType::Text) // Default.
        } else {
            Some(
                MessageType::parse(&type_str)
                    .ok_or(DecodeError::InvalidMessageType(type_str))?,
            )
        };

        if let Some(placeholders) = meta.get("placeholders") {
            let Value::Object(placeholders) = placeholders else {
                return Err(DecodeError::MalformedJson(format!(
                    "placeholders object expected for key {key:?}"
                )));
            };
            for (name, value) in placeholders {
                let placeholder = decode_placeholder(name, value)?;
                message.placeholders.insert(name.clone(), placeholder);
            }
        }

        for (name, value) in meta {
            if name.starts_with("x-") {
                message.custom_attributes.insert(name.clone(), value.clone());
            }
        }

        Ok(())
    }
}

fn decode_placeholder(name: &str, value: &Value) -> Result<Placeholder, DecodeError> {
    let Value::Object(fields) = value else {
        return Err(DecodeError::MalformedJson(format!(
            "placeholder object expected for {name:?}"
        )));
    };

    let field_string = |field: &str| -> Result<String, DecodeError> {
        match fields.get(field) {
            None => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(DecodeError::MalformedJson(format!(
                "string expected for {field:?} of placeholder {name:?}"
            ))),
        }
    };

    let mut placeholder = Placeholder {
        description: field_string("description")?,
        example: field_string("example")?,
        format: field_string("format")?,
        ..Placeholder::default()
    };

    let type_str = field_string("type")?;
    if !type_str.is_empty() {
        placeholder.placeholder_type = Some(PlaceholderType::parse(&type_str).ok_or(
            DecodeError::InvalidPlaceholderType {
                key: name.to_owned(),
                value: type_str,
            },
        )?);
    }

    if let Some(value) = fields.get("isCustomDateFormat") {
        match value {
            Value::Bool(b) => placeholder.is_custom_date_format = *b,
            _ => {
                return Err(DecodeError::MalformedJson(format!(
                    "bool expected for \"isCustomDateFormat\" of placeholder {name:?}"
                )));
            }
        }
    }

    if let Some(value) = fields.get("optionalParameters") {
        let Value::Object(params) = value else {
            return Err(DecodeError::MalformedJson(format!(
                "object expected for \"optionalParameters\" of placeholder {name:?}"
            )));
        };
        placeholder.optional_parameters = params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<BTreeMap<_, _>>();
    }

    Ok(placeholder)
}
