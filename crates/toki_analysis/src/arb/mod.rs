//! ARB (Application Resource Bundle) catalog codec.
//!
//! See <https://github.com/google/app-resource-bundle>. Decoding is strict;
//! encoding is deterministic: global metadata first in a fixed order, then
//! messages sorted by ID, placeholders within a message sorted by name.

mod decode;
mod encode;

#[cfg(test)]
mod test;

use std::collections::BTreeMap;

use time::OffsetDateTime;
use unic_langid::LanguageIdentifier;

use crate::icumsg;

pub use decode::{DecodeError, Decoder};
pub use encode::encode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Text,
    Image,
    Css,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::Css => "css",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(MessageType::Text),
            "image" => Some(MessageType::Image),
            "css" => Some(MessageType::Css),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderType {
    String,
    Int,
    Double,
    Num,
    DateTime,
}

impl PlaceholderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderType::String => "String",
            PlaceholderType::Int => "int",
            PlaceholderType::Double => "double",
            PlaceholderType::Num => "num",
            PlaceholderType::DateTime => "DateTime",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "String" => Some(PlaceholderType::String),
            "int" => Some(PlaceholderType::Int),
            "double" => Some(PlaceholderType::Double),
            "num" => Some(PlaceholderType::Num),
            "DateTime" => Some(PlaceholderType::DateTime),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Placeholder {
    pub placeholder_type: Option<PlaceholderType>,
    pub description: String,
    pub example: String,
    /// For DateTime or numbers.
    pub format: String,
    pub is_custom_date_format: bool,
    pub optional_parameters: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    pub id: String,
    pub icu_message: String,
    /// Empty for shell messages awaiting translation.
    pub icu_tokens: Vec<icumsg::Token>,
    pub description: String,
    pub comment: String,
    /// `None` when the message carries no metadata at all;
    /// defaults to [`MessageType::Text`] otherwise.
    pub message_type: Option<MessageType>,
    pub context: String,
    pub placeholders: BTreeMap<String, Placeholder>,
    pub custom_attributes: BTreeMap<String, serde_json::Value>,
}

impl Message {
    pub fn has_metadata(&self) -> bool {
        !self.description.is_empty()
            || !self.comment.is_empty()
            || self.message_type.is_some()
            || !self.context.is_empty()
            || !self.placeholders.is_empty()
            || !self.custom_attributes.is_empty()
    }
}

/// An ARB (Application Resource Bundle) file.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub locale: LanguageIdentifier,
    /// `@@context`
    pub context: String,
    /// `@@last_modified`
    pub last_modified: Option<OffsetDateTime>,
    /// `@@author`
    pub author: String,
    /// `@@comment`
    pub comment: String,
    /// `@@x-…` attributes, preserved verbatim.
    pub custom_attributes: BTreeMap<String, serde_json::Value>,
    pub messages: BTreeMap<String, Message>,
}

impl File {
    pub fn new(locale: LanguageIdentifier) -> Self {
        Self {
            locale,
            context: String::new(),
            last_modified: None,
            author: String::new(),
            comment: String::new(),
            custom_attributes: BTreeMap::new(),
            messages: BTreeMap::new(),
        }
    }

    /// Returns a copy with every message passed through `adjust`.
    pub fn copy_with(&self, adjust: impl Fn(&mut Message)) -> Self {
        let mut copy = self.clone();
        for message in copy.messages.values_mut() {
            adjust(message);
        }
        copy
    }
}
