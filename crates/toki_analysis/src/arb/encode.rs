use std::io::{self, Write};

use serde_json::Value;
use time::format_description::well_known::Rfc3339;

use super::File;

/// Encodes an ARB file with deterministic ordering: global metadata first in
/// a fixed order, then messages sorted by ID; message metadata keys in the
/// order type, description, comment, context, placeholders, custom
/// attributes; placeholders sorted by name. `indent` is caller-supplied.
pub fn encode(writer: &mut dyn Write, file: &File, indent: &str) -> io::Result<()> {
    let mut entries: Vec<(String, Value)> = Vec::new();

    entries.push(("@@locale".to_owned(), file.locale.to_string().into()));
    if let Some(last_modified) = file.last_modified {
        let stamp = last_modified
            .format(&Rfc3339)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        entries.push(("@@last_modified".to_owned(), stamp.into()));
    }
    if !file.context.is_empty() {
        entries.push(("@@context".to_owned(), file.context.clone().into()));
    }
    if !file.author.is_empty() {
        entries.push(("@@author".to_owned(), file.author.clone().into()));
    }
    if !file.comment.is_empty() {
        entries.push(("@@comment".to_owned(), file.comment.clone().into()));
    }
    for (key, value) in &file.custom_attributes {
        if key.starts_with("@@x-") {
            entries.push((key.clone(), value.clone()));
        }
    }

    for (id, message) in &file.messages {
        entries.push((id.clone(), message.icu_message.clone().into()));
        if !message.has_metadata() {
            continue;
        }

        let mut meta = serde_json::Map::new();
        if let Some(message_type) = message.message_type {
            meta.insert("type".to_owned(), message_type.as_str().into());
        }
        if !message.description.is_empty() {
            meta.insert("description".to_owned(), message.description.clone().into());
        }
        if !message.comment.is_empty() {
            meta.insert("comment".to_owned(), message.comment.clone().into());
        }
        if !message.context.is_empty() {
            meta.insert("context".to_owned(), message.context.clone().into());
        }
        if !message.placeholders.is_empty() {
            let mut placeholders = serde_json::Map::new();
            for (name, placeholder) in &message.placeholders {
                let mut fields = serde_json::Map::new();
                if let Some(placeholder_type) = placeholder.placeholder_type {
                    fields.insert("type".to_owned(), placeholder_type.as_str().into());
                }
                if !placeholder.description.is_empty() {
                    fields.insert(
                        "description".to_owned(),
                        placeholder.description.clone().into(),
                    );
                }
                if !placeholder.example.is_empty() {
                    fields.insert("example".to_owned(), placeholder.example.clone().into());
                }
                if !placeholder.format.is_empty() {
                    fields.insert("format".to_owned(), placeholder.format.clone().into());
                }
                if placeholder.is_custom_date_format {
                    fields.insert("isCustomDateFormat".to_owned(), true.into());
                }
                if !placeholder.optional_parameters.is_empty() {
                    let params: serde_json::Map<String, Value> = placeholder
                        .optional_parameters
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                    fields.insert("optionalParameters".to_owned(), params.into());
                }
                placeholders.insert(name.clone(), fields.into());
            }
            meta.insert("placeholders".to_owned(), placeholders.into());
        }
        for (key, value) in &message.custom_attributes {
            if key.starts_with("x-") {
                meta.insert(key.clone(), value.clone());
            }
        }
        entries.push((format!("@{id}"), meta.into()));
    }

    writer.write_all(b"{\n")?;
    let total = entries.len();
    for (i, (key, value)) in entries.into_iter().enumerate() {
        let key_json = serde_json::to_string(&key)?;
        let value_json = pretty_with_indent(&value, indent)?;

        writer.write_all(indent.as_bytes())?;
        writer.write_all(key_json.as_bytes())?;
        writer.write_all(b": ")?;
        let mut lines = value_json.lines();
        if let Some(first) = lines.next() {
            writer.write_all(first.as_bytes())?;
        }
        for line in lines {
            writer.write_all(b"\n")?;
            writer.write_all(indent.as_bytes())?;
            writer.write_all(line.as_bytes())?;
        }
        if i < total - 1 {
            writer.write_all(b",\n")?;
        } else {
            writer.write_all(b"\n")?;
        }
    }
    writer.write_all(b"}\n")?;
    Ok(())
}

fn pretty_with_indent(value: &Value, indent: &str) -> io::Result<String> {
    use serde::Serialize;
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
