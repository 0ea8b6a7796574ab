//! Catalog reconciler: brings the discovered catalogs in line with the
//! scanned texts. New messages are added to the native catalog, propagated
//! to translations as shell messages, unused messages are removed from all
//! catalogs and requested translation locales are created.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::atomic::Ordering;

use time::OffsetDateTime;
use unic_langid::LanguageIdentifier;

use crate::analyzer::is_message_incomplete;
use crate::scan::{Catalog, Scan, Text};
use crate::{arb, icumsg, tik};

/// `x-generator` value stamped into every written catalog.
pub const GENERATOR: &str = "toki";

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("translating TIK ({id}): {source}")]
    Translate {
        id: String,
        source: icumsg::TokenizerError,
    },
}

#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub new_texts: Vec<Text>,
    pub removed_ids: Vec<String>,
    pub created_locales: Vec<LanguageIdentifier>,
}

/// The ARB catalog file name for a locale, canonical BCP-47 tag casing.
pub fn arb_file_name(locale: &LanguageIdentifier) -> String {
    format!("catalog_{locale}.arb")
}

/// Stamps the generator metadata every written catalog carries.
pub fn set_arb_metadata(file: &mut arb::File, version: &str) {
    file.custom_attributes
        .insert("@@x-generator".to_owned(), GENERATOR.into());
    file.custom_attributes
        .insert("@@x-generator-version".to_owned(), version.into());
}

pub struct Reconciler<'a> {
    pub version: &'a str,
    pub now: OffsetDateTime,
}

impl<'a> Reconciler<'a> {
    /// Reconciles the scan's catalogs in place. `bundle_dir` provides the
    /// path for catalogs synthesised along the way; `translations` are the
    /// locales requested via configuration.
    pub fn reconcile(
        &self,
        scan: &Scan,
        bundle_dir: &Path,
        translations: &[LanguageIdentifier],
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let mut outcome = ReconcileOutcome::default();

        // Discovered IDs in first-occurrence order.
        let mut ids: Vec<(String, usize)> = scan
            .text_index_by_id
            .access(|index| index.iter().map(|(k, v)| (k.clone(), *v)).collect());
        ids.sort_by_key(|(_, index)| *index);

        scan.catalogs.access(|catalogs| {
            let native = self.ensure_native_catalog(scan, bundle_dir, catalogs);

            // New messages, native first, then shell propagation.
            for (id, index) in &ids {
                let text = scan.texts.at(*index);
                if !catalogs[native].arb.messages.contains_key(id) {
                    let message = self.new_arb_message(&scan.default_locale, &text)?;
                    log::debug!("new TIK at {} ({id})", text.position);
                    if is_message_incomplete(
                        scan,
                        &scan.default_locale,
                        &arb_file_name(&scan.default_locale),
                        &message,
                    ) {
                        catalogs[native]
                            .messages_incomplete
                            .fetch_add(1, Ordering::Relaxed);
                    }
                    catalogs[native].arb.messages.insert(id.clone(), message);
                    outcome.new_texts.push(text.clone());
                }
                for (i, catalog) in catalogs.iter_mut().enumerate() {
                    if i == native || catalog.arb.messages.contains_key(id) {
                        continue;
                    }
                    log::warn!(
                        "message missing in catalog {}: {id}",
                        catalog.arb.locale
                    );
                    let text = scan.texts.at(*index);
                    let mut shell = self.new_arb_message(&scan.default_locale, &text)?;
                    // Translation is left to humans.
                    shell.icu_message = String::new();
                    shell.icu_tokens = Vec::new();
                    catalog
                        .messages_incomplete
                        .fetch_add(1, Ordering::Relaxed);
                    catalog.arb.messages.insert(id.clone(), shell);
                }
            }

            // Remove messages no discovered text refers to.
            let native_removed: Vec<String> = catalogs[native]
                .arb
                .messages
                .keys()
                .filter(|id| scan.text_index_by_id.get(id).is_none())
                .cloned()
                .collect();
            for catalog in catalogs.iter_mut() {
                catalog
                    .arb
                    .messages
                    .retain(|id, _| scan.text_index_by_id.get(id).is_some());
            }
            for id in &native_removed {
                log::debug!("unused message removed: {id}");
            }
            outcome.removed_ids = native_removed;

            // Create requested translation locales that have no catalog.
            for locale in translations {
                if *locale == scan.default_locale
                    || catalogs.iter().any(|c| c.arb.locale == *locale)
                {
                    continue;
                }
                log::info!("generate new catalog for locale {locale}");
                let mut file = catalogs[native].arb.copy_with(|message| {
                    message.icu_message = String::new();
                    message.icu_tokens = Vec::new();
                });
                file.locale = locale.clone();
                file.last_modified = Some(self.now);
                set_arb_metadata(&mut file, self.version);
                let message_count = file.messages.len() as i64;
                let catalog = Catalog::new(file, bundle_dir.join(arb_file_name(locale)));
                catalog
                    .messages_incomplete
                    .store(message_count, Ordering::Relaxed);
                catalogs.push(catalog);
                outcome.created_locales.push(locale.clone());
            }

            Ok(())
        })?;

        Ok(outcome)
    }

    /// Returns the index of the native catalog,
    /// synthesising an empty one when absent.
    fn ensure_native_catalog(
        &self,
        scan: &Scan,
        bundle_dir: &Path,
        catalogs: &mut Vec<Catalog>,
    ) -> usize {
        if let Some(index) = catalogs
            .iter()
            .position(|c| c.arb.locale == scan.default_locale)
        {
            return index;
        }
        let mut file = arb::File::new(scan.default_locale.clone());
        file.last_modified = Some(self.now);
        set_arb_metadata(&mut file, self.version);
        let path = bundle_dir.join(arb_file_name(&scan.default_locale));
        catalogs.push(Catalog::new(file, path));
        catalogs.len() - 1
    }

    /// Synthesises the native ARB message for a discovered text.
    fn new_arb_message(
        &self,
        locale: &LanguageIdentifier,
        text: &Text,
    ) -> Result<arb::Message, ReconcileError> {
        let icu_message = tik::tik_to_icu(&text.tik);
        let icu_tokens = icumsg::Tokenizer::default()
            .tokenize(locale, Vec::new(), &icu_message)
            .map_err(|source| ReconcileError::Translate {
                id: text.id_hash.clone(),
                source,
            })?;

        let mut message = arb::Message {
            id: text.id_hash.clone(),
            icu_message,
            icu_tokens,
            description: text.comments.join(" "),
            message_type: Some(arb::MessageType::Text),
            context: text.context().unwrap_or_default().to_owned(),
            ..arb::Message::default()
        };

        for (i, placeholder) in text.tik.placeholders().enumerate() {
            let mut name = String::new();
            let _ = write!(name, "var{i}");
            let mut entry = arb::Placeholder::default();
            match placeholder.token_type {
                tik::TokenType::Text => {
                    entry.description = "arbitrary string".to_owned();
                    entry.placeholder_type = Some(arb::PlaceholderType::String);
                }
                tik::TokenType::TextWithGender => {
                    entry.description = "arbitrary string with gender information".to_owned();
                    entry.placeholder_type = Some(arb::PlaceholderType::String);
                    // The wrapping select argument needs its own entry.
                    let gender = arb::Placeholder {
                        description: "gender of the referenced person".to_owned(),
                        placeholder_type: Some(arb::PlaceholderType::String),
                        ..arb::Placeholder::default()
                    };
                    message.placeholders.insert(format!("{name}_gender"), gender);
                }
                tik::TokenType::CardinalPluralStart => {
                    entry.description = "cardinal plural".to_owned();
                    entry.placeholder_type = Some(arb::PlaceholderType::Num);
                    entry.example = "2".to_owned();
                }
                tik::TokenType::OrdinalPlural => {
                    entry.description = "ordinal plural".to_owned();
                    entry.placeholder_type = Some(arb::PlaceholderType::Num);
                    entry.example = "4".to_owned();
                }
                tik::TokenType::DateFull
                | tik::TokenType::DateLong
                | tik::TokenType::DateMedium
                | tik::TokenType::DateShort => {
                    entry.description = "date".to_owned();
                    entry.placeholder_type = Some(arb::PlaceholderType::DateTime);
                    entry.is_custom_date_format = true;
                }
                tik::TokenType::TimeFull
                | tik::TokenType::TimeLong
                | tik::TokenType::TimeMedium
                | tik::TokenType::TimeShort => {
                    entry.description = "time".to_owned();
                    entry.placeholder_type = Some(arb::PlaceholderType::DateTime);
                    entry.is_custom_date_format = true;
                }
                tik::TokenType::Currency => {
                    entry.description = "currency with amount".to_owned();
                    entry.placeholder_type = Some(arb::PlaceholderType::Num);
                    entry.example = "USD(4.00)".to_owned();
                }
                _ => {}
            }
            message.placeholders.insert(name, entry);
        }

        Ok(message)
    }
}
