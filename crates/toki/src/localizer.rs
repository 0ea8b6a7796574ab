use std::collections::HashMap;

use fluent_langneg::{NegotiationStrategy, negotiate_languages};
use unic_langid::LanguageIdentifier;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BundleError {
    #[error("bundle has no catalogs")]
    EmptyBundle,
    #[error("conflicting readers for {0}")]
    ReaderConflict(LanguageIdentifier),
}

/// How well a matched reader fits the requested locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Confidence {
    /// No requested locale matched; the default reader was returned.
    No,
    Low,
    High,
    /// A requested locale matched a catalog exactly.
    Exact,
}

/// Localizer selects the best available reader for requested locales.
///
/// `R` is whatever handle the generated bundle dispatches through,
/// typically `&'static dyn Reader`.
pub struct Localizer<R> {
    locales: Vec<LanguageIdentifier>,
    readers: Vec<R>,
    default_locale: String,
    index_by_locale: HashMap<String, usize>,
}

impl<R: Copy> Localizer<R> {
    pub fn new(
        default_locale: LanguageIdentifier,
        catalogs: impl IntoIterator<Item = (LanguageIdentifier, R)>,
    ) -> Result<Self, BundleError> {
        let mut locales = Vec::new();
        let mut readers = Vec::new();
        let mut index_by_locale = HashMap::new();
        for (locale, reader) in catalogs {
            let key = locale.to_string();
            if index_by_locale.contains_key(&key) {
                return Err(BundleError::ReaderConflict(locale));
            }
            index_by_locale.insert(key, readers.len());
            locales.push(locale);
            readers.push(reader);
        }
        if readers.is_empty() {
            return Err(BundleError::EmptyBundle);
        }
        Ok(Self {
            locales,
            readers,
            default_locale: default_locale.to_string(),
            index_by_locale,
        })
    }

    /// Returns the best matching reader for the requested locales.
    ///
    /// The negotiated tag's parent chain is walked until a catalog is found;
    /// without any match the default reader is returned with
    /// [`Confidence::No`].
    pub fn match_locales(&self, requested: &[LanguageIdentifier]) -> (R, Confidence) {
        let matched = negotiate_languages(
            requested,
            &self.locales,
            None,
            NegotiationStrategy::Filtering,
        );
        if let Some(best) = matched.first() {
            let mut tag: LanguageIdentifier = (*best).clone();
            loop {
                if let Some(&index) = self.index_by_locale.get(&tag.to_string()) {
                    return (self.readers[index], self.confidence(requested, &tag));
                }
                if !pop_parent(&mut tag) {
                    break;
                }
            }
        }
        (self.default(), Confidence::No)
    }

    fn confidence(&self, requested: &[LanguageIdentifier], matched: &LanguageIdentifier) -> Confidence {
        if requested.iter().any(|r| r == matched) {
            return Confidence::Exact;
        }
        if requested.iter().any(|r| r.language == matched.language) {
            return Confidence::High;
        }
        Confidence::Low
    }

    /// Returns the reader for the given base language,
    /// or the default reader if none exists.
    pub fn for_base(&self, language: unic_langid::subtags::Language) -> R {
        match self.index_by_locale.get(language.as_str()) {
            Some(&index) => self.readers[index],
            None => self.default(),
        }
    }

    /// Returns the reader for the default locale.
    pub fn default(&self) -> R {
        let index = self.index_by_locale[&self.default_locale];
        self.readers[index]
    }

    /// All locales of the bundle.
    pub fn locales(&self) -> &[LanguageIdentifier] {
        &self.locales
    }

    /// All available readers.
    pub fn readers(&self) -> &[R] {
        &self.readers
    }
}

/// Truncates the tag one step towards its parent.
/// Returns false once the tag is already a bare language.
fn pop_parent(tag: &mut LanguageIdentifier) -> bool {
    if tag.variants().next().is_some() {
        tag.clear_variants();
        return true;
    }
    if tag.region.is_some() {
        tag.region = None;
        return true;
    }
    if tag.script.is_some() {
        tag.script = None;
        return true;
    }
    false
}

#[cfg(test)]
mod test {
    use super::*;

    fn langid(s: &str) -> LanguageIdentifier {
        s.parse().unwrap()
    }

    fn localizer() -> Localizer<&'static str> {
        Localizer::new(
            langid("en"),
            vec![
                (langid("en"), "en"),
                (langid("de"), "de"),
                (langid("uk"), "uk"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_match_exact() {
        let l = localizer();
        let (reader, confidence) = l.match_locales(&[langid("de")]);
        assert_eq!("de", reader);
        assert_eq!(Confidence::Exact, confidence);
    }

    #[test]
    fn test_match_parent_chain() {
        let l = localizer();
        let (reader, confidence) = l.match_locales(&[langid("de-CH")]);
        assert_eq!("de", reader);
        assert!(confidence > Confidence::No);
    }

    #[test]
    fn test_match_fallback_to_default() {
        let l = localizer();
        let (reader, confidence) = l.match_locales(&[langid("ja")]);
        assert_eq!("en", reader);
        assert_eq!(Confidence::No, confidence);
    }

    #[test]
    fn test_default_and_accessors() {
        let l = localizer();
        assert_eq!("en", l.default());
        assert_eq!(3, l.locales().len());
        assert_eq!(3, l.readers().len());
        assert_eq!("uk", l.for_base(langid("uk").language));
        assert_eq!("en", l.for_base(langid("fr").language));
    }

    #[test]
    fn test_empty_bundle() {
        let result = Localizer::<&str>::new(langid("en"), vec![]);
        assert!(matches!(result, Err(BundleError::EmptyBundle)));
    }

    #[test]
    fn test_reader_conflict() {
        let result = Localizer::new(
            langid("en"),
            vec![(langid("en"), "a"), (langid("en"), "b")],
        );
        assert!(matches!(result, Err(BundleError::ReaderConflict(_))));
    }
}
