//! CLDR plural-rule access.
//!
//! Wraps the ICU4X plural-rule tables behind the small contract the rest of
//! the toolchain needs: the set of plural categories a locale requires,
//! for cardinals and ordinals. `other` is always present.

use icu_plurals::{PluralRuleType, PluralRules};
use unic_langid::LanguageIdentifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    /// All categories in canonical CLDR order.
    pub const ALL: [PluralCategory; 6] = [
        PluralCategory::Zero,
        PluralCategory::One,
        PluralCategory::Two,
        PluralCategory::Few,
        PluralCategory::Many,
        PluralCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PluralCategory::Zero => "zero",
            PluralCategory::One => "one",
            PluralCategory::Two => "two",
            PluralCategory::Few => "few",
            PluralCategory::Many => "many",
            PluralCategory::Other => "other",
        }
    }

    fn bit(&self) -> u8 {
        match self {
            PluralCategory::Zero => 1,
            PluralCategory::One => 1 << 1,
            PluralCategory::Two => 1 << 2,
            PluralCategory::Few => 1 << 3,
            PluralCategory::Many => 1 << 4,
            PluralCategory::Other => 1 << 5,
        }
    }
}

/// A bitset over the six CLDR plural categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PluralRuleSet {
    bits: u8,
}

impl PluralRuleSet {
    pub fn only_other() -> Self {
        let mut s = Self::default();
        s.insert(PluralCategory::Other);
        s
    }

    pub fn insert(&mut self, category: PluralCategory) {
        self.bits |= category.bit();
    }

    pub fn contains(&self, category: PluralCategory) -> bool {
        self.bits & category.bit() != 0
    }

    pub fn is_only_other(&self) -> bool {
        *self == Self::only_other()
    }

    /// Categories present in this set, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = PluralCategory> + '_ {
        PluralCategory::ALL
            .into_iter()
            .filter(|c| self.contains(*c))
    }
}

impl FromIterator<PluralCategory> for PluralRuleSet {
    fn from_iter<I: IntoIterator<Item = PluralCategory>>(iter: I) -> Self {
        let mut s = Self::default();
        for c in iter {
            s.insert(c);
        }
        s
    }
}

/// Returns the plural categories the locale requires,
/// for cardinals and ordinals respectively.
pub fn locale_plural_rules(locale: &LanguageIdentifier) -> (PluralRuleSet, PluralRuleSet) {
    (
        rule_set(locale, PluralRuleType::Cardinal),
        rule_set(locale, PluralRuleType::Ordinal),
    )
}

fn rule_set(locale: &LanguageIdentifier, rule_type: PluralRuleType) -> PluralRuleSet {
    let parsed: Result<icu_locid::Locale, _> = locale.to_string().parse();
    let mut set = match parsed {
        Ok(icu_locale) => match PluralRules::try_new(&icu_locale.into(), rule_type) {
            Ok(rules) => rules
                .categories()
                .map(|c| match c {
                    icu_plurals::PluralCategory::Zero => PluralCategory::Zero,
                    icu_plurals::PluralCategory::One => PluralCategory::One,
                    icu_plurals::PluralCategory::Two => PluralCategory::Two,
                    icu_plurals::PluralCategory::Few => PluralCategory::Few,
                    icu_plurals::PluralCategory::Many => PluralCategory::Many,
                    icu_plurals::PluralCategory::Other => PluralCategory::Other,
                })
                .collect(),
            Err(_) => PluralRuleSet::default(),
        },
        Err(_) => PluralRuleSet::default(),
    };
    set.insert(PluralCategory::Other);
    set
}

#[cfg(test)]
mod test {
    use super::*;

    fn langid(s: &str) -> LanguageIdentifier {
        s.parse().unwrap()
    }

    #[test]
    fn test_english_cardinal_requires_one() {
        let (cardinal, _) = locale_plural_rules(&langid("en"));
        assert!(cardinal.contains(PluralCategory::One));
        assert!(cardinal.contains(PluralCategory::Other));
        assert!(!cardinal.is_only_other());
    }

    #[test]
    fn test_english_ordinal_requires_one_two_few() {
        let (_, ordinal) = locale_plural_rules(&langid("en"));
        for c in [
            PluralCategory::One,
            PluralCategory::Two,
            PluralCategory::Few,
            PluralCategory::Other,
        ] {
            assert!(ordinal.contains(c), "missing {c:?}");
        }
    }

    #[test]
    fn test_japanese_only_other() {
        let (cardinal, ordinal) = locale_plural_rules(&langid("ja"));
        assert!(cardinal.is_only_other());
        assert!(ordinal.is_only_other());
    }

    #[test]
    fn test_russian_cardinal() {
        let (cardinal, _) = locale_plural_rules(&langid("ru"));
        let required: Vec<_> = cardinal.iter().collect();
        assert_eq!(
            vec![
                PluralCategory::One,
                PluralCategory::Few,
                PluralCategory::Many,
                PluralCategory::Other,
            ],
            required
        );
    }

    #[test]
    fn test_welsh_cardinal_has_all_categories() {
        let (cardinal, _) = locale_plural_rules(&langid("cy"));
        assert_eq!(6, cardinal.iter().count());
    }

    #[test]
    fn test_unknown_locale_defaults_to_other() {
        let (cardinal, ordinal) = locale_plural_rules(&langid("zz"));
        assert!(cardinal.contains(PluralCategory::Other));
        assert!(ordinal.contains(PluralCategory::Other));
    }
}
