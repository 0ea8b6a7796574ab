use unic_langid::LanguageIdentifier;

/// Lower-cased locale with `-` mapped to `_`, usable in module names:
/// `en-US` → `en_us`.
pub fn locale_snake(locale: &LanguageIdentifier) -> String {
    locale.to_string().to_lowercase().replace('-', "_")
}

/// Camel-cased locale usable in type names: `en-US` → `EnUs`.
pub fn locale_camel(locale: &LanguageIdentifier) -> String {
    locale_snake(locale)
        .split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Generated dispatch file name for a catalog: `catalog_en_us_gen.rs`.
pub fn catalog_file_name(locale: &LanguageIdentifier) -> String {
    format!("catalog_{}_gen.rs", locale_snake(locale))
}
