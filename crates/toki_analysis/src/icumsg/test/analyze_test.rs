use unic_langid::LanguageIdentifier;

use crate::icumsg::*;

fn langid(s: &str) -> LanguageIdentifier {
    s.parse().unwrap()
}

fn gender_policy(arg_name: &str) -> Option<SelectPolicy> {
    if arg_name.ends_with("_gender") {
        return Some(SelectPolicy {
            options: vec!["male".to_owned(), "female".to_owned()],
            presence: OptionsPresencePolicy::Required,
            unknown: OptionUnknownPolicy::Reject,
        });
    }
    None
}

fn report(locale: &str, input: &str) -> Vec<String> {
    let locale = langid(locale);
    let tokens = Tokenizer::default()
        .tokenize(&locale, Vec::new(), input)
        .unwrap();
    analysis_report(&locale, input, &tokens, &gender_policy)
}

#[test]
fn test_complete() {
    assert!(report("en", "complete message").is_empty());
    assert!(report("de", "vollwertige Nachricht").is_empty());
    assert!(report("uk", "повноцінне повідомлення").is_empty());
}

#[test]
fn test_complete_cardinal() {
    assert!(report("en", "{var0, plural, other {# things} one {# thing}}").is_empty());
    assert!(
        report(
            "ru",
            "{var0, plural, \
             one {# сообщение} few {# сообщения} many {# сообщений} other {# сообщений}}",
        )
        .is_empty()
    );
    assert!(report("ja", "{var0, plural, other {# 件}}").is_empty());
}

#[test]
fn test_complete_ordinal() {
    assert!(
        report(
            "en",
            "{var0, selectordinal, other {#th} one {#st} few {#rd} two {#nd}}",
        )
        .is_empty()
    );
    assert!(report("de", "{var0, selectordinal, other {#.}}").is_empty());
}

#[test]
fn test_complete_gender() {
    assert!(
        report(
            "en",
            "{var0_gender, select, other {{var0} notified} \
             female {{var0} notified} male {{var0} notified}}",
        )
        .is_empty()
    );
}

#[test]
fn test_incomplete_cardinal() {
    assert_eq!(
        vec![r#"Argument "var0" is missing options [one]"#],
        report("en", "{var0, plural, other {# things}}")
    );
    assert_eq!(
        vec![r#"Argument "var0" is missing options [one,few,many]"#],
        report("ru", "{var0, plural, other {# сообщений}}")
    );
    assert_eq!(
        vec![r#"Argument "var0" is missing options [few,many]"#],
        report(
            "ru",
            "{var0, plural, other {# сообщений} one {# сообщение}}"
        )
    );
    assert_eq!(
        vec![r#"Argument "var0" is missing options [many]"#],
        report(
            "ru",
            "{var0, plural, =0 {нет сообщений} other {# сообщений} \
             few {# сообщения} one {# сообщение}}"
        )
    );
    assert_eq!(
        vec![r#"Argument "var0" is missing options [zero,one]"#],
        report("lv", "{var0, plural, other {# diennaktis}}")
    );
}

#[test]
fn test_incomplete_ordinal() {
    assert_eq!(
        vec![r#"Argument "var0" is missing options [one,two,few]"#],
        report("en", "{var0, selectordinal, other {#th}}")
    );
    assert_eq!(
        vec![r#"Argument "var0" is missing options [two,few]"#],
        report("en", "{var0, selectordinal, other {#th} one {#st}}")
    );
}

#[test]
fn test_incomplete_gender() {
    assert_eq!(
        vec![r#"Argument "var0_gender" is missing options [male]"#],
        report(
            "en",
            "{var0_gender, select, other {{var0}} female {{var0}}} notified"
        )
    );
    assert_eq!(
        vec![r#"Argument "var0_gender" is missing options [male,female]"#],
        report("ru", "{var0_gender, select, other {{var0} сообщил}}")
    );
    assert_eq!(
        vec![r#"Argument "var0_gender" is missing options [female]"#],
        report(
            "uk",
            "{var0_gender, select, male {{var0} повідомив} other {{var0} повідомило}}"
        )
    );
}

#[test]
fn test_rejected_select_option() {
    assert_eq!(
        vec![
            r#"Argument "var0_gender": invalid select option "banana""#,
            r#"Argument "var0_gender" is missing options [male,female]"#,
        ],
        report("ja", "{var0_gender, select, banana {{var0}} other {{var0}}}")
    );
}

#[test]
fn test_non_gender_select_accepts_anything() {
    assert!(
        report(
            "en",
            "{var0, select, red {stop} green {go} other {wait}}"
        )
        .is_empty()
    );
}

#[test]
fn test_multiple_incomplete_arguments() {
    assert_eq!(
        vec![
            r#"Argument "var0_gender" is missing options [male,female]"#,
            r#"Argument "var1_gender" is missing options [male]"#,
            r#"Argument "var2_gender" is missing options [female]"#,
        ],
        report(
            "uk",
            "{var0_gender, select, other {{var0}}} and \
             {var1_gender, select, female {{var1}} other {{var1}}} and \
             {var2_gender, select, male {{var1}} other {{var1}}}"
        )
    );
}

#[test]
fn test_nested_incomplete_arguments_innermost_first() {
    assert_eq!(
        vec![
            r#"Argument "var1_gender" is missing options [male,female]"#,
            r#"Argument "var0_gender" is missing options [male,female]"#,
        ],
        report(
            "uk",
            "{var0_gender, select, other {\
                {var1_gender, select, other {{var0} {var1}}}\
             }}"
        )
    );
    assert_eq!(
        vec![
            r#"Argument "var2" is missing options [one,few,many]"#,
            r#"Argument "var1" is missing options [few]"#,
            r#"Argument "var0_gender" is missing options [male,female]"#,
        ],
        report(
            "uk",
            "{var0_gender, select, other {\
                {var1, selectordinal, other {\
                    {var0} перше отримало {var2, plural, other {# повідомлень}}\
                }}\
             }}"
        )
    );
}

#[test]
fn test_analyze_callbacks() {
    let locale = langid("en");
    let raw = "{var0, plural, other {# things}} and \
               {var1_gender, select, banana {{var1}} other {{var1}}}";
    let tokens = Tokenizer::default()
        .tokenize(&locale, Vec::new(), raw)
        .unwrap();
    let mut incomplete = Vec::new();
    let mut rejected = Vec::new();
    analyze(
        &locale,
        raw,
        &tokens,
        &gender_policy,
        &mut |i| incomplete.push(i),
        &mut |arg, option| rejected.push((arg, option)),
    );
    assert_eq!(2, incomplete.len());
    assert_eq!(1, rejected.len());
    let (arg, option) = rejected[0];
    assert_eq!("var1_gender", tokens[arg + 1].text(raw));
    assert_eq!("banana", tokens[option].text(raw));
}
