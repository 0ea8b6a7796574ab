use super::*;

fn decode(input: &str) -> Result<File, DecodeError> {
    Decoder::new().decode(input.as_bytes())
}

fn encode_string(file: &File, indent: &str) -> String {
    let mut out = Vec::new();
    encode(&mut out, file, indent).unwrap();
    String::from_utf8(out).unwrap()
}

fn roundtrip(input: &str) -> File {
    let file = decode(input).unwrap();
    assert_eq!(input, encode_string(&file, "    "), "encode(decode(x)) != x");
    let again = Decoder::new()
        .decode(encode_string(&file, "    ").as_bytes())
        .unwrap();
    assert_eq!(file, again, "decode(encode(f)) != f");
    file
}

#[test]
fn test_roundtrip_simple() {
    let input = r#"{
    "@@locale": "uk",
    "@@context": "HomePage",
    "helloAndWelcome": "Ласкаво просимо, {firstName} {lastName}!",
    "@helloAndWelcome": {
        "type": "text",
        "description": "Initial welcome message",
        "placeholders": {
            "firstName": {
                "type": "String"
            },
            "lastName": {
                "type": "String"
            }
        }
    },
    "newMessages": "У вас {newMessages, plural, one {# нове повідомлення} few {# нових повідомлення} many {# нових повідомлень} other {# нових повідомлень}}",
    "@newMessages": {
        "type": "text",
        "description": "Number of new messages in inbox.",
        "comment": "Test comment",
        "context": "Test Context",
        "placeholders": {
            "newMessages": {
                "type": "int"
            }
        }
    }
}
"#;
    let file = roundtrip(input);
    assert_eq!("uk", file.locale.to_string());
    assert_eq!("HomePage", file.context);
    assert_eq!(2, file.messages.len());

    let hello = &file.messages["helloAndWelcome"];
    assert_eq!("Initial welcome message", hello.description);
    assert_eq!(Some(MessageType::Text), hello.message_type);
    assert_eq!(
        Some(PlaceholderType::String),
        hello.placeholders["firstName"].placeholder_type
    );
    assert!(!hello.icu_tokens.is_empty());

    let new_messages = &file.messages["newMessages"];
    assert_eq!("Test Context", new_messages.context);
    assert_eq!("Test comment", new_messages.comment);
    assert_eq!(
        Some(PlaceholderType::Int),
        new_messages.placeholders["newMessages"].placeholder_type
    );
}

#[test]
fn test_roundtrip_barebones() {
    let input = "{\n    \"@@locale\": \"de-CH\"\n}\n";
    let file = roundtrip(input);
    assert_eq!("de-CH", file.locale.to_string());
    assert!(file.messages.is_empty());
    assert_eq!(None, file.last_modified);
}

#[test]
fn test_roundtrip_custom_attributes() {
    let input = r#"{
    "@@locale": "en",
    "@@last_modified": "2025-04-12T20:03:44Z",
    "@@x-generator": "Foo",
    "@@x-something-else": "Bar Bazz",
    "msgWithCustomAttr": "Translation",
    "@msgWithCustomAttr": {
        "type": "text",
        "description": "This message has custom attributes x-src and x-something-else",
        "x-something-else": "bazz",
        "x-src": "foo/bar/main.rs:14"
    }
}
"#;
    let file = roundtrip(input);
    assert_eq!(
        Some(&serde_json::Value::String("Foo".to_owned())),
        file.custom_attributes.get("@@x-generator")
    );
    let message = &file.messages["msgWithCustomAttr"];
    assert_eq!(
        Some(&serde_json::Value::String("bazz".to_owned())),
        message.custom_attributes.get("x-something-else")
    );
    let last_modified = file.last_modified.unwrap();
    assert_eq!(2025, last_modified.year());
}

#[test]
fn test_decode_default_message_type() {
    let input = r#"{
    "@@locale": "en",
    "x": "Simple message",
    "@x": {
        "description": "The message type is intentionally undefined"
    }
}
"#;
    let file = decode(input).unwrap();
    let message = &file.messages["x"];
    assert_eq!(Some(MessageType::Text), message.message_type);

    // Encoding makes the defaulted type explicit.
    let encoded = encode_string(&file, "    ");
    assert!(encoded.contains("\"type\": \"text\""), "{encoded}");
}

#[test]
fn test_decode_shell_message_with_metadata() {
    let input = r#"{
    "@@locale": "de",
    "msg1": "",
    "@msg1": {
        "type": "text",
        "description": "awaiting translation"
    }
}
"#;
    let file = roundtrip(input);
    let message = &file.messages["msg1"];
    assert_eq!("", message.icu_message);
    assert!(message.icu_tokens.is_empty());
}

#[test]
fn test_decode_errors() {
    let cases: &[(&str, fn(&DecodeError) -> bool, &str)] = &[
        (
            "{}",
            |e| matches!(e, DecodeError::MissingRequiredLocale),
            "missing required @@locale",
        ),
        (
            r#"{"@@locale": ""}"#,
            |e| matches!(e, DecodeError::MissingRequiredLocale),
            "missing required @@locale",
        ),
        (
            r#"{"@@locale": "en", "emptyMsg": ""}"#,
            |e| matches!(e, DecodeError::EmptyIcuMessage(_)),
            r#"for key "emptyMsg": empty ICU message"#,
        ),
    ];
    for (input, check, message) in cases {
        let err = decode(input).unwrap_err();
        assert!(check(&err), "input: {input:?}, got: {err:?}");
        assert_eq!(*message, err.to_string(), "input: {input:?}");
    }

    let err = decode(r#"{"@@locale": "not a locale!"}"#).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidLocale { .. }));

    let err = decode(r#"{"@@locale": "en", "@@last_modified": "15:40"}"#).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidLastModified(_)));

    let err = decode(r#"{"@@locale": "en", "m": "{var0, plural, one {#}}"}"#).unwrap_err();
    assert_eq!(
        "invalid ICU message: at index 0: missing the mandatory 'other' option",
        err.to_string()
    );

    let err = decode(
        r#"{"@@locale": "en", "m": "text", "@m": {"type": "invalid"}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, DecodeError::InvalidMessageType(_)));

    let err = decode(
        r#"{"@@locale": "en", "m": "text", "@m": {"placeholders": {"p": {"type": "invalid"}}}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, DecodeError::InvalidPlaceholderType { .. }));

    let err = decode(
        r#"{"@@locale": "en", "m": "{notInList}", "@m": {"placeholders": {"other": {"type": "String"}}}}"#,
    )
    .unwrap_err();
    assert_eq!(r#"undefined placeholder: "notInList""#, err.to_string());

    let err = decode("{broken").unwrap_err();
    assert!(matches!(err, DecodeError::MalformedJson(_)));
}

#[test]
fn test_encode_orders_messages_by_id() {
    let mut file = File::new("en".parse().unwrap());
    for id in ["msgC", "msgA", "msgB"] {
        file.messages.insert(
            id.to_owned(),
            Message {
                id: id.to_owned(),
                icu_message: "x".to_owned(),
                ..Message::default()
            },
        );
    }
    let encoded = encode_string(&file, "\t");
    let a = encoded.find("msgA").unwrap();
    let b = encoded.find("msgB").unwrap();
    let c = encoded.find("msgC").unwrap();
    assert!(a < b && b < c, "{encoded}");
}

#[test]
fn test_encode_tab_indent() {
    let mut file = File::new("en".parse().unwrap());
    file.custom_attributes.insert(
        "@@x-generator".to_owned(),
        serde_json::Value::String("toki".to_owned()),
    );
    let encoded = encode_string(&file, "\t");
    assert_eq!(
        "{\n\t\"@@locale\": \"en\",\n\t\"@@x-generator\": \"toki\"\n}\n",
        encoded
    );
}
