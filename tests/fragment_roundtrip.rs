use rosterview::fragment::{decode, CanonicalFragment, FragmentState, KEY_CHAR, KEY_TAB};

#[test]
fn test_canonical_writes_decode_back() {
    for canonical in [
        CanonicalFragment::tab("chars"),
        CanonicalFragment::tab("world"),
        CanonicalFragment::tab_char("chars", "aria"),
        CanonicalFragment::tab_char("chars", "アリア"),
        CanonicalFragment::tab_char("chars", "two words"),
    ] {
        let written = canonical.to_string();
        let state = decode(&written);
        assert_eq!(state, FragmentState::from(canonical.clone()), "{written}");
        assert_eq!(state.tab(), Some(canonical.tab_token()));
    }
}

#[test]
fn test_both_separators_are_accepted() {
    let amp = decode("#tab=chars&char=aria");
    let question = decode("#tab=chars?char=aria");
    assert_eq!(amp, question);
    assert_eq!(amp.get(KEY_TAB), Some("chars"));
    assert_eq!(amp.get(KEY_CHAR), Some("aria"));
}

#[test]
fn test_unknown_keys_are_preserved() {
    let state = decode("#tab=world&lang=ja&debug");
    assert_eq!(state.len(), 3);
    assert_eq!(state.get("lang"), Some("ja"));
    assert_eq!(state.get("debug"), Some(""));
}

#[test]
fn test_malformed_input_decodes_permissively() {
    assert!(decode("").is_empty());
    assert!(decode("#").is_empty());
    assert!(decode("#&&?").is_empty());
    assert!(decode("#=orphan").is_empty());

    let state = decode("#char=%E3%82");
    assert_eq!(state.char_token(), Some("%E3%82"));

    let state = decode("tab=chars&tab=world");
    assert_eq!(state.tab(), Some("world"));

    let state = decode("#tab=&char=");
    assert_eq!(state.tab(), None);
    assert_eq!(state.char_token(), None);
}

#[test]
fn test_percent_encoded_tokens_decode() {
    let state = decode("#tab=chars&char=%E3%82%A2%E3%83%AA%E3%82%A2");
    assert_eq!(state.char_token(), Some("アリア"));
    assert_eq!(
        CanonicalFragment::tab_char("chars", "アリア").to_string(),
        "#tab=chars&char=%E3%82%A2%E3%83%AA%E3%82%A2"
    );
}
