//! URL fragment codec.
//!
//! The fragment is the application's routing channel. Reads are permissive:
//! pairs may be separated by `&` or `?`, a pair without `=` gets an empty
//! value, and the last occurrence of a repeated key wins. Writes are not: the
//! site only ever emits a closed set of canonical shapes, built by
//! [`CanonicalFragment`].
//!
//! ## Example
//!
//! ```
//! use rosterview::fragment::{decode, CanonicalFragment};
//!
//! let state = decode("#tab=chars?char=aria");
//! assert_eq!(state.tab(), Some("chars"));
//! assert_eq!(state.char_token(), Some("aria"));
//!
//! let canonical = CanonicalFragment::tab("chars");
//! assert_eq!(canonical.to_string(), "#tab=chars");
//! ```

use std::collections::BTreeMap;
use std::fmt;

/// Fragment key naming the active panel.
pub const KEY_TAB: &str = "tab";
/// Fragment key naming a catalog entity to open once on load.
pub const KEY_CHAR: &str = "char";

/// Decoded fragment: string keys to string values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FragmentState {
    pairs: BTreeMap<String, String>,
}

impl FragmentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Requested tab token, if present and non-empty.
    pub fn tab(&self) -> Option<&str> {
        self.get(KEY_TAB).filter(|v| !v.is_empty())
    }

    /// Requested entity token, if present and non-empty.
    pub fn char_token(&self) -> Option<&str> {
        self.get(KEY_CHAR).filter(|v| !v.is_empty())
    }
}

/// Percent-decode one component. Invalid escapes or invalid UTF-8 keep the
/// raw text instead of failing the whole fragment.
fn decode_component(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(s) => s.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// Decode a raw fragment (with or without the leading `#`).
pub fn decode(raw: &str) -> FragmentState {
    let body = raw.strip_prefix('#').unwrap_or(raw);
    let mut state = FragmentState::new();

    for part in body.split(&['&', '?'][..]) {
        if part.is_empty() {
            continue;
        }
        let (key, value) = part.split_once('=').unwrap_or((part, ""));
        if key.is_empty() {
            continue;
        }
        state.insert(decode_component(key), decode_component(value));
    }

    state
}

/// The only fragment shapes the site ever writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CanonicalFragment {
    /// `#tab=<token>`
    Tab { tab: String },
    /// `#tab=<token>&char=<id>`
    TabChar { tab: String, char: String },
}

impl CanonicalFragment {
    pub fn tab(token: impl Into<String>) -> Self {
        CanonicalFragment::Tab { tab: token.into() }
    }

    pub fn tab_char(token: impl Into<String>, char: impl Into<String>) -> Self {
        CanonicalFragment::TabChar {
            tab: token.into(),
            char: char.into(),
        }
    }

    pub fn tab_token(&self) -> &str {
        match self {
            CanonicalFragment::Tab { tab } | CanonicalFragment::TabChar { tab, .. } => tab,
        }
    }
}

impl fmt::Display for CanonicalFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalFragment::Tab { tab } => {
                write!(f, "#{KEY_TAB}={}", urlencoding::encode(tab))
            }
            CanonicalFragment::TabChar { tab, char } => write!(
                f,
                "#{KEY_TAB}={}&{KEY_CHAR}={}",
                urlencoding::encode(tab),
                urlencoding::encode(char)
            ),
        }
    }
}

impl From<CanonicalFragment> for FragmentState {
    fn from(canonical: CanonicalFragment) -> Self {
        let mut state = FragmentState::new();
        match canonical {
            CanonicalFragment::Tab { tab } => {
                state.insert(KEY_TAB, tab);
            }
            CanonicalFragment::TabChar { tab, char } => {
                state.insert(KEY_TAB, tab);
                state.insert(KEY_CHAR, char);
            }
        }
        state
    }
}
