//! Base-path resolution for data documents and image references.
//!
//! Sites are usually served from a sub-path (`/roster/`), while the data files
//! carry references written relative to wherever they were authored
//! (`../img/aria.png`). Everything relative is re-rooted onto one base.

/// A normalised base path that always ends in `/`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasePath(String);

impl Default for BasePath {
    fn default() -> Self {
        BasePath("/".to_string())
    }
}

impl BasePath {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        let mut base = trimmed.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        BasePath(base)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve `path` against the base.
    ///
    /// - empty stays empty
    /// - scheme-qualified (`https:`, `data:`), protocol-relative (`//`) and
    ///   already-based references pass through unchanged
    /// - otherwise leading `./` and `../` segments are dropped and the base is
    ///   prefixed
    pub fn resolve(&self, path: &str) -> String {
        if path.is_empty() {
            return String::new();
        }
        if has_scheme(path) || path.starts_with("//") || path.starts_with(self.0.as_str()) {
            return path.to_string();
        }

        let mut rest = path;
        loop {
            if let Some(r) = rest.strip_prefix("./") {
                rest = r;
            } else if let Some(r) = rest.strip_prefix("../") {
                rest = r;
            } else {
                break;
            }
        }
        let rest = rest.trim_start_matches('/');

        format!("{}{}", self.0, rest)
    }
}

/// `scheme ":"` where scheme is `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
fn has_scheme(path: &str) -> bool {
    let Some((scheme, _)) = path.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
