//! Classification and compilation of authored redirect patterns.
//!
//! Rules are authored by editors in one of two grammars: a plain URL, or a
//! regex-like pattern using `^`/`$` anchors. [`is_literal_url`] tells the two
//! apart; [`compile_pattern`] turns the regex grammar into a real anchored
//! [`Regex`]. A [`PatternCache`] memoizes compilation per distinct raw
//! pattern so large rule sets don't recompile on every request.

use regex::Regex;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;

/// Compilation failure for one authored pattern.
///
/// Fails closed: the matcher treats the rule as a non-match and keeps
/// consulting the rest of the list, so one malformed rule cannot break all
/// redirects.
#[derive(Debug, thiserror::Error)]
#[error("invalid redirect pattern {pattern:?}: {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Returns true when `pattern` is a plain URL rather than a regex-like
/// pattern: nothing but URL-safe characters, no regex metacharacters.
pub fn is_literal_url(pattern: &str) -> bool {
    !pattern.is_empty()
        && pattern.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '/' | '-' | '_' | '.' | '~' | '%' | '?' | '=' | '&' | ':')
        })
}

/// Compiles an authored regex-like pattern into an anchored, case-insensitive
/// regular expression allowing an optional trailing slash.
///
/// Transformation steps, in order:
/// 1. Strip a literal `/{locale}/` prefix, allowing one leading character
///    (typically `^`) before it.
/// 2. Escape `?` characters that are not regex constructs, so authored query
///    strings match literally.
/// 3. Strip leading/trailing slashes and authored `^`/`$` anchors (including
///    a stray trailing `$/gi` from copy-pasted JavaScript literals).
/// 4. Re-anchor as `^/<core>/?$`.
///
/// # Errors
///
/// Returns [`PatternError`] when the transformed pattern is not a valid
/// regular expression.
pub fn compile_pattern(raw: &str, locale: &str) -> Result<Regex, PatternError> {
    let stripped = strip_locale_prefix(raw, locale);
    let escaped = escape_plain_question_marks(&stripped);
    let core = strip_authored_anchors(&escaped);

    Regex::new(&format!("(?i)^/{}/?$", core)).map_err(|source| PatternError {
        pattern: raw.to_string(),
        source,
    })
}

/// Removes a literal locale-prefix segment, tolerating one leading character
/// before it. `^/en/about$` with locale `en` becomes `about$`.
fn strip_locale_prefix(pattern: &str, locale: &str) -> String {
    let lower = pattern.to_lowercase();
    let needle = format!("/{}/", locale.to_lowercase());

    if lower.starts_with(&needle) {
        return pattern[needle.len()..].to_string();
    }

    if let Some(first) = pattern.chars().next() {
        let offset = first.len_utf8();
        if lower[offset..].starts_with(&needle) {
            return pattern[offset + needle.len()..].to_string();
        }
    }

    pattern.to_string()
}

/// Escapes `?` characters that are not regex constructs.
///
/// A `?` stays unescaped when it follows `(` (group syntax), a quantifiable
/// closer (`)`, `]`), another quantifier (`*`, `+`), or an escape. Everything
/// else — typically the start of an authored query string — becomes a
/// literal `\?`.
fn escape_plain_question_marks(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut prev: Option<char> = None;
    let mut prev_escaped = false;

    for c in pattern.chars() {
        let escaped_here = prev == Some('\\') && !prev_escaped;
        if c == '?'
            && !escaped_here
            && !matches!(prev, Some('(') | Some(')') | Some(']') | Some('*') | Some('+'))
        {
            out.push('\\');
        }
        out.push(c);
        prev_escaped = escaped_here;
        prev = Some(c);
    }

    out
}

/// Strips authored slashes and anchors so the pattern can be re-anchored
/// uniformly.
fn strip_authored_anchors(pattern: &str) -> &str {
    let mut core = pattern;
    core = core.strip_prefix('/').unwrap_or(core);
    core = core.strip_suffix('/').unwrap_or(core);
    core = core.strip_prefix("^/").unwrap_or(core);
    core = core.strip_suffix("/$").unwrap_or(core);
    core = core.strip_prefix('^').unwrap_or(core);
    core = core.strip_suffix('$').unwrap_or(core);
    core = core.strip_suffix("$/gi").unwrap_or(core);
    core
}

/// Memoizes [`compile_pattern`] per distinct `(pattern, locale)` pair.
///
/// Failed compilations are remembered too, so a malformed rule is logged once
/// and skipped cheaply on subsequent requests.
#[derive(Default)]
pub struct PatternCache {
    compiled: Mutex<HashMap<(String, String), Option<Regex>>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the compiled regex for `raw`, or `None` when the pattern does
    /// not compile (fail closed).
    pub fn compile(&self, raw: &str, locale: &str) -> Option<Regex> {
        let key = (raw.to_string(), locale.to_string());

        let mut compiled = match self.compiled.lock() {
            Ok(guard) => guard,
            // A poisoned lock only means another thread panicked mid-insert;
            // recompiling is always safe.
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(cached) = compiled.get(&key) {
            return cached.clone();
        }

        let result = match compile_pattern(raw, locale) {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!("Skipping malformed redirect rule: {}", e);
                None
            }
        };

        compiled.insert(key, result.clone());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_url_classification() {
        assert!(is_literal_url("/about"));
        assert!(is_literal_url("/products/sale?id=1&ref=mail"));
        assert!(is_literal_url("/en/about/"));

        assert!(!is_literal_url("^/about$"));
        assert!(!is_literal_url("/products/.*"));
        assert!(!is_literal_url("/(en|fr)/home"));
        assert!(!is_literal_url(""));
    }

    #[test]
    fn test_compile_strips_anchors_and_allows_trailing_slash() {
        let regex = compile_pattern("^/about$", "en").unwrap();
        assert!(regex.is_match("/about"));
        assert!(regex.is_match("/about/"));
        assert!(!regex.is_match("/about/us"));
    }

    #[test]
    fn test_compile_is_case_insensitive() {
        let regex = compile_pattern("^/About$", "en").unwrap();
        assert!(regex.is_match("/about"));
        assert!(regex.is_match("/ABOUT"));
    }

    #[test]
    fn test_compile_strips_locale_prefix() {
        let regex = compile_pattern("^/en/about$", "en").unwrap();
        assert!(regex.is_match("/about"));
    }

    #[test]
    fn test_compile_keeps_foreign_locale_prefix() {
        let regex = compile_pattern("^/fr/about$", "en").unwrap();
        assert!(regex.is_match("/fr/about"));
        assert!(!regex.is_match("/about"));
    }

    #[test]
    fn test_compile_escapes_query_question_mark() {
        let regex = compile_pattern("^/search?q=rust$", "en").unwrap();
        assert!(regex.is_match("/search?q=rust"));
        // Unescaped, `h?` would make the `h` optional.
        assert!(!regex.is_match("/searcq=rust"));
    }

    #[test]
    fn test_compile_keeps_regex_question_marks() {
        let regex = compile_pattern("^/docs(/intro)?$", "en").unwrap();
        assert!(regex.is_match("/docs"));
        assert!(regex.is_match("/docs/intro"));
    }

    #[test]
    fn test_compile_strips_pasted_javascript_suffix() {
        let regex = compile_pattern("/legacy$/gi", "en").unwrap();
        assert!(regex.is_match("/legacy"));
    }

    #[test]
    fn test_compile_invalid_pattern_errors() {
        let result = compile_pattern("^/broken[$", "en");
        assert!(result.is_err());
    }

    #[test]
    fn test_pattern_cache_returns_same_compilation() {
        let cache = PatternCache::new();
        let first = cache.compile("^/about$", "en").unwrap();
        let second = cache.compile("^/about$", "en").unwrap();
        assert_eq!(first.as_str(), second.as_str());
    }

    #[test]
    fn test_pattern_cache_fails_closed() {
        let cache = PatternCache::new();
        assert!(cache.compile("^/broken[$", "en").is_none());
        // Second lookup hits the memoized failure.
        assert!(cache.compile("^/broken[$", "en").is_none());
    }
}
