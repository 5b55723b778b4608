//! The redirect matching engine.
//!
//! Given a normalized incoming path and query string, decides which authored
//! rule (if any) applies. Two grammars coexist because rules are authored by
//! non-technical editors as either plain URLs or regex-like patterns; locale
//! prefix handling is duplicated in both branches because redirects may be
//! defined with or without an explicit locale segment.
//!
//! Iteration order matters: the first rule satisfying its branch's predicate
//! wins, and no later rule is ever preferred.

use crate::application::redirects::pattern::{PatternCache, is_literal_url};
use crate::domain::entities::{RedirectMatch, RedirectRule};

/// Lower-cases the path, and drops query parameters that duplicate path
/// segments (a defensive fixup for malformed incoming URLs where path
/// segments leak into the query string as `path=segment` pairs).
///
/// Returns `(path, query)`; the query keeps its leading `?` or becomes empty.
pub fn normalize_request_url(path: &str, query: &str) -> (String, String) {
    let lowered = path.to_lowercase();

    if query.is_empty() {
        return (lowered, String::new());
    }

    let segment_params: Vec<String> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| format!("path={}", segment))
        .collect();

    let kept: Vec<&str> = query
        .trim_start_matches('?')
        .split('&')
        .filter(|param| !param.is_empty() && !segment_params.iter().any(|sp| sp == param))
        .collect();

    let new_query = if kept.is_empty() {
        String::new()
    } else {
        format!("?{}", kept.join("&"))
    };

    (lowered, new_query)
}

/// Derives the routing locale from a configured-locale path prefix.
///
/// Returns `(locale, remaining_path)`: `/fr/about` with `fr` configured
/// yields `("fr", "/about")`; an unprefixed path yields the default locale
/// and the path unchanged.
pub fn split_locale<'a>(
    path: &'a str,
    site_locales: &[String],
    default_locale: &'a str,
) -> (String, &'a str) {
    if let Some(first) = path.split('/').nth(1)
        && site_locales.iter().any(|l| l.eq_ignore_ascii_case(first))
    {
        let rest = &path[first.len() + 1..];
        let rest = if rest.is_empty() { "/" } else { rest };
        return (first.to_lowercase(), rest);
    }
    (default_locale.to_lowercase(), path)
}

/// The matching engine. Holds the configured site locales and a compiled
/// pattern cache shared across requests.
pub struct RedirectMatcher {
    site_locales: Vec<String>,
    patterns: PatternCache,
}

impl RedirectMatcher {
    pub fn new(site_locales: Vec<String>) -> Self {
        Self {
            site_locales,
            patterns: PatternCache::new(),
        }
    }

    /// Finds the first rule matching the request, in list order.
    ///
    /// Preconditions: `path` has been through [`normalize_request_url`]
    /// (lower-cased, duplicate query params dropped); `query` is the raw
    /// remaining query string including its leading `?`, or empty.
    ///
    /// The rule list is never mutated; the result is a derived value. An
    /// empty list or a list with no matching rule yields `None`; a rule whose
    /// pattern does not compile is skipped (fail closed).
    pub fn find_redirect(
        &self,
        path: &str,
        query: &str,
        locale: &str,
        rules: &[RedirectRule],
    ) -> Option<RedirectMatch> {
        // The root path normalizes to the empty string, so its locale form
        // is exactly "/{locale}".
        let normalized_path = path.trim_end_matches('/');
        let locale_path = format!("/{}{}", locale.to_lowercase(), normalized_path);

        for rule in rules {
            let matched = if is_literal_url(&rule.pattern) {
                self.matches_literal(rule, &locale_path, normalized_path, query)
                    .then(|| RedirectMatch {
                        rule: rule.clone(),
                        matched_query_string: String::new(),
                    })
            } else {
                self.matches_pattern(rule, &locale_path, normalized_path, path, query, locale)
            };

            if matched.is_some() {
                return matched;
            }
        }

        None
    }

    /// Literal-URL branch: exact path comparison with locale-prefix
    /// normalization and order-insensitive query-string equality.
    fn matches_literal(
        &self,
        rule: &RedirectRule,
        locale_path: &str,
        normalized_path: &str,
        query: &str,
    ) -> bool {
        let trimmed = rule.pattern.strip_suffix('/').unwrap_or(&rule.pattern);
        let (pattern_path, pattern_query) = match trimmed.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q)),
            None => (trimmed.to_string(), None),
        };

        let pattern_path = self.normalize_pattern_locale(pattern_path);

        let path_matches = pattern_path == locale_path || pattern_path == normalized_path;
        let query_matches = match pattern_query {
            None => true,
            Some(pq) => query_params_equal(pq, query),
        };

        path_matches && query_matches
    }

    /// Lower-cases the pattern's first segment when it names a configured
    /// site locale, so `/EN/about` and `/en/about` compare equal.
    fn normalize_pattern_locale(&self, pattern_path: String) -> String {
        if let Some(first) = pattern_path.split('/').nth(1)
            && self
                .site_locales
                .iter()
                .any(|l| l.eq_ignore_ascii_case(first))
        {
            let lowered = first.to_lowercase();
            return pattern_path.replacen(&format!("/{}", first), &format!("/{}", lowered), 1);
        }
        pattern_path
    }

    /// Regex branch: compiles the authored pattern (cached) and tests it
    /// against the locale-prefixed and bare forms of the path, with and
    /// without the query string.
    ///
    /// The acceptance clause intentionally mirrors the authored semantics
    /// rule writers depend on: the locale-prefixed test uses the request's
    /// routing locale while the prefix stripping inside compilation uses the
    /// same value, and a recorded matched query string alone is sufficient.
    fn matches_pattern(
        &self,
        rule: &RedirectRule,
        locale_path: &str,
        normalized_path: &str,
        raw_path: &str,
        query: &str,
        locale: &str,
    ) -> Option<RedirectMatch> {
        // Fail closed on malformed patterns.
        let regex = self.patterns.compile(&rule.pattern, locale)?;

        let with_query_matches = regex.is_match(&format!("{}{}", locale_path, query))
            || regex.is_match(&format!("{}{}", normalized_path, query));
        let matched_query_string = if with_query_matches { query } else { "" };

        let path_accepted = regex.is_match(&format!("/{}{}", locale.to_lowercase(), raw_path))
            || regex.is_match(raw_path)
            || !matched_query_string.is_empty();

        let locale_accepted = rule
            .locale
            .as_deref()
            .is_none_or(|l| l.eq_ignore_ascii_case(locale));

        (path_accepted && locale_accepted).then(|| RedirectMatch {
            rule: rule.clone(),
            matched_query_string: matched_query_string.to_string(),
        })
    }
}

/// Order-insensitive query-string equality: `?a=1&b=2` equals `?b=2&a=1`.
fn query_params_equal(a: &str, b: &str) -> bool {
    fn params(qs: &str) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> =
            url::form_urlencoded::parse(qs.trim_start_matches('?').as_bytes())
                .into_owned()
                .collect();
        pairs.sort();
        pairs
    }
    params(a) == params(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RedirectType;

    fn rule(pattern: &str) -> RedirectRule {
        RedirectRule {
            pattern: pattern.to_string(),
            target: "/target".to_string(),
            redirect_type: RedirectType::RedirectTypeMovedPermanently,
            is_query_string_preserved: false,
            locale: None,
        }
    }

    fn rule_with_locale(pattern: &str, locale: &str) -> RedirectRule {
        RedirectRule {
            locale: Some(locale.to_string()),
            ..rule(pattern)
        }
    }

    fn matcher() -> RedirectMatcher {
        RedirectMatcher::new(vec!["en".to_string(), "fr".to_string()])
    }

    #[test]
    fn test_normalize_lowercases_path() {
        let (path, query) = normalize_request_url("/About/Us", "");
        assert_eq!(path, "/about/us");
        assert_eq!(query, "");
    }

    #[test]
    fn test_normalize_drops_leaked_path_segments() {
        let (path, query) = normalize_request_url("/about/us", "?path=about&id=1&path=us");
        assert_eq!(path, "/about/us");
        assert_eq!(query, "?id=1");
    }

    #[test]
    fn test_normalize_keeps_ordinary_query() {
        let (_, query) = normalize_request_url("/about", "?a=1&b=2");
        assert_eq!(query, "?a=1&b=2");
    }

    #[test]
    fn test_split_locale_with_prefix() {
        let locales = vec!["en".to_string(), "fr".to_string()];
        let (locale, path) = split_locale("/fr/about", &locales, "en");
        assert_eq!(locale, "fr");
        assert_eq!(path, "/about");
    }

    #[test]
    fn test_split_locale_without_prefix() {
        let locales = vec!["en".to_string(), "fr".to_string()];
        let (locale, path) = split_locale("/about", &locales, "en");
        assert_eq!(locale, "en");
        assert_eq!(path, "/about");
    }

    #[test]
    fn test_split_locale_bare_prefix() {
        let locales = vec!["fr".to_string()];
        let (locale, path) = split_locale("/fr", &locales, "en");
        assert_eq!(locale, "fr");
        assert_eq!(path, "/");
    }

    #[test]
    fn test_empty_rule_list_is_no_match() {
        assert_eq!(matcher().find_redirect("/about", "", "en", &[]), None);
    }

    #[test]
    fn test_literal_match_without_locale_prefix() {
        let rules = vec![rule("/about")];
        let m = matcher().find_redirect("/about", "", "en", &rules).unwrap();
        assert_eq!(m.rule.pattern, "/about");
        assert_eq!(m.matched_query_string, "");
    }

    #[test]
    fn test_literal_rule_matches_locale_prefixed_pattern() {
        // Rule authored with an explicit locale segment matches the
        // locale-prefixed form of the path.
        let rules = vec![rule("/fr/about")];
        assert!(matcher().find_redirect("/about", "", "fr", &rules).is_some());
    }

    #[test]
    fn test_literal_pattern_locale_case_normalized() {
        let rules = vec![rule("/FR/about")];
        assert!(matcher().find_redirect("/about", "", "fr", &rules).is_some());
    }

    #[test]
    fn test_literal_trailing_slash_stripped_both_sides() {
        let rules = vec![rule("/about/")];
        assert!(matcher().find_redirect("/about/", "", "en", &rules).is_some());
    }

    #[test]
    fn test_literal_query_set_equality_ignores_order() {
        let rules = vec![rule("/landing?b=2&a=1")];
        let matcher = matcher();
        assert!(
            matcher
                .find_redirect("/landing", "?a=1&b=2", "en", &rules)
                .is_some()
        );
        assert!(
            matcher
                .find_redirect("/landing", "?a=1", "en", &rules)
                .is_none()
        );
    }

    #[test]
    fn test_literal_without_query_ignores_incoming_query() {
        let rules = vec![rule("/about")];
        assert!(
            matcher()
                .find_redirect("/about", "?utm_source=mail", "en", &rules)
                .is_some()
        );
    }

    #[test]
    fn test_first_match_wins() {
        let rules = vec![rule("/about"), rule("^/about$")];
        let m = matcher().find_redirect("/about", "", "en", &rules).unwrap();
        assert_eq!(m.rule.pattern, "/about");
    }

    #[test]
    fn test_regex_match_both_locale_forms() {
        let rules = vec![rule("^/about$")];
        let matcher = matcher();
        assert!(matcher.find_redirect("/about", "", "fr", &rules).is_some());
        assert!(matcher.find_redirect("/about", "", "en", &rules).is_some());
    }

    #[test]
    fn test_regex_records_matched_query_string() {
        let rules = vec![rule("^/search?q=rust$")];
        let m = matcher()
            .find_redirect("/search", "?q=rust", "en", &rules)
            .unwrap();
        assert_eq!(m.matched_query_string, "?q=rust");
    }

    #[test]
    fn test_regex_without_query_leaves_annotation_empty() {
        let rules = vec![rule("^/about$")];
        let m = matcher().find_redirect("/about", "", "en", &rules).unwrap();
        assert_eq!(m.matched_query_string, "");
    }

    #[test]
    fn test_rule_locale_must_match_request_locale() {
        let rules = vec![rule_with_locale("^/about$", "en")];
        let matcher = matcher();
        assert!(matcher.find_redirect("/about", "", "fr", &rules).is_none());
        assert!(matcher.find_redirect("/about", "", "en", &rules).is_some());
        // Case-insensitive comparison.
        let rules = vec![rule_with_locale("^/about$", "EN")];
        assert!(matcher.find_redirect("/about", "", "en", &rules).is_some());
    }

    #[test]
    fn test_malformed_pattern_fails_closed_and_list_continues() {
        let rules = vec![rule("^/about[$"), rule("/about")];
        let m = matcher().find_redirect("/about", "", "en", &rules).unwrap();
        assert_eq!(m.rule.pattern, "/about");
    }

    #[test]
    fn test_regex_wildcard_pattern() {
        let rules = vec![rule("^/products/.*$")];
        let matcher = matcher();
        assert!(
            matcher
                .find_redirect("/products/shoes", "", "en", &rules)
                .is_some()
        );
        assert!(matcher.find_redirect("/about", "", "en", &rules).is_none());
    }

    #[test]
    fn test_trailing_slash_optional_in_regex_branch() {
        let rules = vec![rule("^/about$")];
        assert!(
            matcher()
                .find_redirect("/about/", "", "en", &rules)
                .is_some()
        );
    }

    #[test]
    fn test_no_match_returns_none() {
        let rules = vec![rule("/somewhere-else"), rule("^/old-.*$")];
        assert_eq!(matcher().find_redirect("/about", "", "en", &rules), None);
    }

    #[test]
    fn test_query_params_equal() {
        assert!(query_params_equal("a=1&b=2", "?b=2&a=1"));
        assert!(!query_params_equal("a=1", "a=2"));
        assert!(query_params_equal("", ""));
    }
}
