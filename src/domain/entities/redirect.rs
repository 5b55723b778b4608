//! Redirect rule entity as authored in the content platform.

use serde::{Deserialize, Serialize};

/// How a matched redirect is applied to the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedirectType {
    /// `301 Moved Permanently`.
    RedirectTypeMovedPermanently,
    /// `302 Found`.
    RedirectTypeFound,
    /// Internal rewrite: the request path is replaced and handling continues
    /// without a client-visible redirect.
    ServerTransfer,
}

/// An authored redirect definition.
///
/// `pattern` is either a literal URL (optionally carrying a query string) or a
/// regex-like pattern using `^`/`$` anchors. Rules are fetched per site,
/// cached as a complete snapshot, and treated as immutable during matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectRule {
    pub pattern: String,
    pub target: String,
    pub redirect_type: RedirectType,
    /// Append the matched query string to the target when redirecting.
    #[serde(default)]
    pub is_query_string_preserved: bool,
    /// When set, the rule only applies to requests routed in this locale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

/// The outcome of matching a rule against a request.
///
/// Derived and immutable: the cached rule list is never mutated, since the
/// same snapshot may be read by concurrent requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectMatch {
    pub rule: RedirectRule,
    /// The raw incoming query string when the rule matched including it,
    /// empty otherwise.
    pub matched_query_string: String,
}

impl RedirectMatch {
    /// The final target URL with the matched query string applied when the
    /// rule asks for query preservation.
    pub fn target_url(&self) -> String {
        if self.rule.is_query_string_preserved && !self.matched_query_string.is_empty() {
            if self.rule.target.contains('?') {
                let qs = self.matched_query_string.trim_start_matches('?');
                format!("{}&{}", self.rule.target, qs)
            } else if self.matched_query_string.starts_with('?') {
                format!("{}{}", self.rule.target, self.matched_query_string)
            } else {
                format!("{}?{}", self.rule.target, self.matched_query_string)
            }
        } else {
            self.rule.target.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(target: &str, preserve: bool) -> RedirectRule {
        RedirectRule {
            pattern: "/old".to_string(),
            target: target.to_string(),
            redirect_type: RedirectType::RedirectTypeMovedPermanently,
            is_query_string_preserved: preserve,
            locale: None,
        }
    }

    #[test]
    fn test_target_url_without_preservation() {
        let m = RedirectMatch {
            rule: rule("/new", false),
            matched_query_string: "?a=1".to_string(),
        };
        assert_eq!(m.target_url(), "/new");
    }

    #[test]
    fn test_target_url_appends_query_string() {
        let m = RedirectMatch {
            rule: rule("/new", true),
            matched_query_string: "?a=1&b=2".to_string(),
        };
        assert_eq!(m.target_url(), "/new?a=1&b=2");
    }

    #[test]
    fn test_target_url_merges_into_existing_query() {
        let m = RedirectMatch {
            rule: rule("/new?x=0", true),
            matched_query_string: "?a=1".to_string(),
        };
        assert_eq!(m.target_url(), "/new?x=0&a=1");
    }

    #[test]
    fn test_rule_roundtrips_through_json() {
        let r = RedirectRule {
            pattern: "^/promo$".to_string(),
            target: "/sale".to_string(),
            redirect_type: RedirectType::ServerTransfer,
            is_query_string_preserved: false,
            locale: Some("en".to_string()),
        };
        let json = serde_json::to_string(&r).unwrap();
        let back: RedirectRule = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
