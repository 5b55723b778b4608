//! Personalized path rewriting.

/// Marker segment prefix carrying the identified variants in the internal
/// rewrite path. The downstream renderer peels it off to select layout
/// variants.
pub const VARIANT_PREFIX: &str = "_variantId_";

/// Builds the internal rewrite path for a set of identified variants.
///
/// `/_variantId_{id1}_{id2}{base_path}` — the base path keeps its leading
/// slash, so `/products` with variants `["a", "b"]` becomes
/// `/_variantId_a_b/products`.
pub fn personalized_rewrite(base_path: &str, variant_ids: &[String]) -> String {
    let suffix = if base_path == "/" { "" } else { base_path };
    format!("/{}{}{}", VARIANT_PREFIX, variant_ids.join("_"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_variant() {
        assert_eq!(
            personalized_rewrite("/products", &["a1".to_string()]),
            "/_variantId_a1/products"
        );
    }

    #[test]
    fn test_multiple_variants_joined() {
        assert_eq!(
            personalized_rewrite("/products", &["a1".to_string(), "b2".to_string()]),
            "/_variantId_a1_b2/products"
        );
    }

    #[test]
    fn test_root_path() {
        assert_eq!(
            personalized_rewrite("/", &["a1".to_string()]),
            "/_variantId_a1"
        );
    }
}
