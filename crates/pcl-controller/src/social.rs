//! Keyword-based social engagement helpers (spec §4.8 step 5): product-
//! opportunity detection in feed posts and direct-mention intent
//! classification. Deliberately simple keyword dictionaries, the same
//! register as `pcl_risk::catalog::match_product`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionIntent {
    PoolStatusQuery,
    ProductCatalogQuery,
    Help,
    Unrecognized,
}

const POOL_STATUS_KEYWORDS: &[&str] = &["pool status", "is pool", "status of pool", "pool #", "what's the status"];
const CATALOG_KEYWORDS: &[&str] = &["what products", "what coverage", "catalog", "what do you cover", "list products"];
const HELP_KEYWORDS: &[&str] = &["help", "how do i", "how does this work", "getting started"];

pub fn classify_mention(body: &str) -> MentionIntent {
    let lower = body.to_lowercase();
    if POOL_STATUS_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return MentionIntent::PoolStatusQuery;
    }
    if CATALOG_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return MentionIntent::ProductCatalogQuery;
    }
    if HELP_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return MentionIntent::Help;
    }
    MentionIntent::Unrecognized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_pool_status_query() {
        assert_eq!(classify_mention("what's the status of pool #12?"), MentionIntent::PoolStatusQuery);
    }

    #[test]
    fn classifies_catalog_query() {
        assert_eq!(classify_mention("what products do you offer"), MentionIntent::ProductCatalogQuery);
    }

    #[test]
    fn classifies_help_request() {
        assert_eq!(classify_mention("help, how do I buy coverage"), MentionIntent::Help);
    }

    #[test]
    fn unrecognized_falls_through() {
        assert_eq!(classify_mention("nice weather today"), MentionIntent::Unrecognized);
    }
}
