//! Merchant-to-catalog matching strategies

/// Decides whether a transaction merchant refers to a catalog entry
pub trait MerchantMatcher: Send + Sync {
    fn matches(&self, catalog_name: &str, merchant: &str) -> bool;
}

/// Case-insensitive containment in either direction
///
/// "NETFLIX.COM" matches "Netflix", and "Spotify" matches "Spotify USA".
/// Empty names never match anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainmentMatcher;

impl MerchantMatcher for ContainmentMatcher {
    fn matches(&self, catalog_name: &str, merchant: &str) -> bool {
        let catalog_name = catalog_name.trim().to_lowercase();
        let merchant = merchant.trim().to_lowercase();

        if catalog_name.is_empty() || merchant.is_empty() {
            return false;
        }

        merchant.contains(&catalog_name) || catalog_name.contains(&merchant)
    }
}

/// Exact match after trimming and case folding
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl MerchantMatcher for ExactMatcher {
    fn matches(&self, catalog_name: &str, merchant: &str) -> bool {
        let catalog_name = catalog_name.trim();
        !catalog_name.is_empty() && catalog_name.eq_ignore_ascii_case(merchant.trim())
    }
}
