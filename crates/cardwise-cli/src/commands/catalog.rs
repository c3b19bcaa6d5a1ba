//! Catalog command implementation

use std::path::Path;

use anyhow::{Context, Result};
use cardwise_core::insights::format_money;
use cardwise_core::Catalog;

/// List subscription services with their tiers, then stores
pub fn cmd_catalog(path: Option<&Path>) -> Result<()> {
    let catalog = Catalog::load(path).context("Failed to load catalog")?;
    print!("{}", render_catalog(&catalog));
    Ok(())
}

pub fn render_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();

    out.push_str(&format!("Subscription services ({})\n", catalog.subscriptions.len()));
    for service in &catalog.subscriptions {
        let lowest = service.lowest_tier().map(|t| t.name.as_str());
        out.push_str(&format!("  {}\n", service.name));
        for tier in &service.tiers {
            let marker = if Some(tier.name.as_str()) == lowest {
                "  (cheapest)"
            } else {
                ""
            };
            out.push_str(&format!(
                "    {:<24} {:>9}{}\n",
                tier.name,
                format_money(tier.price),
                marker
            ));
        }
    }

    out.push_str(&format!("\nStores ({})\n", catalog.stores.len()));
    out.push_str(&format!("  {:<20} {:<16} {}\n", "NAME", "CATEGORY", "AVG ITEM"));
    for store in &catalog.stores {
        out.push_str(&format!(
            "  {:<20} {:<16} {}\n",
            store.name,
            store.category,
            format_money(store.average_item_price())
        ));
    }

    out
}
