//! Retailer catalog listing.

use crate::config::OutputFormat;
use crate::retailers::{Retailer, RetailerStatus};
use serde::Serialize;

#[derive(Serialize)]
struct CatalogEntry {
    name: &'static str,
    channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    storefront: Option<&'static str>,
}

/// Lists the tracked retailers and the status legend.
pub fn list_retailers(format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        let entries: Vec<CatalogEntry> = Retailer::all()
            .iter()
            .map(|r| CatalogEntry {
                name: r.name(),
                channel: r.channel().to_string(),
                storefront: r.storefront(),
            })
            .collect();
        return serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string());
    }

    let mut lines = Vec::new();
    lines.push("Tracked retailers:\n".to_string());
    lines.push(format!("{:<12} {:<12} {}", "Name", "Channel", "Storefront"));
    lines.push(format!("{:-<12} {:-<12} {:-<32}", "", "", ""));

    for retailer in Retailer::all() {
        lines.push(format!(
            "{:<12} {:<12} {}",
            retailer.name(),
            retailer.channel().to_string(),
            retailer.storefront().unwrap_or("-")
        ));
    }

    lines.push(String::new());
    lines.push("Status legend:".to_string());
    for status in RetailerStatus::all() {
        lines.push(format!("  {}  {}", status.icon(), status.label()));
    }

    lines.join("\n")
}
