//! Output formatting for sync reports (table, JSON, markdown, CSV).

pub mod price;

use crate::config::OutputFormat;
use crate::tracker::{StatusRow, Summary};
use crate::view::{ProductCard, ViewModel};
use serde::Serialize;

/// Marker printed next to the cheapest retailers.
pub const BEST_PRICE_MARKER: &str = "BEST PRICE!";

/// Everything a finished sync has to show.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Status line for the run
    pub status: String,
    /// "Last updated" banner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    pub retailers: Vec<StatusRow>,
    /// Categories present in the snapshot, for `--category`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    pub view: ViewModel,
}

/// Formats reports for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a full sync report.
    pub fn format_report(&self, report: &SyncReport) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => self.table_report(report),
            OutputFormat::Markdown => self.markdown_report(report),
            OutputFormat::Csv => self.csv_view(&report.view),
        }
    }

    /// Formats only the product view.
    pub fn format_view(&self, view: &ViewModel) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(view).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => self.table_view(view),
            OutputFormat::Markdown => self.markdown_view(view),
            OutputFormat::Csv => self.csv_view(view),
        }
    }

    /// One-line retailer tally.
    pub fn summary_line(summary: &Summary) -> String {
        format!(
            "Summary: {} succeeded • {} failed • {} skipped (of {} retailers)",
            summary.success, summary.error, summary.skipped, summary.total
        )
    }

    // Table formatting

    fn table_report(&self, report: &SyncReport) -> String {
        let mut lines = Vec::new();

        lines.push(self.table_board(&report.retailers));
        if let Some(summary) = &report.summary {
            lines.push(Self::summary_line(summary));
        }
        lines.push(String::new());
        lines.push(report.status.clone());
        if let Some(banner) = &report.last_update {
            lines.push(banner.clone());
        }
        if !report.categories.is_empty() {
            lines.push(format!("Categories: {}", report.categories.join(", ")));
        }
        lines.push(String::new());
        lines.push(self.table_view(&report.view));

        lines.join("\n")
    }

    fn table_board(&self, rows: &[StatusRow]) -> String {
        let name_width = 12;

        rows.iter()
            .map(|row| {
                let line = format!(
                    "{} {:<name_width$} {}",
                    row.status.icon(),
                    row.retailer.name(),
                    row.status.label()
                );
                match &row.message {
                    Some(message) => format!("{}  ({})", line, message),
                    None => line,
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn table_view(&self, view: &ViewModel) -> String {
        if let Some(message) = view.empty_message() {
            return message;
        }

        let mut lines = Vec::new();
        for card in view.cards() {
            lines.push(self.table_card(card));
            lines.push(String::new());
        }
        lines.push(format!("Total: {} products", view.cards().len()));

        lines.join("\n")
    }

    fn table_card(&self, card: &ProductCard) -> String {
        let market_width = 12;
        let price_width = 12;

        let mut lines = Vec::new();
        lines.push(format!("[{}] {}", card.category, truncate(&card.name, 60)));
        lines.push(format!("Size: {}", card.size));

        for line in &card.prices {
            let marker = if line.is_best { BEST_PRICE_MARKER } else { "" };
            lines.push(format!(
                "  {:<market_width$}  {:>price_width$}  {:<11}  {}",
                line.supermarket, line.price_display, marker, line.url
            ));
        }

        if card.savings > 0 {
            lines.push(format!("  Save up to {}", price::format_cop(card.savings)));
        }

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_report(&self, report: &SyncReport) -> String {
        let mut lines = Vec::new();

        lines.push(format!("**{}**", report.status));
        if let Some(banner) = &report.last_update {
            lines.push(String::new());
            lines.push(format!("_{}_", banner));
        }
        if !report.categories.is_empty() {
            lines.push(String::new());
            lines.push(format!("Categories: {}", report.categories.join(", ")));
        }
        lines.push(String::new());

        lines.push("| Retailer | Status | Message |".to_string());
        lines.push("|----------|--------|---------|".to_string());
        for row in &report.retailers {
            lines.push(format!(
                "| {} | {} {} | {} |",
                row.retailer.name(),
                row.status.icon(),
                row.status.label(),
                row.message.as_deref().unwrap_or("")
            ));
        }

        if let Some(summary) = &report.summary {
            lines.push(String::new());
            lines.push(Self::summary_line(summary));
        }

        lines.push(String::new());
        lines.push(self.markdown_view(&report.view));

        lines.join("\n")
    }

    fn markdown_view(&self, view: &ViewModel) -> String {
        if let Some(message) = view.empty_message() {
            return format!("*{}*", message);
        }

        let mut lines = Vec::new();
        for card in view.cards() {
            lines.push(format!("## {}", card.name));
            lines.push(String::new());
            lines.push(format!("- **Category:** {}", card.category));
            lines.push(format!("- **Size:** {}", card.size));
            lines.push(format!("- **Best price:** {}", card.best_price_display));
            lines.push(String::new());
            lines.push("| Supermarket | Price | |".to_string());
            lines.push("|-------------|-------|---|".to_string());
            for line in &card.prices {
                let marker = if line.is_best { format!("**{}**", BEST_PRICE_MARKER) } else { String::new() };
                lines.push(format!(
                    "| [{}]({}) | {} | {} |",
                    line.supermarket, line.url, line.price_display, marker
                ));
            }
            lines.push(String::new());
        }
        lines.push(format!("*{} products found*", view.cards().len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "product,size,category,supermarket,price,best,url".to_string()
    }

    fn csv_view(&self, view: &ViewModel) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_header());

        for card in view.cards() {
            for line in &card.prices {
                lines.push(format!(
                    "{},{},{},{},{},{},{}",
                    Self::csv_escape(&card.name),
                    Self::csv_escape(&card.size),
                    Self::csv_escape(&card.category),
                    Self::csv_escape(&line.supermarket),
                    line.price,
                    line.is_best,
                    Self::csv_escape(&line.url)
                ));
            }
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
