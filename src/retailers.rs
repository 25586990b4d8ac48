//! Retailer catalog and per-retailer sync status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grocery retailers tracked by the price server, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Retailer {
    #[serde(rename = "Olímpica")]
    Olimpica,
    #[serde(rename = "Éxito")]
    Exito,
    Carulla,
    Jumbo,
    Metro,
    Makro,
    D1,
    Alkosto,
    Ara,
    PriceSmart,
}

/// How the price server obtains a retailer's catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// VTEX catalog search API.
    Vtex,
    /// Headless browser scraping.
    Browser,
    /// No online catalog; always reported as skipped.
    Unavailable,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Vtex => write!(f, "vtex"),
            Channel::Browser => write!(f, "browser"),
            Channel::Unavailable => write!(f, "unavailable"),
        }
    }
}

impl Retailer {
    /// Returns the display name used by the price server.
    pub fn name(&self) -> &'static str {
        match self {
            Retailer::Olimpica => "Olímpica",
            Retailer::Exito => "Éxito",
            Retailer::Carulla => "Carulla",
            Retailer::Jumbo => "Jumbo",
            Retailer::Metro => "Metro",
            Retailer::Makro => "Makro",
            Retailer::D1 => "D1",
            Retailer::Alkosto => "Alkosto",
            Retailer::Ara => "Ara",
            Retailer::PriceSmart => "PriceSmart",
        }
    }

    /// Returns the storefront the prices link to, if the retailer has one.
    pub fn storefront(&self) -> Option<&'static str> {
        match self {
            Retailer::Olimpica => Some("https://www.olimpica.com"),
            Retailer::Exito => Some("https://www.exito.com"),
            Retailer::Carulla => Some("https://www.carulla.com"),
            Retailer::Jumbo => Some("https://www.tiendasjumbo.co"),
            Retailer::Metro => Some("https://www.tiendasmetro.co"),
            Retailer::Makro => Some("https://www.makro.com.co"),
            Retailer::D1 => Some("https://domicilios.tiendasd1.com"),
            Retailer::Alkosto => Some("https://www.alkosto.com"),
            Retailer::Ara | Retailer::PriceSmart => None,
        }
    }

    /// Returns how the price server fetches this retailer.
    pub fn channel(&self) -> Channel {
        match self {
            Retailer::Olimpica
            | Retailer::Exito
            | Retailer::Carulla
            | Retailer::Jumbo
            | Retailer::Metro
            | Retailer::Makro => Channel::Vtex,
            Retailer::D1 | Retailer::Alkosto => Channel::Browser,
            Retailer::Ara | Retailer::PriceSmart => Channel::Unavailable,
        }
    }

    /// Returns the full catalog in display order.
    pub fn all() -> &'static [Retailer] {
        &[
            Retailer::Olimpica,
            Retailer::Exito,
            Retailer::Carulla,
            Retailer::Jumbo,
            Retailer::Metro,
            Retailer::Makro,
            Retailer::D1,
            Retailer::Alkosto,
            Retailer::Ara,
            Retailer::PriceSmart,
        ]
    }

    /// Position of this retailer in the catalog.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Resolves a name sent by the price server, or `None` for unknown retailers.
    pub fn lookup(name: &str) -> Option<Retailer> {
        let folded = fold(name);
        Retailer::all().iter().copied().find(|r| fold(r.name()) == folded)
    }
}

/// Lowercases and strips the Spanish accents that appear in retailer names.
fn fold(s: &str) -> String {
    s.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            other => other,
        })
        .collect()
}

impl fmt::Display for Retailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Retailer {
    type Err = RetailerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Retailer::lookup(s).ok_or_else(|| RetailerParseError(s.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct RetailerParseError(String);

impl fmt::Display for RetailerParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Retailer::all().iter().map(|r| r.name()).collect();
        write!(f, "Unknown retailer '{}'. Known retailers: {}", self.0, names.join(", "))
    }
}

impl std::error::Error for RetailerParseError {}

/// Fetch status of one retailer during a sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetailerStatus {
    #[default]
    Pending,
    Starting,
    Success,
    Error,
    Skipped,
}

impl RetailerStatus {
    /// Status indicator shown next to the retailer name.
    pub fn icon(&self) -> &'static str {
        match self {
            RetailerStatus::Pending => "·",
            RetailerStatus::Starting => "⏳",
            RetailerStatus::Success => "✓",
            RetailerStatus::Error => "✗",
            RetailerStatus::Skipped => "○",
        }
    }

    /// Style class for HTML renderings of the status board.
    pub fn css_class(&self) -> &'static str {
        match self {
            RetailerStatus::Pending => "pending",
            RetailerStatus::Starting => "starting",
            RetailerStatus::Success => "success",
            RetailerStatus::Error => "error",
            RetailerStatus::Skipped => "skipped",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            RetailerStatus::Pending => "Pending",
            RetailerStatus::Starting => "In progress",
            RetailerStatus::Success => "Done",
            RetailerStatus::Error => "Failed",
            RetailerStatus::Skipped => "Skipped",
        }
    }

    pub fn all() -> &'static [RetailerStatus] {
        &[
            RetailerStatus::Pending,
            RetailerStatus::Starting,
            RetailerStatus::Success,
            RetailerStatus::Error,
            RetailerStatus::Skipped,
        ]
    }
}

impl fmt::Display for RetailerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.css_class())
    }
}
