//! Pure rendering of the current snapshot into displayable product cards.

use crate::aggregate::{self, AggregateError};
use crate::format::price::format_cop;
use crate::sync::models::{Product, Snapshot};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Category selection applied to the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Category(category) => product.category == *category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            Ok(CategoryFilter::Category(s.to_string()))
        }
    }
}

impl From<String> for CategoryFilter {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(filter) => filter,
            Err(never) => match never {},
        }
    }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> Self {
        filter.to_string()
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "all"),
            CategoryFilter::Category(c) => write!(f, "{}", c),
        }
    }
}

/// A retailer price ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceLine {
    pub supermarket: String,
    pub price: u64,
    pub price_display: String,
    pub url: String,
    pub is_best: bool,
}

/// One product with its prices sorted cheapest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCard {
    pub name: String,
    pub size: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub best_price: u64,
    pub best_price_display: String,
    /// Gap between the most expensive and the cheapest retailer
    pub savings: u64,
    pub prices: Vec<PriceLine>,
}

impl ProductCard {
    fn build(product: &Product) -> Result<Self, AggregateError> {
        let best_price = aggregate::best_price(&product.prices)?;
        let savings = aggregate::savings(&product.prices)?;

        let prices = aggregate::with_best_flag(&product.prices)?
            .into_iter()
            .map(|ranked| PriceLine {
                price_display: format_cop(ranked.observation.price),
                supermarket: ranked.observation.supermarket,
                price: ranked.observation.price,
                url: ranked.observation.url,
                is_best: ranked.is_best,
            })
            .collect();

        Ok(Self {
            name: product.name.clone(),
            size: product.size.clone(),
            category: product.category.clone(),
            brand: product.brand.clone(),
            best_price,
            best_price_display: format_cop(best_price),
            savings,
            prices,
        })
    }

    /// Retailers offering the best price.
    pub fn best_offers(&self) -> impl Iterator<Item = &PriceLine> {
        self.prices.iter().filter(|p| p.is_best)
    }
}

/// What the product view should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewModel {
    /// The last sync found nothing at all.
    NoResults { query: String },
    /// The sync found products, but none in the selected category.
    EmptyCategory { category: String },
    Products { cards: Vec<ProductCard> },
}

impl ViewModel {
    /// Message for the empty states.
    pub fn empty_message(&self) -> Option<String> {
        match self {
            ViewModel::NoResults { query } => {
                Some(format!("No results for \"{}\" in real time.", query))
            }
            ViewModel::EmptyCategory { category } => {
                Some(format!("No results in category \"{}\".", category))
            }
            ViewModel::Products { .. } => None,
        }
    }

    pub fn cards(&self) -> &[ProductCard] {
        match self {
            ViewModel::Products { cards } => cards,
            _ => &[],
        }
    }
}

/// Renders the snapshot through the category filter.
pub fn render(snapshot: &Snapshot, filter: &CategoryFilter) -> Result<ViewModel, AggregateError> {
    if snapshot.is_empty() {
        return Ok(ViewModel::NoResults { query: snapshot.query.clone() });
    }

    let cards = snapshot
        .products
        .iter()
        .filter(|p| filter.matches(p))
        .map(ProductCard::build)
        .collect::<Result<Vec<_>, _>>()?;

    if cards.is_empty() {
        return Ok(ViewModel::EmptyCategory { category: filter.to_string() });
    }

    Ok(ViewModel::Products { cards })
}

/// Distinct categories in the snapshot, in first-seen order.
pub fn categories(snapshot: &Snapshot) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for product in &snapshot.products {
        if !seen.contains(&product.category.as_str()) {
            seen.push(&product.category);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::models::PriceObservation;

    fn product(name: &str, category: &str, prices: &[(&str, u64)]) -> Product {
        Product {
            id: None,
            brand: None,
            name: name.to_string(),
            size: "500g".to_string(),
            category: category.to_string(),
            prices: prices
                .iter()
                .map(|(s, p)| PriceObservation::new(*s, *p, format!("https://shop/{}", s)))
                .collect(),
        }
    }

    fn snapshot(products: Vec<Product>) -> Snapshot {
        Snapshot { products, query: "cafe buendia".to_string(), last_update: String::new() }
    }

    #[test]
    fn test_empty_snapshot_reports_query() {
        let snap = Snapshot { query: "oat milk".to_string(), ..Snapshot::default() };
        let view = render(&snap, &CategoryFilter::All).unwrap();

        assert_eq!(view, ViewModel::NoResults { query: "oat milk".to_string() });
        assert!(view.empty_message().unwrap().contains("No results for \"oat milk\""));
    }

    #[test]
    fn test_empty_category_is_distinct() {
        let snap = snapshot(vec![product("Café", "Classic", &[("D1", 900)])]);
        let view = render(&snap, &CategoryFilter::Category("Decaf".to_string())).unwrap();

        assert_eq!(view, ViewModel::EmptyCategory { category: "Decaf".to_string() });
        let msg = view.empty_message().unwrap();
        assert!(msg.contains("No results in category \"Decaf\""));
        assert!(!msg.contains("cafe buendia"));
    }

    #[test]
    fn test_empty_snapshot_wins_over_category() {
        let snap = Snapshot::default();
        let view = render(&snap, &CategoryFilter::Category("Decaf".to_string())).unwrap();
        assert!(matches!(view, ViewModel::NoResults { .. }));
    }

    #[test]
    fn test_filter_by_category() {
        let snap = snapshot(vec![
            product("Café Tradicional", "Classic", &[("D1", 900)]),
            product("Café Descafeinado", "Decaf", &[("Éxito", 1500)]),
        ]);

        let all = render(&snap, &CategoryFilter::All).unwrap();
        assert_eq!(all.cards().len(), 2);

        let decaf = render(&snap, &"Decaf".parse().unwrap()).unwrap();
        assert_eq!(decaf.cards().len(), 1);
        assert_eq!(decaf.cards()[0].name, "Café Descafeinado");
    }

    #[test]
    fn test_card_marks_all_best() {
        let snap = snapshot(vec![product(
            "Café",
            "Classic",
            &[("Éxito", 1000), ("D1", 900), ("Makro", 900), ("Metro", 1200)],
        )]);
        let view = render(&snap, &CategoryFilter::All).unwrap();
        let card = &view.cards()[0];

        assert_eq!(card.best_price, 900);
        assert_eq!(card.best_price_display, "$\u{a0}900");
        assert_eq!(card.savings, 300);
        assert_eq!(card.best_offers().count(), 2);
        assert_eq!(card.prices[0].supermarket, "D1");
        assert_eq!(card.prices[3].price_display, "$\u{a0}1.200");
        assert!(card.prices[1].is_best);
        assert!(!card.prices[2].is_best);
    }

    #[test]
    fn test_product_fields_untouched() {
        let snap = snapshot(vec![product("Café Sello Rojo", "Classic", &[("Ara", 7000)])]);
        let view = render(&snap, &CategoryFilter::All).unwrap();
        let card = &view.cards()[0];
        assert_eq!(card.name, "Café Sello Rojo");
        assert_eq!(card.size, "500g");
        assert_eq!(card.category, "Classic");
    }

    #[test]
    fn test_product_without_prices_is_an_error() {
        let snap = snapshot(vec![product("Broken", "Classic", &[])]);
        assert_eq!(render(&snap, &CategoryFilter::All), Err(AggregateError::EmptyObservations));
    }

    #[test]
    fn test_category_filter_parsing() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!("ALL".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!("".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "Decaf".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Category("Decaf".to_string())
        );
        assert_eq!(CategoryFilter::All.to_string(), "all");
    }

    #[test]
    fn test_category_filter_serde() {
        let filter: CategoryFilter = serde_json::from_str("\"Classic\"").unwrap();
        assert_eq!(filter, CategoryFilter::Category("Classic".to_string()));
        assert_eq!(serde_json::to_string(&CategoryFilter::All).unwrap(), "\"all\"");
    }

    #[test]
    fn test_categories_first_seen_order() {
        let snap = snapshot(vec![
            product("A", "Decaf", &[("D1", 1)]),
            product("B", "Classic", &[("D1", 1)]),
            product("C", "Decaf", &[("D1", 1)]),
        ]);
        assert_eq!(categories(&snap), vec!["Decaf", "Classic"]);
    }
}
