//! Best-price reduction over a product's retailer prices.

use crate::sync::models::PriceObservation;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    /// Products always carry at least one price; an empty list is an upstream bug.
    #[error("invariant violated: product has no price observations")]
    EmptyObservations,
}

/// A price observation with its best-price marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedObservation {
    #[serde(flatten)]
    pub observation: PriceObservation,
    pub is_best: bool,
}

/// Returns the lowest price among the observations.
pub fn best_price(observations: &[PriceObservation]) -> Result<u64, AggregateError> {
    observations.iter().map(|o| o.price).min().ok_or(AggregateError::EmptyObservations)
}

/// Sorts observations cheapest first and marks every one at the minimum price.
///
/// The sort is stable, so retailers tied on price keep the server's order.
pub fn with_best_flag(
    observations: &[PriceObservation],
) -> Result<Vec<RankedObservation>, AggregateError> {
    let best = best_price(observations)?;

    let mut sorted = observations.to_vec();
    sorted.sort_by_key(|o| o.price);

    Ok(sorted
        .into_iter()
        .map(|observation| RankedObservation { is_best: observation.price == best, observation })
        .collect())
}

/// Difference between the most expensive and the cheapest retailer.
pub fn savings(observations: &[PriceObservation]) -> Result<u64, AggregateError> {
    let best = best_price(observations)?;
    let worst = observations.iter().map(|o| o.price).max().unwrap_or(best);
    Ok(worst - best)
}
