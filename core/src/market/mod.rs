//! Market-like resolution of requests and offers
//!
//! Price discovery is out of scope: the engine only needs an abstract
//! channel that turns the Tick phase's requests and offers into committed
//! transactions. `MarketResolver` is that seam; `FifoMatcher` is the
//! reference implementation used by the engine and the tests.

use crate::models::material::MASS_EPSILON;
use crate::models::transaction::Transaction;
use crate::models::commodity::Commodity;

/// A request or offer as seen by the resolver: who, what, how much
#[derive(Debug, Clone, PartialEq)]
pub struct CommodityBid {
    pub facility_id: String,
    pub commodity: Commodity,
    pub mass: f64,
}

/// Abstract market collaborator
///
/// Receives every request and offer announced during a month's Tick phase
/// and returns the transactions it commits. A request with no matching
/// offer simply yields no transaction — an empty result, not an error.
pub trait MarketResolver {
    fn resolve(
        &mut self,
        month: u32,
        requests: &[CommodityBid],
        offers: &[CommodityBid],
    ) -> Vec<Transaction>;
}

/// Greedy first-come matcher
///
/// Walks requests in announcement order and fills each from the earliest
/// announced offers of the same commodity, allowing partial matches. A
/// facility is never matched against itself.
///
/// # Example
/// ```
/// use material_sim_core::{Commodity, CommodityBid, FifoMatcher, MarketResolver};
///
/// let requests = vec![CommodityBid {
///     facility_id: "reactor".to_string(),
///     commodity: Commodity::new("fresh_fuel"),
///     mass: 10.0,
/// }];
/// let offers = vec![CommodityBid {
///     facility_id: "enrichment".to_string(),
///     commodity: Commodity::new("fresh_fuel"),
///     mass: 6.0,
/// }];
///
/// let mut matcher = FifoMatcher;
/// let commitments = matcher.resolve(0, &requests, &offers);
/// assert_eq!(commitments.len(), 1);
/// assert_eq!(commitments[0].mass(), 6.0);
/// ```
#[derive(Debug, Default)]
pub struct FifoMatcher;

impl MarketResolver for FifoMatcher {
    fn resolve(
        &mut self,
        month: u32,
        requests: &[CommodityBid],
        offers: &[CommodityBid],
    ) -> Vec<Transaction> {
        let mut remaining: Vec<f64> = offers.iter().map(|o| o.mass).collect();
        let mut commitments = Vec::new();

        for request in requests {
            let mut wanted = request.mass;

            for (offer, available) in offers.iter().zip(remaining.iter_mut()) {
                if wanted <= MASS_EPSILON {
                    break;
                }
                if offer.commodity != request.commodity
                    || offer.facility_id == request.facility_id
                    || *available <= MASS_EPSILON
                {
                    continue;
                }

                let matched = wanted.min(*available);
                *available -= matched;
                wanted -= matched;

                commitments.push(Transaction::new(
                    request.commodity.clone(),
                    matched,
                    offer.facility_id.clone(),
                    request.facility_id.clone(),
                    month,
                ));
            }
        }

        commitments
    }
}
