//! New-deal detection against a checkpointed baseline.
//!
//! A deal is new when its [`Deal::identity`] is absent from the baseline.
//! Detection is a pure function of its inputs: it never advances the
//! baseline, so repeated calls with the same pair flag the same deals.

use std::collections::{HashMap, HashSet};

use crate::deal::{ApartmentAggregate, Deal, FlaggedDeal};

/// Detector output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Every current deal, in input order, annotated.
    pub deals: Vec<FlaggedDeal>,
    /// The subset flagged new, in input order.
    pub new_deals: Vec<FlaggedDeal>,
}

impl Detection {
    pub fn new_count(&self) -> usize {
        self.new_deals.len()
    }

    /// Set each aggregate's `new_count` from the flagged deals.
    pub fn apply_new_counts(&self, stats: &mut [ApartmentAggregate]) {
        let mut per_apartment: HashMap<&str, usize> = HashMap::new();
        for flagged in &self.new_deals {
            *per_apartment
                .entry(flagged.deal.apartment_name.as_str())
                .or_default() += 1;
        }
        for stat in stats {
            stat.new_count = per_apartment.get(stat.name.as_str()).copied().unwrap_or(0);
        }
    }
}

/// Flag the deals in `current` that are not in `baseline`.
///
/// With no baseline every deal is new.
pub fn detect_new(current: &[Deal], baseline: Option<&[Deal]>) -> Detection {
    let known: HashSet<String> = baseline
        .unwrap_or_default()
        .iter()
        .map(Deal::identity)
        .collect();

    let deals: Vec<FlaggedDeal> = current
        .iter()
        .map(|deal| {
            let is_new = !known.contains(&deal.identity());
            FlaggedDeal::new(deal.clone(), is_new)
        })
        .collect();
    let new_deals = deals.iter().filter(|d| d.is_new).cloned().collect();

    Detection { deals, new_deals }
}
