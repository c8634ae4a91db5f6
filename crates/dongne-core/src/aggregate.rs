//! Deduplication and per-apartment aggregation.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::debug;

use crate::deal::{ApartmentAggregate, Deal, MarketSummary};
use crate::price::{format_price, round_half_up};

/// Result of one dedup/aggregate pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// Most recent first, one entry per (apartment, area, floor, date).
    pub deals: Vec<Deal>,
    /// Sorted by average price, highest first.
    pub stats: Vec<ApartmentAggregate>,
    pub summary: MarketSummary,
}

/// Parse a canonical `YYYY.MM.DD` deal date.
pub fn parse_deal_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y.%m.%d").ok()
}

/// `최근 N개월`.
pub fn period_label(months: u32) -> String {
    format!("최근 {months}개월")
}

/// Sort, deduplicate and aggregate a deal list.
///
/// Deals are ordered by date descending; the sort is stable and unparsable
/// dates go last. The first deal of each (apartment, area, floor, date) tuple
/// wins even if a later one carries a different price.
pub fn dedupe_and_aggregate(mut deals: Vec<Deal>, months: u32) -> Aggregation {
    deals.sort_by_key(|d| Reverse(parse_deal_date(&d.deal_date)));

    let before = deals.len();
    let mut seen = HashSet::new();
    let deals: Vec<Deal> = deals
        .into_iter()
        .filter(|d| {
            let key = d.dedup_key();
            seen.insert((
                key.0.to_string(),
                key.1.to_string(),
                key.2.to_string(),
                key.3.to_string(),
            ))
        })
        .collect();
    debug!(before, after = deals.len(), "deduplicated deals");

    let stats = apartment_stats(&deals);
    let summary = summarize(&deals, months);
    Aggregation {
        deals,
        stats,
        summary,
    }
}

fn apartment_stats(deals: &[Deal]) -> Vec<ApartmentAggregate> {
    // (name, count, total) in first-seen order.
    let mut order: Vec<(&str, usize, i64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for deal in deals {
        let i = *index.entry(deal.apartment_name.as_str()).or_insert_with(|| {
            order.push((deal.apartment_name.as_str(), 0, 0));
            order.len() - 1
        });
        order[i].1 += 1;
        order[i].2 += deal.price_manwon;
    }

    let mut stats: Vec<ApartmentAggregate> = order
        .into_iter()
        .map(|(name, count, total)| {
            let avg = round_half_up(total as f64 / count as f64);
            ApartmentAggregate {
                name: name.to_string(),
                count,
                avg_price: format_price(avg),
                avg_price_numeric: avg,
                new_count: 0,
            }
        })
        .collect();
    stats.sort_by_key(|s| Reverse(s.avg_price_numeric));
    stats
}

fn summarize(deals: &[Deal], months: u32) -> MarketSummary {
    let total_deals = deals.len();
    let (avg, max, min) = if deals.is_empty() {
        (0, 0, 0)
    } else {
        let sum: i64 = deals.iter().map(|d| d.price_manwon).sum();
        let max = deals.iter().map(|d| d.price_manwon).max().unwrap_or(0);
        let min = deals.iter().map(|d| d.price_manwon).min().unwrap_or(0);
        (round_half_up(sum as f64 / total_deals as f64), max, min)
    };
    MarketSummary {
        total_deals,
        avg_price: format_price(avg),
        max_price: format_price(max),
        min_price: format_price(min),
        avg_price_numeric: avg,
        max_price_numeric: max,
        min_price_numeric: min,
        period: period_label(months),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn deal(apt: &str, area: &str, floor: &str, date: &str, price: i64) -> Deal {
        Deal {
            apartment_name: apt.into(),
            area_sqm: area.into(),
            floor: floor.into(),
            price_manwon: price,
            price_formatted: format_price(price),
            deal_date: date.into(),
            build_year: String::new(),
            location: "논현동".into(),
            price_per_pyeong: String::new(),
        }
    }

    #[test]
    fn sorts_most_recent_first() {
        let agg = dedupe_and_aggregate(
            vec![
                deal("A", "84㎡", "1층", "2025.01.03", 1),
                deal("B", "84㎡", "1층", "2025.02.01", 2),
                deal("C", "84㎡", "1층", "2024.12.31", 3),
            ],
            3,
        );
        let dates: Vec<&str> = agg.deals.iter().map(|d| d.deal_date.as_str()).collect();
        assert_eq!(dates, vec!["2025.02.01", "2025.01.03", "2024.12.31"]);
    }

    #[test]
    fn equal_dates_keep_input_order() {
        let agg = dedupe_and_aggregate(
            vec![
                deal("A", "84㎡", "1층", "2025.01.03", 1),
                deal("B", "84㎡", "1층", "2025.01.03", 2),
                deal("C", "84㎡", "1층", "2025.01.03", 3),
            ],
            3,
        );
        let names: Vec<&str> = agg
            .deals
            .iter()
            .map(|d| d.apartment_name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn unparsable_dates_sort_last() {
        let agg = dedupe_and_aggregate(
            vec![
                deal("X", "84㎡", "1층", "0000.00.00", 1),
                deal("A", "84㎡", "1층", "2025.01.03", 1),
            ],
            3,
        );
        assert_eq!(agg.deals[0].apartment_name, "A");
        assert_eq!(agg.deals[1].apartment_name, "X");
    }

    #[test]
    fn first_duplicate_wins_even_with_different_price() {
        let agg = dedupe_and_aggregate(
            vec![
                deal("A", "84㎡", "5층", "2025.01.03", 50000),
                deal("A", "84㎡", "5층", "2025.01.03", 51000),
                deal("A", "84㎡", "6층", "2025.01.03", 52000),
            ],
            3,
        );
        assert_eq!(agg.deals.len(), 2);
        assert_eq!(agg.deals[0].price_manwon, 50000);
        assert_eq!(agg.deals[1].floor, "6층");
    }

    #[test]
    fn apartment_stats_sorted_by_average() {
        let agg = dedupe_and_aggregate(
            vec![
                deal("A", "84㎡", "1층", "2025.01.01", 30000),
                deal("A", "84㎡", "2층", "2025.01.01", 30001),
                deal("B", "59㎡", "3층", "2025.01.02", 60000),
            ],
            3,
        );
        assert_eq!(agg.stats.len(), 2);
        assert_eq!(agg.stats[0].name, "B");
        assert_eq!(agg.stats[0].count, 1);
        assert_eq!(agg.stats[1].name, "A");
        assert_eq!(agg.stats[1].count, 2);
        // 30000.5 rounds up.
        assert_eq!(agg.stats[1].avg_price_numeric, 30001);
        assert_eq!(agg.stats[1].avg_price, "3억 1만원");
        assert!(agg.stats.iter().all(|s| s.new_count == 0));
    }

    #[test]
    fn summary_over_deduplicated_set() {
        let agg = dedupe_and_aggregate(
            vec![
                deal("A", "84㎡", "1층", "2025.01.01", 30000),
                deal("A", "84㎡", "1층", "2025.01.01", 99999),
                deal("B", "59㎡", "3층", "2025.01.02", 60000),
            ],
            6,
        );
        let s = agg.summary;
        assert_eq!(s.total_deals, 2);
        assert_eq!(s.avg_price_numeric, 45000);
        assert_eq!(s.max_price, "6억원");
        assert_eq!(s.min_price, "3억원");
        assert_eq!(s.period, "최근 6개월");
    }

    #[test]
    fn empty_input() {
        let agg = dedupe_and_aggregate(Vec::new(), 3);
        assert!(agg.deals.is_empty());
        assert!(agg.stats.is_empty());
        assert_eq!(agg.summary.total_deals, 0);
        assert_eq!(agg.summary.avg_price_numeric, 0);
        assert_eq!(agg.summary.max_price_numeric, 0);
        assert_eq!(agg.summary.min_price, "0만원");
    }

    fn arb_deal() -> impl Strategy<Value = Deal> {
        (
            prop::sample::select(vec!["A", "B", "C"]),
            prop::sample::select(vec!["59㎡", "84㎡"]),
            prop::sample::select(vec!["1층", "2층"]),
            (1u32..=3, 1u32..=3),
            1i64..200_000,
        )
            .prop_map(|(apt, area, floor, (m, d), price)| {
                deal(apt, area, floor, &format!("2025.{m:02}.{d:02}"), price)
            })
    }

    proptest! {
        #[test]
        fn dedupe_is_idempotent(deals in prop::collection::vec(arb_deal(), 0..60)) {
            let once = dedupe_and_aggregate(deals, 3);
            let twice = dedupe_and_aggregate(once.deals.clone(), 3);
            prop_assert_eq!(&twice.deals, &once.deals);
            prop_assert_eq!(&twice.stats, &once.stats);
        }

        #[test]
        fn dedupe_leaves_unique_keys(deals in prop::collection::vec(arb_deal(), 0..60)) {
            let agg = dedupe_and_aggregate(deals, 3);
            let keys: HashSet<_> = agg.deals.iter().map(|d| d.dedup_key()).collect();
            prop_assert_eq!(keys.len(), agg.deals.len());
            let counted: usize = agg.stats.iter().map(|s| s.count).sum();
            prop_assert_eq!(counted, agg.deals.len());
        }
    }
}
