//! Terminal rendering for reports and baseline status.

use dongne_core::{ApartmentAggregate, FlaggedDeal, MarketSummary};

use crate::ingest::{BaselineStatus, IngestReport};

const MAX_APARTMENTS: usize = 10;

// ── Public API ──

/// Print a report as a summary card followed by per-complex stats and deals.
pub fn print_report(report: &IngestReport, new_only: bool) {
    println!("=== {} · {} ===", report.location, report.statistics.period);
    match report.baseline_date {
        Some(date) => println!("baseline {date}, {} new", report.new_count()),
        None => println!("no baseline, every deal counts as new"),
    }
    println!();

    print_summary(&report.statistics);
    print_apartments(&report.apartment_stats);

    let deals = if new_only {
        &report.new_deals
    } else {
        &report.deals
    };
    println!("{}", if new_only { "New deals" } else { "Deals" });
    if deals.is_empty() {
        println!("  (none)");
    }
    for deal in deals {
        println!("  {}", deal_line(deal));
    }
}

pub fn print_baseline_status(status: &BaselineStatus) {
    match &status.snapshot {
        Some(snap) => {
            println!("Baseline");
            println!("  {:<14} {}", "captured", snap.captured_at.to_rfc3339());
            println!("  {:<14} {}", "deals", snap.deals.len());
        }
        None => println!("No baseline stored."),
    }
    println!(
        "  {:<14} {}",
        "refresh due",
        if status.refresh_due { "yes" } else { "no" }
    );
}

// ── Sections ──

fn print_summary(summary: &MarketSummary) {
    println!("Market");
    println!("  {:<14} {}", "deals", summary.total_deals);
    if summary.total_deals > 0 {
        println!("  {:<14} {}", "average", summary.avg_price);
        println!("  {:<14} {}", "highest", summary.max_price);
        println!("  {:<14} {}", "lowest", summary.min_price);
    }
    println!();
}

fn print_apartments(stats: &[ApartmentAggregate]) {
    if stats.is_empty() {
        return;
    }
    println!("Complexes");
    for s in stats.iter().take(MAX_APARTMENTS) {
        let new = if s.new_count > 0 {
            format!("  +{} new", s.new_count)
        } else {
            String::new()
        };
        println!("  {:<24} {:>3}건  avg {}{new}", s.name, s.count, s.avg_price);
    }
    if stats.len() > MAX_APARTMENTS {
        println!("  ... and {} more", stats.len() - MAX_APARTMENTS);
    }
    println!();
}

fn deal_line(flagged: &FlaggedDeal) -> String {
    let d = &flagged.deal;
    let marker = if flagged.is_new { "NEW" } else { "   " };
    format!(
        "{marker} {} {} {} {} {} ({}/평)",
        d.deal_date, d.apartment_name, d.area_sqm, d.floor, d.price_formatted, d.price_per_pyeong
    )
}
