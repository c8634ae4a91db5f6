//! Raw registry record → canonical [`Deal`].

use crate::deal::{Deal, RawRegistryRecord};
use crate::price::{format_price, parse_price, price_per_pyeong};

/// The neighborhood the site covers.
pub const DEFAULT_NEIGHBORHOOD: &str = "논현동";

/// Normalise one registry record.
///
/// Returns `None` when the apartment name or amount is empty, the parsed price
/// is not positive, or the record lies outside `neighborhood` (exact match).
pub fn normalize(raw: &RawRegistryRecord, neighborhood: &str) -> Option<Deal> {
    let apartment_name = raw.apartment_name.trim();
    let amount = raw.amount.trim();
    if apartment_name.is_empty() || amount.is_empty() {
        return None;
    }

    let location = raw.neighborhood.trim();
    if location != neighborhood {
        return None;
    }

    let price = parse_price(amount);
    if price <= 0 {
        return None;
    }

    let area = raw.area.trim();
    Some(Deal {
        apartment_name: apartment_name.to_string(),
        area_sqm: format!("{area}㎡"),
        floor: format!("{}층", raw.floor.trim()),
        price_manwon: price,
        price_formatted: format_price(price),
        deal_date: format_deal_date(&raw.deal_year, &raw.deal_month, &raw.deal_day),
        build_year: raw.build_year.trim().to_string(),
        location: location.to_string(),
        price_per_pyeong: price_per_pyeong(price, area),
    })
}

/// `YYYY.MM.DD`, left-padding each component with zeros.
pub fn format_deal_date(year: &str, month: &str, day: &str) -> String {
    format!(
        "{:0>4}.{:0>2}.{:0>2}",
        year.trim(),
        month.trim(),
        day.trim()
    )
}
