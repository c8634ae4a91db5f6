//! Shared deal types passed between the registry client, the baseline store and the API.

use serde::{Deserialize, Serialize};

/// One `<item>` from the MOLIT apartment trade registry, before normalisation.
///
/// Every field is kept as the raw string the registry sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRegistryRecord {
    pub apartment_name: String,
    /// Exclusive-use area in square meters, no unit.
    pub area: String,
    pub floor: String,
    /// Deal amount in 만원, may contain thousands separators.
    pub amount: String,
    pub deal_year: String,
    pub deal_month: String,
    pub deal_day: String,
    pub build_year: String,
    /// Neighborhood (`umdNm`), the geographic filter.
    pub neighborhood: String,
}

/// A canonical apartment sale.
///
/// Wire names match what the widgets and previously stored baselines use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub apartment_name: String,
    /// Area with unit suffix, e.g. `84.97㎡`.
    #[serde(rename = "area")]
    pub area_sqm: String,
    /// Floor with unit suffix, e.g. `5층`.
    pub floor: String,
    /// Price in 만원 (10,000 KRW).
    #[serde(rename = "price_numeric")]
    pub price_manwon: i64,
    /// Human-readable price, e.g. `3억 5,000만원`.
    #[serde(rename = "price")]
    pub price_formatted: String,
    /// `YYYY.MM.DD`.
    pub deal_date: String,
    #[serde(default)]
    pub build_year: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub price_per_pyeong: String,
}

impl Deal {
    /// Stable key for "same real-world transaction".
    ///
    /// The registry exposes no transaction id, so two deals sharing apartment,
    /// area, floor, date and price collapse into one.
    pub fn identity(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}",
            self.apartment_name, self.area_sqm, self.floor, self.deal_date, self.price_manwon
        )
    }

    /// Key used for deduplication. Price is deliberately not part of it.
    pub fn dedup_key(&self) -> (&str, &str, &str, &str) {
        (
            &self.apartment_name,
            &self.area_sqm,
            &self.floor,
            &self.deal_date,
        )
    }
}

/// A deal annotated by the new-deal detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedDeal {
    #[serde(flatten)]
    pub deal: Deal,
    #[serde(rename = "uniqueId")]
    pub unique_id: String,
    #[serde(rename = "isNew")]
    pub is_new: bool,
}

impl FlaggedDeal {
    pub fn new(deal: Deal, is_new: bool) -> Self {
        let unique_id = deal.identity();
        Self {
            deal,
            unique_id,
            is_new,
        }
    }

    /// Drop the annotation, leaving the clean deal that goes into a baseline.
    pub fn into_deal(self) -> Deal {
        self.deal
    }
}

/// Per-apartment statistics recomputed on every ingestion cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApartmentAggregate {
    pub name: String,
    pub count: usize,
    pub avg_price: String,
    pub avg_price_numeric: i64,
    #[serde(rename = "newCount", default)]
    pub new_count: usize,
}

/// Whole-window statistics over the deduplicated deal list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub total_deals: usize,
    pub avg_price: String,
    pub max_price: String,
    pub min_price: String,
    pub avg_price_numeric: i64,
    pub max_price_numeric: i64,
    pub min_price_numeric: i64,
    /// e.g. `최근 3개월`.
    pub period: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Deal {
        Deal {
            apartment_name: "논현주공".into(),
            area_sqm: "84.97㎡".into(),
            floor: "5층".into(),
            price_manwon: 50000,
            price_formatted: "5억원".into(),
            deal_date: "2025.01.01".into(),
            build_year: "2003".into(),
            location: "논현동".into(),
            price_per_pyeong: "1,942만원".into(),
        }
    }

    #[test]
    fn identity_joins_five_fields() {
        assert_eq!(sample().identity(), "논현주공-84.97㎡-5층-2025.01.01-50000");
    }

    #[test]
    fn identity_ignores_non_identity_fields() {
        let a = sample();
        let mut b = sample();
        b.build_year = "1999".into();
        b.price_per_pyeong = "계산불가".into();
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn deal_uses_wire_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["area"], "84.97㎡");
        assert_eq!(json["price_numeric"], 50000);
        assert_eq!(json["price"], "5억원");
        assert!(json.get("area_sqm").is_none());
    }

    #[test]
    fn flagged_deal_flattens() {
        let flagged = FlaggedDeal::new(sample(), true);
        let json = serde_json::to_value(&flagged).unwrap();
        assert_eq!(json["apartment_name"], "논현주공");
        assert_eq!(json["isNew"], true);
        assert_eq!(json["uniqueId"], "논현주공-84.97㎡-5층-2025.01.01-50000");
        assert!(json.get("unique_id").is_none());
    }

    fn keys(value: &serde_json::Value) -> Vec<&str> {
        let mut keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn flagged_deal_wire_keys() {
        let json = serde_json::to_value(FlaggedDeal::new(sample(), false)).unwrap();
        assert_eq!(
            keys(&json),
            vec![
                "apartment_name",
                "area",
                "build_year",
                "deal_date",
                "floor",
                "isNew",
                "location",
                "price",
                "price_numeric",
                "price_per_pyeong",
                "uniqueId",
            ]
        );
    }

    #[test]
    fn aggregate_wire_keys() {
        let stats = ApartmentAggregate {
            name: "A".into(),
            count: 2,
            avg_price: "5억원".into(),
            avg_price_numeric: 50000,
            new_count: 1,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(
            keys(&json),
            vec!["avg_price", "avg_price_numeric", "count", "name", "newCount"]
        );
        assert_eq!(json["newCount"], 1);
    }

    #[test]
    fn flagged_deal_round_trips_to_clean_deal() {
        let json = serde_json::to_string(&FlaggedDeal::new(sample(), true)).unwrap();
        let flagged: FlaggedDeal = serde_json::from_str(&json).unwrap();
        assert!(flagged.is_new);
        assert_eq!(flagged.into_deal(), sample());
    }

    #[test]
    fn deal_tolerates_missing_optional_fields() {
        let json = r#"{
            "apartment_name": "A",
            "area": "84㎡",
            "floor": "5층",
            "price_numeric": 50000,
            "price": "5억원",
            "deal_date": "2025.01.01"
        }"#;
        let deal: Deal = serde_json::from_str(json).unwrap();
        assert!(deal.location.is_empty());
        assert_eq!(deal.identity(), "A-84㎡-5층-2025.01.01-50000");
    }

    #[test]
    fn flagged_deal_accepts_annotated_input() {
        // Clients echo back annotated deals as `previousData`.
        let json = r#"{
            "apartment_name": "A",
            "area": "84㎡",
            "floor": "5층",
            "price_numeric": 50000,
            "price": "5억원",
            "deal_date": "2025.01.01",
            "uniqueId": "A-84㎡-5층-2025.01.01-50000",
            "isNew": true
        }"#;
        let deal: Deal = serde_json::from_str(json).unwrap();
        assert_eq!(deal.apartment_name, "A");
    }
}
