//! Wall-clock access and the trailing month window.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Utc};

/// Seconds east of UTC for Korea Standard Time.
pub const KST_OFFSET_SECS: i32 = 9 * 3600;

/// Source of "now". Injected so month windows and baseline dates are testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    /// Calendar date in the clock's offset.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// System time viewed at a fixed offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// Falls back to UTC if `offset_secs` is out of range.
    pub fn with_offset(offset_secs: i32) -> Self {
        Self {
            offset: FixedOffset::east_opt(offset_secs).unwrap_or_else(|| Utc.fix()),
        }
    }

    pub fn kst() -> Self {
        Self::with_offset(KST_OFFSET_SECS)
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::kst()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// `YYYYMM` tokens for the `window` calendar months ending at `today`'s month.
///
/// Most recent first. A zero window yields no months.
pub fn recent_year_months(today: NaiveDate, window: u32) -> Vec<String> {
    let anchor = today.year() * 12 + today.month0() as i32;
    (0..window as i32)
        .map(|i| {
            let idx = anchor - i;
            let year = idx.div_euclid(12);
            let month = idx.rem_euclid(12) + 1;
            format!("{year:04}{month:02}")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_within_year() {
        assert_eq!(
            recent_year_months(date(2025, 6, 15), 3),
            vec!["202506", "202505", "202504"]
        );
    }

    #[test]
    fn window_crosses_year_boundary() {
        assert_eq!(
            recent_year_months(date(2025, 2, 1), 3),
            vec!["202502", "202501", "202412"]
        );
    }

    #[test]
    fn window_includes_current_month_only() {
        assert_eq!(recent_year_months(date(2025, 1, 31), 1), vec!["202501"]);
        assert!(recent_year_months(date(2025, 1, 31), 0).is_empty());
    }

    #[test]
    fn window_of_a_full_year() {
        let months = recent_year_months(date(2024, 12, 1), 12);
        assert_eq!(months.len(), 12);
        assert_eq!(months.first().unwrap(), "202412");
        assert_eq!(months.last().unwrap(), "202401");
    }

    #[test]
    fn fixed_clock_today_uses_offset() {
        // 2025-03-31T20:00Z is already April 1st in Seoul.
        let now = DateTime::parse_from_rfc3339("2025-04-01T05:00:00+09:00").unwrap();
        let clock = FixedClock(now);
        assert_eq!(clock.today(), date(2025, 4, 1));
    }

    #[test]
    fn system_clock_reports_kst() {
        let now = SystemClock::kst().now();
        assert_eq!(now.offset().local_minus_utc(), KST_OFFSET_SECS);
    }
}
