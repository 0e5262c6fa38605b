//! OHLCV candle representation.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PricePoint {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// Reason this candle cannot be used on its own, if any.
    pub fn defect(&self) -> Option<String> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Some(format!("{name} is not a finite number"));
            }
            if value < 0.0 {
                return Some(format!("{name} is negative ({value})"));
            }
        }
        if self.high < self.low {
            return Some(format!("high {} below low {}", self.high, self.low));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_point() -> PricePoint {
        PricePoint {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn true_range_hl_dominates() {
        let p = sample_point();
        // high-low=20, |high-100|=10, |low-100|=10 → 20
        assert!((p.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let p = sample_point();
        // high-low=20, |110-70|=40, |90-70|=20 → 40
        assert!((p.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let p = sample_point();
        assert!((p.true_range(130.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn clean_point_has_no_defect() {
        assert_eq!(sample_point().defect(), None);
    }

    #[test]
    fn nan_close_is_defect() {
        let mut p = sample_point();
        p.close = f64::NAN;
        assert!(p.defect().unwrap().contains("close"));
    }

    #[test]
    fn negative_volume_is_defect() {
        let mut p = sample_point();
        p.volume = -1.0;
        assert!(p.defect().unwrap().contains("volume"));
    }

    #[test]
    fn inverted_range_is_defect() {
        let mut p = sample_point();
        p.high = 80.0;
        assert!(p.defect().unwrap().contains("below low"));
    }
}
