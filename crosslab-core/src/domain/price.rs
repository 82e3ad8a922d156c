//! Price points and the ordered series the pipeline consumes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{BacktestError, Result};

/// A single observation: a date and its closing price.
///
/// The price is either a positive finite number or NaN (missing).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }

    /// True when the price can be traded against (present and positive).
    pub fn is_tradable(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// An ordered, validated price series with strictly increasing dates.
///
/// Serializes as a bare list of points; deserializing runs the same
/// validation as [`PriceSeries::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Validate and wrap a sequence of price points.
    ///
    /// Rejects dates that do not strictly increase and prices that are
    /// neither NaN nor a positive finite number.
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        for (i, point) in points.iter().enumerate() {
            if !point.price.is_nan() && !point.is_tradable() {
                return Err(BacktestError::invalid(
                    "prices",
                    format!("price at index {i} ({}) must be positive or NaN", point.price),
                ));
            }
            if i > 0 && point.date <= points[i - 1].date {
                return Err(BacktestError::invalid(
                    "prices",
                    format!(
                        "dates must strictly increase: index {i} ({}) follows {}",
                        point.date,
                        points[i - 1].date
                    ),
                ));
            }
        }
        Ok(Self { points })
    }

    /// Zip parallel date and price vectors into a validated series.
    pub fn from_parts(dates: &[NaiveDate], prices: &[f64]) -> Result<Self> {
        if dates.len() != prices.len() {
            return Err(BacktestError::LengthMismatch {
                left: dates.len(),
                right: prices.len(),
            });
        }
        let points = dates
            .iter()
            .zip(prices)
            .map(|(&date, &price)| PricePoint::new(date, price))
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Keep only points whose date falls inside `[start, end]` (either bound optional).
    pub fn slice_dates(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let points = self
            .points
            .iter()
            .filter(|p| start.map_or(true, |s| p.date >= s) && end.map_or(true, |e| p.date <= e))
            .copied()
            .collect();
        Self { points }
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = BacktestError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn accepts_increasing_dates_and_nan() {
        let series = PriceSeries::from_parts(&[d(2), d(3), d(4)], &[10.0, f64::NAN, 11.0]).unwrap();
        assert_eq!(series.len(), 3);
        assert!(series.prices()[1].is_nan());
    }

    #[test]
    fn rejects_repeated_date() {
        let err = PriceSeries::from_parts(&[d(2), d(2)], &[10.0, 11.0]).unwrap_err();
        assert!(matches!(err, BacktestError::InvalidParameter { param: "prices", .. }));
    }

    #[test]
    fn rejects_non_positive_price() {
        assert!(PriceSeries::from_parts(&[d(2), d(3)], &[10.0, 0.0]).is_err());
        assert!(PriceSeries::from_parts(&[d(2), d(3)], &[10.0, -1.0]).is_err());
        assert!(PriceSeries::from_parts(&[d(2)], &[f64::INFINITY]).is_err());
    }

    #[test]
    fn rejects_misaligned_parts() {
        let err = PriceSeries::from_parts(&[d(2)], &[1.0, 2.0]).unwrap_err();
        assert_eq!(err, BacktestError::LengthMismatch { left: 1, right: 2 });
    }

    #[test]
    fn slice_dates_is_inclusive() {
        let series =
            PriceSeries::from_parts(&[d(2), d(3), d(4), d(5)], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let sliced = series.slice_dates(Some(d(3)), Some(d(4)));
        assert_eq!(sliced.prices(), vec![2.0, 3.0]);
        assert_eq!(series.slice_dates(None, None).len(), 4);
    }

    #[test]
    fn deserialize_validates_points() {
        let unsorted = r#"[
            {"date": "2024-01-03", "price": 10.0},
            {"date": "2024-01-02", "price": 11.0}
        ]"#;
        let err = serde_json::from_str::<PriceSeries>(unsorted).unwrap_err();
        assert!(err.to_string().contains("dates must strictly increase"));

        let negative = r#"[{"date": "2024-01-02", "price": -5.0}]"#;
        assert!(serde_json::from_str::<PriceSeries>(negative).is_err());
    }

    #[test]
    fn json_keeps_a_valid_series() {
        let series = PriceSeries::from_parts(&[d(2), d(3)], &[10.0, 10.5]).unwrap();
        let json = serde_json::to_string(&series).unwrap();
        assert!(json.starts_with('['));
        let back: PriceSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(back, series);
    }
}
