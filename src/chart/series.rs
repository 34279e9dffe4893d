use chrono::NaiveDate;
use serde::Serialize;

use super::date::normalize_date;
use super::price::normalize_price;
use super::raw::{ParseFailure, RawRecord};
use crate::instruments::color_for;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// One instrument's normalized, date-ordered price series.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSeries {
    pub label: String,
    pub color: Option<&'static str>,
    pub points: Vec<PricePoint>,
}

/// Records dropped during assembly, by reason. Reported per instrument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropCounts {
    pub missing_price: usize,
    pub invalid_price: usize,
    pub missing_date: usize,
    pub invalid_date: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.missing_price + self.invalid_price + self.missing_date + self.invalid_date
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesAssembly {
    /// `None` when no record survived normalization.
    pub series: Option<InstrumentSeries>,
    pub dropped: DropCounts,
}

/// Normalize `records` into a series for `name`.
///
/// Records whose price or date fails to normalize are dropped and counted.
/// Surviving points are ordered by calendar date; ties keep store order.
pub fn assemble_series(name: &str, records: &[RawRecord]) -> SeriesAssembly {
    let mut dropped = DropCounts::default();
    let mut points = Vec::with_capacity(records.len());

    for rec in records {
        let price = match normalize_price(&rec.close) {
            Ok(p) => p,
            Err(ParseFailure::Missing) => {
                dropped.missing_price += 1;
                continue;
            }
            Err(ParseFailure::Invalid) => {
                dropped.invalid_price += 1;
                continue;
            }
        };
        let date = match normalize_date(&rec.date) {
            Ok(d) => d,
            Err(ParseFailure::Missing) => {
                dropped.missing_date += 1;
                continue;
            }
            Err(ParseFailure::Invalid) => {
                dropped.invalid_date += 1;
                continue;
            }
        };
        points.push(PricePoint { date, price });
    }

    if points.is_empty() {
        return SeriesAssembly {
            series: None,
            dropped,
        };
    }

    points.sort_by_key(|p| p.date);

    SeriesAssembly {
        series: Some(InstrumentSeries {
            label: name.to_string(),
            color: color_for(name),
            points,
        }),
        dropped,
    }
}
