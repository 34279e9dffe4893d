//! Normalization and assembly of instrument price series.
//!
//! Raw records come from a [`RecordSource`]; prices and dates are normalized
//! per record, unparseable records are dropped with a counted reason, and the
//! surviving series are aggregated into a [`payload::ChartPayload`].

pub mod date;
pub mod payload;
pub mod price;
pub mod raw;
pub mod series;

use std::sync::Arc;
use std::time::Duration;

use crate::db::records::RecordSource;
use crate::instruments::Instrument;
use payload::{InstrumentReport, InstrumentStatus};
use series::{assemble_series, DropCounts, InstrumentSeries};

/// Series and per-instrument reports from one collection pass.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub series: Vec<InstrumentSeries>,
    pub reports: Vec<InstrumentReport>,
}

/// Load and assemble every instrument in order.
///
/// Each fetch runs on the blocking pool under `timeout`. A failing or slow
/// instrument is reported and skipped; the others are unaffected.
pub async fn collect(
    source: Arc<dyn RecordSource>,
    instruments: &[Instrument],
    timeout: Duration,
) -> Collected {
    let mut out = Collected::default();

    for inst in instruments {
        let report = |status, records, points, dropped, error| InstrumentReport {
            label: inst.name.to_string(),
            collection: inst.collection.to_string(),
            status,
            records,
            points,
            dropped,
            error,
        };

        let src = Arc::clone(&source);
        let collection = inst.collection;
        let fetch = tokio::task::spawn_blocking(move || src.fetch_sorted(collection));

        let records = match tokio::time::timeout(timeout, fetch).await {
            Ok(Ok(Ok(records))) => records,
            Ok(Ok(Err(e))) => {
                tracing::warn!("{}: fetch failed: {e}", inst.name);
                out.reports.push(report(
                    InstrumentStatus::Failed,
                    0,
                    0,
                    DropCounts::default(),
                    Some(e.to_string()),
                ));
                continue;
            }
            Ok(Err(join)) => {
                tracing::warn!("{}: fetch task failed: {join}", inst.name);
                out.reports.push(report(
                    InstrumentStatus::Failed,
                    0,
                    0,
                    DropCounts::default(),
                    Some(join.to_string()),
                ));
                continue;
            }
            Err(_) => {
                tracing::warn!("{}: fetch timed out after {timeout:?}", inst.name);
                out.reports.push(report(
                    InstrumentStatus::TimedOut,
                    0,
                    0,
                    DropCounts::default(),
                    Some(format!("timed out after {} ms", timeout.as_millis())),
                ));
                continue;
            }
        };

        if records.is_empty() {
            tracing::warn!("{}: no records in {}", inst.name, inst.collection);
            out.reports.push(report(
                InstrumentStatus::NoRecords,
                0,
                0,
                DropCounts::default(),
                None,
            ));
            continue;
        }

        let assembly = assemble_series(inst.name, &records);
        let dropped = assembly.dropped;
        match assembly.series {
            Some(series) => {
                tracing::info!(
                    "{}: {} points ({} dropped)",
                    inst.name,
                    series.points.len(),
                    dropped.total()
                );
                out.reports.push(report(
                    InstrumentStatus::Ok,
                    records.len(),
                    series.points.len(),
                    dropped,
                    None,
                ));
                out.series.push(series);
            }
            None => {
                tracing::warn!(
                    "{}: 0 valid points out of {} records ({:?})",
                    inst.name,
                    records.len(),
                    dropped
                );
                out.reports.push(report(
                    InstrumentStatus::NoValidPoints,
                    records.len(),
                    0,
                    dropped,
                    None,
                ));
            }
        }
    }

    out
}
