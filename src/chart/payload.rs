use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::str::FromStr;

use super::date::canonical;
use super::series::{DropCounts, InstrumentSeries};

/// Color used by the chart-library format when an instrument has none.
const FALLBACK_COLOR: &str = "#9e9e9e";

/// Outcome of loading one configured instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentStatus {
    Ok,
    NoRecords,
    NoValidPoints,
    Failed,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentReport {
    pub label: String,
    pub collection: String,
    pub status: InstrumentStatus,
    pub records: usize,
    pub points: usize,
    pub dropped: DropCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregated chart response, built once per request.
#[derive(Debug, Clone)]
pub struct ChartPayload {
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    pub series_count: usize,
    pub total_points: usize,
    pub series: Vec<InstrumentSeries>,
    pub instruments: Vec<InstrumentReport>,
}

/// Aggregate series into a payload. Empty series are not counted or kept.
pub fn build_payload(mut series: Vec<InstrumentSeries>) -> ChartPayload {
    series.retain(|s| !s.points.is_empty());
    let total_points = series.iter().map(|s| s.points.len()).sum();

    ChartPayload {
        success: true,
        timestamp: Utc::now(),
        series_count: series.len(),
        total_points,
        series,
        instruments: Vec::new(),
    }
}

impl ChartPayload {
    pub fn with_instruments(mut self, instruments: Vec<InstrumentReport>) -> Self {
        self.instruments = instruments;
        self
    }
}

/// JSON shape the payload is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// `{ seriesCount, series: [{ label, color, data: [{ date, price }] }] }`
    Legacy,
    /// Chart.js-style `chartConfig` with `{ x, y }` points.
    ChartLibrary,
}

impl FromStr for PayloadFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" | "plain" => Ok(Self::Legacy),
            "chart" | "chartjs" | "chart-library" => Ok(Self::ChartLibrary),
            other => Err(format!("unknown payload format: {other}")),
        }
    }
}

impl PayloadFormat {
    pub fn render(self, payload: &ChartPayload, source: &str) -> Value {
        let timestamp = payload
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        match self {
            Self::Legacy => {
                let series: Vec<Value> = payload
                    .series
                    .iter()
                    .map(|s| {
                        let data: Vec<Value> = s
                            .points
                            .iter()
                            .map(|p| json!({ "date": canonical(p.date), "price": p.price }))
                            .collect();
                        let mut obj = json!({ "label": s.label, "data": data });
                        if let Some(color) = s.color {
                            obj["color"] = json!(color);
                        }
                        obj
                    })
                    .collect();

                json!({
                    "success": payload.success,
                    "timestamp": timestamp,
                    "source": source,
                    "seriesCount": payload.series_count,
                    "totalPoints": payload.total_points,
                    "series": series,
                    "instruments": payload.instruments,
                })
            }
            Self::ChartLibrary => {
                let datasets: Vec<Value> = payload
                    .series
                    .iter()
                    .map(|s| {
                        let color = s.color.unwrap_or(FALLBACK_COLOR);
                        let data: Vec<Value> = s
                            .points
                            .iter()
                            .map(|p| json!({ "x": canonical(p.date), "y": p.price }))
                            .collect();
                        json!({
                            "label": s.label,
                            "borderColor": color,
                            "backgroundColor": format!("{color}33"),
                            "fill": false,
                            "tension": 0.1,
                            "data": data,
                        })
                    })
                    .collect();

                json!({
                    "success": payload.success,
                    "timestamp": timestamp,
                    "source": source,
                    "datasets": payload.series_count,
                    "totalPoints": payload.total_points,
                    "chartConfig": {
                        "type": "line",
                        "data": { "datasets": datasets },
                    },
                    "instruments": payload.instruments,
                })
            }
        }
    }
}
