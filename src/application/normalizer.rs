// Normalizer - Maps raw report payloads into the renderer's view model
use crate::domain::dashboard::{
    Breakdown, BreakdownSlice, DashboardData, Direction, KpiMetric, Series, SeriesPoint,
    Transaction,
};
use crate::domain::report::{
    DashboardPayload, RawBreakdown, RawMetric, RawResponse, RawSeries, RawTransaction,
};
use crate::error::FetchError;
use chrono::{DateTime, NaiveDate};
use std::collections::BTreeMap;

/// KPIs every dashboard variant renders, in tile order.
pub const KPI_KEYS: [&str; 4] = ["totalIncome", "totalExpenses", "netProfit", "cashBalance"];

/// Fallback colors for breakdown slices the server left uncolored.
const PALETTE: [&str; 8] = [
    "#4f46e5", "#10b981", "#f59e0b", "#ef4444", "#06b6d4", "#8b5cf6", "#84cc16", "#ec4899",
];

pub fn normalize(response: &RawResponse) -> Result<DashboardData, FetchError> {
    normalize_payload(response.dashboard())
}

/// Absent numbers become zero and absent lists become empty. Only a non-empty
/// payload without a metrics block is rejected.
pub fn normalize_payload(payload: &DashboardPayload) -> Result<DashboardData, FetchError> {
    if payload.is_empty() {
        return Ok(zeroed());
    }

    let metrics = payload
        .metrics
        .as_ref()
        .ok_or_else(|| FetchError::MalformedResponse("missing metrics block".to_string()))?;

    let data = DashboardData {
        metrics: normalize_metrics(metrics),
        series: payload
            .series
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, s)| normalize_series(i, s))
            .collect(),
        breakdowns: payload
            .breakdowns
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, b)| normalize_breakdown(i, b))
            .collect(),
        recent_transactions: payload
            .recent_transactions
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, t)| normalize_transaction(i, t))
            .collect(),
    };

    tracing::debug!(
        "Normalized dashboard: {} metrics, {} series, {} breakdowns, {} transactions",
        data.metrics.len(),
        data.series.len(),
        data.breakdowns.len(),
        data.recent_transactions.len()
    );

    Ok(data)
}

fn zeroed() -> DashboardData {
    DashboardData {
        metrics: KPI_KEYS.iter().map(|k| KpiMetric::new(*k, 0.0, None)).collect(),
        ..Default::default()
    }
}

fn normalize_metrics(metrics: &BTreeMap<String, RawMetric>) -> Vec<KpiMetric> {
    let fixed = KPI_KEYS.iter().map(|key| match metrics.get(*key) {
        Some(raw) => metric(key, raw),
        None => KpiMetric::new(*key, 0.0, None),
    });

    let extra = metrics
        .iter()
        .filter(|(key, _)| !KPI_KEYS.contains(&key.as_str()))
        .map(|(key, raw)| metric(key, raw));

    fixed.chain(extra).collect()
}

fn metric(key: &str, raw: &RawMetric) -> KpiMetric {
    match raw {
        RawMetric::Value(value) => KpiMetric::new(key, value.unwrap_or(0.0), None),
        RawMetric::Detailed { value, change } => {
            KpiMetric::new(key, value.unwrap_or(0.0), *change)
        }
    }
}

fn normalize_series(index: usize, raw: &RawSeries) -> Series {
    let points = raw
        .points
        .iter()
        .flatten()
        .map(|p| {
            let mut values: BTreeMap<String, f64> = p
                .values
                .iter()
                .flatten()
                .map(|(name, v)| (name.clone(), v.unwrap_or(0.0)))
                .collect();
            if p.value.is_some() || values.is_empty() {
                values.insert("value".to_string(), p.value.unwrap_or(0.0));
            }

            SeriesPoint {
                label: p.label.clone().map(|l| l.into_string()).unwrap_or_default(),
                values,
            }
        })
        .collect();

    Series {
        name: raw.name.clone().unwrap_or_else(|| format!("series{}", index + 1)),
        points,
    }
}

fn normalize_breakdown(index: usize, raw: &RawBreakdown) -> Breakdown {
    let slices = raw
        .items
        .iter()
        .flatten()
        .enumerate()
        .map(|(i, item)| BreakdownSlice {
            category: item.category.clone().unwrap_or_default(),
            value: item.value.unwrap_or(0.0).abs(),
            color: item
                .color
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| PALETTE[i % PALETTE.len()].to_string()),
        })
        .collect();

    Breakdown {
        name: raw.name.clone().unwrap_or_else(|| format!("breakdown{}", index + 1)),
        slices,
    }
}

fn normalize_transaction(index: usize, raw: &RawTransaction) -> Transaction {
    let amount = raw.amount.unwrap_or(0.0);

    Transaction {
        id: raw
            .id
            .clone()
            .map(|id| id.into_string())
            .unwrap_or_else(|| index.to_string()),
        description: raw.description.clone().unwrap_or_default(),
        amount,
        direction: direction(raw.kind.as_deref(), amount),
        date: raw.date.as_deref().and_then(parse_date),
    }
}

fn direction(kind: Option<&str>, amount: f64) -> Direction {
    match kind.map(|k| k.trim().to_ascii_lowercase()).as_deref() {
        Some("inflow" | "income" | "credit") => Direction::Inflow,
        Some("outflow" | "expense" | "debit") => Direction::Outflow,
        _ if amount < 0.0 => Direction::Outflow,
        _ => Direction::Inflow,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()));

    if parsed.is_none() {
        tracing::debug!("Dropping unparseable transaction date: {}", raw);
    }
    parsed
}
