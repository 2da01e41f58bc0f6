// Normalized dashboard view model handed to the renderer
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub metrics: Vec<KpiMetric>,
    pub series: Vec<Series>,
    pub breakdowns: Vec<Breakdown>,
    pub recent_transactions: Vec<Transaction>,
}

impl DashboardData {
    pub fn metric(&self, key: &str) -> Option<&KpiMetric> {
        self.metrics.iter().find(|m| m.key == key)
    }
}

/// A scalar summary tile. `value` keeps the server sign: net figures such as
/// profit are legitimately negative and have no separate direction tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiMetric {
    pub key: String,
    pub value: f64,
    /// Period-over-period change in percent.
    pub change_pct: Option<f64>,
}

impl KpiMetric {
    pub fn new(key: impl Into<String>, value: f64, change_pct: Option<f64>) -> Self {
        Self {
            key: key.into(),
            value,
            change_pct,
        }
    }
}

/// A named time-bucketed series for trend charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

/// One bucket of a series. Values are keyed by measure name (e.g. income,
/// expenses) so a single series can drive grouped bars. Values keep the
/// server sign so net measures can dip below the axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub values: BTreeMap<String, f64>,
}

impl SeriesPoint {
    pub fn value(&self, measure: &str) -> Option<f64> {
        self.values.get(measure).copied()
    }
}

/// Composition of a total, rendered as proportional shares.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub name: String,
    pub slices: Vec<BreakdownSlice>,
}

impl Breakdown {
    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownSlice {
    pub category: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inflow,
    Outflow,
}

/// Recent activity entry. `amount` keeps the server sign; `direction` is the
/// authoritative flow tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub direction: Direction,
    pub date: Option<NaiveDate>,
}

impl Transaction {
    pub fn magnitude(&self) -> f64 {
        self.amount.abs()
    }
}
