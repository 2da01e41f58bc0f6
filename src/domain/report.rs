// Wire shapes returned by the reporting API
use crate::domain::period::Period;
use crate::error::FetchError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

const ENVELOPE_FIELD: &str = "dashboardData";
const PERIODS_FIELD: &str = "availableYears";

/// A successful response body, resolved once into one of the two API shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// Bare dashboard payload; the entity has a single implicit period.
    Flat(DashboardPayload),
    /// `{ dashboardData, availableYears }`.
    Enveloped {
        dashboard: DashboardPayload,
        available_periods: Vec<Period>,
    },
}

impl RawResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self, FetchError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| FetchError::MalformedResponse(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, FetchError> {
        let Value::Object(mut body) = value else {
            return Err(FetchError::MalformedResponse(
                "expected a JSON object".to_string(),
            ));
        };

        let Some(inner) = body.remove(ENVELOPE_FIELD) else {
            return Ok(RawResponse::Flat(parse_payload(Value::Object(body))?));
        };

        if !inner.is_object() {
            return Err(FetchError::MalformedResponse(format!(
                "{ENVELOPE_FIELD} is not an object"
            )));
        }
        let dashboard = parse_payload(inner)?;

        match body.remove(PERIODS_FIELD) {
            None | Some(Value::Null) => Ok(RawResponse::Flat(dashboard)),
            Some(periods) => {
                let labels: Vec<Label> = serde_json::from_value(periods).map_err(|e| {
                    FetchError::MalformedResponse(format!("{PERIODS_FIELD}: {e}"))
                })?;
                let available_periods = labels
                    .into_iter()
                    .map(|l| Period::new(l.into_string()))
                    .collect();
                Ok(RawResponse::Enveloped {
                    dashboard,
                    available_periods,
                })
            }
        }
    }

    pub fn dashboard(&self) -> &DashboardPayload {
        match self {
            RawResponse::Flat(dashboard) => dashboard,
            RawResponse::Enveloped { dashboard, .. } => dashboard,
        }
    }

    /// Period list, or `None` for the single-period shape.
    pub fn available_periods(&self) -> Option<&[Period]> {
        match self {
            RawResponse::Flat(_) => None,
            RawResponse::Enveloped {
                available_periods, ..
            } => Some(available_periods),
        }
    }
}

fn parse_payload(value: Value) -> Result<DashboardPayload, FetchError> {
    serde_json::from_value(value)
        .map_err(|e| FetchError::MalformedResponse(format!("dashboard payload: {e}")))
}

/// Dashboard payload as the server sends it. Every block is optional here;
/// the normalizer decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    #[serde(default)]
    pub metrics: Option<BTreeMap<String, RawMetric>>,
    #[serde(default)]
    pub series: Option<Vec<RawSeries>>,
    #[serde(default)]
    pub breakdowns: Option<Vec<RawBreakdown>>,
    #[serde(default, alias = "transactions")]
    pub recent_transactions: Option<Vec<RawTransaction>>,
}

impl DashboardPayload {
    pub fn is_empty(&self) -> bool {
        self.metrics.is_none()
            && self.series.is_none()
            && self.breakdowns.is_none()
            && self.recent_transactions.is_none()
    }
}

/// A KPI is either a bare number or `{ value, change }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawMetric {
    Value(Option<f64>),
    Detailed {
        #[serde(default)]
        value: Option<f64>,
        #[serde(default, alias = "changePct", alias = "changePercent")]
        change: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSeries {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "data")]
    pub points: Option<Vec<RawSeriesPoint>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSeriesPoint {
    #[serde(default, alias = "month", alias = "name")]
    pub label: Option<Label>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub values: Option<BTreeMap<String, Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawBreakdown {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<RawSlice>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSlice {
    #[serde(default, alias = "name")]
    pub category: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub id: Option<Label>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default, rename = "type", alias = "direction")]
    pub kind: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// A label the server may send as a string or as a number (years, ids).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Text(String),
    Number(serde_json::Number),
}

impl Label {
    pub fn into_string(self) -> String {
        match self {
            Label::Text(text) => text,
            Label::Number(number) => number.to_string(),
        }
    }
}
