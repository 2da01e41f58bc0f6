// View state exposed to the renderer
use crate::domain::dashboard::DashboardData;
use crate::domain::identity::EntityId;
use crate::domain::period::Period;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Error(String),
    Ready(DashboardData),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn data(&self) -> Option<&DashboardData> {
        match self {
            FetchState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Everything the renderer reads, captured at one transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub entity: Option<EntityId>,
    pub state: FetchState,
    /// Last ready data, kept visible while a period change is loading.
    pub retained: Option<DashboardData>,
    pub periods: Vec<Period>,
    pub selected: Option<Period>,
    pub full_view_url: Option<String>,
    /// Sequence number of the fetch this state belongs to.
    pub sequence: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ViewSnapshot {
    /// Data the renderer should draw: ready data, or retained data while loading.
    pub fn visible_data(&self) -> Option<&DashboardData> {
        match &self.state {
            FetchState::Ready(data) => Some(data),
            FetchState::Loading => self.retained.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fetch_state_wire_shape() {
        let value = serde_json::to_value(FetchState::Error("Not found".into())).unwrap();
        assert_eq!(value, json!({ "status": "error", "data": "Not found" }));

        let value = serde_json::to_value(FetchState::Loading).unwrap();
        assert_eq!(value, json!({ "status": "loading" }));
    }

    #[test]
    fn test_visible_data_while_loading() {
        let snapshot = ViewSnapshot {
            state: FetchState::Loading,
            retained: Some(DashboardData::default()),
            ..Default::default()
        };
        assert!(snapshot.visible_data().is_some());

        let snapshot = ViewSnapshot {
            state: FetchState::Error("boom".into()),
            retained: Some(DashboardData::default()),
            ..Default::default()
        };
        assert!(snapshot.visible_data().is_none());
    }
}
