// Source trait for dashboard report retrieval
use crate::domain::identity::EntityId;
use crate::domain::period::Period;
use crate::domain::report::RawResponse;
use crate::error::FetchError;
use async_trait::async_trait;

#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Fetch the dashboard for an entity, optionally for a specific period.
    /// One call is one request: no caching, no retry.
    async fn fetch(
        &self,
        entity: &EntityId,
        period: Option<&Period>,
    ) -> Result<RawResponse, FetchError>;
}
