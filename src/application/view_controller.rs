// View controller - Owns the dashboard fetch state for one entity
use crate::application::normalizer::normalize;
use crate::application::report_source::ReportSource;
use crate::domain::dashboard::DashboardData;
use crate::domain::identity::{resolve_identity, EntityId, NavigationContext};
use crate::domain::period::{Period, PeriodRegistry};
use crate::domain::report::RawResponse;
use crate::domain::view_state::{FetchState, ViewSnapshot};
use crate::error::{FetchError, ViewError};
use crate::infrastructure::config::{fill_template, NavigationConfig};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// A fetch the controller has committed to. Its result is applied only if no
/// later fetch was issued in the meantime.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub sequence: u64,
    pub entity: EntityId,
    pub period: Option<Period>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PeriodRequest {
    /// The period is already selected or already being fetched.
    Unchanged,
    Issued(FetchTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodChange {
    Unchanged,
    Applied,
    /// A newer request was issued before this one completed.
    Superseded,
}

#[derive(Debug, Default)]
struct ViewInner {
    initialized: bool,
    entity: Option<EntityId>,
    state: FetchState,
    retained: Option<DashboardData>,
    periods: PeriodRegistry,
    /// Target of the in-flight period change, if any.
    requested: Option<Period>,
    sequence: u64,
}

pub struct DashboardViewController {
    source: Arc<dyn ReportSource>,
    navigation: NavigationConfig,
    inner: Mutex<ViewInner>,
    updates: watch::Sender<ViewSnapshot>,
}

impl DashboardViewController {
    pub fn new(source: Arc<dyn ReportSource>, navigation: NavigationConfig) -> Self {
        let (updates, _) = watch::channel(ViewSnapshot::default());
        Self {
            source,
            navigation,
            inner: Mutex::new(ViewInner::default()),
            updates,
        }
    }

    /// Resolve the entity and perform the initial load. Identity is resolved
    /// once; later calls return the current state untouched.
    pub async fn initialize(&self, context: &NavigationContext) -> FetchState {
        let ticket = {
            let mut inner = self.lock();
            if inner.initialized {
                tracing::warn!("Dashboard controller already initialized, ignoring");
                return inner.state.clone();
            }
            inner.initialized = true;

            match resolve_identity(context, &self.navigation.identity_param) {
                Ok(entity) => {
                    tracing::info!("Resolved dashboard entity {}", entity);
                    inner.entity = Some(entity.clone());
                    let ticket = self.issue(&mut inner, entity, None);
                    self.publish(&inner);
                    ticket
                }
                Err(err) => {
                    tracing::warn!(
                        "No usable '{}' in navigation context",
                        self.navigation.identity_param
                    );
                    inner.state = FetchState::Error(err.message());
                    self.publish(&inner);
                    return inner.state.clone();
                }
            }
        };

        self.run(ticket).await;
        self.state()
    }

    /// Validate a period change and move to `Loading` if a fetch is needed.
    /// The returned ticket must be passed to [`run`](Self::run).
    pub fn request_period(&self, period: Period) -> Result<PeriodRequest, ViewError> {
        let mut inner = self.lock();

        let Some(entity) = inner.entity.clone() else {
            return Err(ViewError::NotReady);
        };
        match inner.state {
            FetchState::Idle | FetchState::Error(_) => return Err(ViewError::NotReady),
            FetchState::Loading if inner.periods.is_empty() => return Err(ViewError::NotReady),
            _ => {}
        }

        let target = inner.requested.as_ref().or(inner.periods.selected());
        if target == Some(&period) {
            tracing::debug!("Period {} already requested, skipping fetch", period);
            return Ok(PeriodRequest::Unchanged);
        }
        if !inner.periods.contains(&period) {
            return Err(ViewError::UnknownPeriod(period));
        }

        let ticket = self.issue(&mut inner, entity, Some(period));
        self.publish(&inner);
        Ok(PeriodRequest::Issued(ticket))
    }

    /// Perform the fetch for `ticket` and apply it if it is still the latest.
    /// Returns whether the result was applied.
    pub async fn run(&self, ticket: FetchTicket) -> bool {
        let result = self
            .source
            .fetch(&ticket.entity, ticket.period.as_ref())
            .await;

        let mut inner = self.lock();
        if ticket.sequence != inner.sequence {
            tracing::warn!(
                "Discarding stale response #{} (latest is #{})",
                ticket.sequence,
                inner.sequence
            );
            return false;
        }

        let applied = result.and_then(|raw| self.apply(&mut inner, raw, ticket.period.as_ref()));
        let state = match applied {
            Ok(data) => FetchState::Ready(data),
            Err(err) => {
                tracing::warn!("Dashboard fetch #{} failed: {}", ticket.sequence, err);
                FetchState::Error(err.message())
            }
        };

        tracing::info!(
            "Fetch #{} for {} settled: {}",
            ticket.sequence,
            ticket.entity,
            if state.error().is_some() { "error" } else { "ready" }
        );

        inner.state = state;
        inner.retained = None;
        inner.requested = None;
        self.publish(&inner);
        true
    }

    /// Request a period and wait for its fetch.
    pub async fn select_period(&self, period: Period) -> Result<PeriodChange, ViewError> {
        match self.request_period(period)? {
            PeriodRequest::Unchanged => Ok(PeriodChange::Unchanged),
            PeriodRequest::Issued(ticket) => Ok(if self.run(ticket).await {
                PeriodChange::Applied
            } else {
                PeriodChange::Superseded
            }),
        }
    }

    pub fn state(&self) -> FetchState {
        self.lock().state.clone()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.updates.borrow().clone()
    }

    /// Receiver notified on every state transition.
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.updates.subscribe()
    }

    /// Sequence number of the most recently issued fetch.
    pub fn latest_sequence(&self) -> u64 {
        self.lock().sequence
    }

    fn issue(
        &self,
        inner: &mut ViewInner,
        entity: EntityId,
        period: Option<Period>,
    ) -> FetchTicket {
        inner.sequence += 1;
        if let FetchState::Ready(data) = std::mem::replace(&mut inner.state, FetchState::Loading) {
            inner.retained = Some(data);
        }
        inner.requested = period.clone();

        tracing::info!(
            "Issuing fetch #{} for {} (period {})",
            inner.sequence,
            entity,
            period.as_ref().map(Period::as_str).unwrap_or("default")
        );

        FetchTicket {
            sequence: inner.sequence,
            entity,
            period,
        }
    }

    fn apply(
        &self,
        inner: &mut ViewInner,
        raw: RawResponse,
        requested: Option<&Period>,
    ) -> Result<DashboardData, FetchError> {
        let data = normalize(&raw)?;

        match (raw.available_periods(), requested) {
            (Some([]), _) => return Err(FetchError::NoData),
            (Some(periods), None) => inner.periods.populate(periods.to_vec()),
            (Some(periods), Some(period)) => {
                if !periods.contains(period) {
                    tracing::warn!(
                        "Period list for {} omits the requested period, keeping current list",
                        period
                    );
                }
                inner.periods.refresh(periods.to_vec(), period);
            }
            (None, Some(period)) => {
                inner.periods.select(period);
            }
            (None, None) => {}
        }

        Ok(data)
    }

    fn publish(&self, inner: &ViewInner) {
        let full_view_url = self.navigation.full_view_url.as_ref().map(|template| {
            let entity = inner.entity.as_ref().map(EntityId::as_str).unwrap_or_default();
            let encoded = urlencoding::encode(entity).into_owned();
            let vars = HashMap::from([("entity".to_string(), encoded)]);
            fill_template(template, &vars)
        });

        self.updates.send_replace(ViewSnapshot {
            entity: inner.entity.clone(),
            state: inner.state.clone(),
            retained: inner.retained.clone(),
            periods: inner.periods.available().to_vec(),
            selected: inner.periods.selected().cloned(),
            full_view_url,
            sequence: inner.sequence,
            updated_at: Some(chrono::Utc::now()),
        });
    }

    fn lock(&self) -> MutexGuard<'_, ViewInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
