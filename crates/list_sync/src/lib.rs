//! Keeps one list view's pagination, filter and sort state in sync with the
//! route query and reloads the list exactly once per confirmed route change.

use std::sync::Arc;

use futures::StreamExt;
use shared::{
    domain::{is_truthy, CanonicalKey, ParamValue, Query, RouteLocation, SortDirection},
    protocol::{ListResponse, Record},
};
use tokio::sync::{broadcast, watch, Mutex};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, error, info, warn};

pub mod action;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gate;
pub mod keys;
pub mod router;
pub mod sort;
pub mod state;
pub mod view;

pub use action::{ActionStore, HttpListAction, ListAction};
pub use config::{load_options, PaginationOptions};
pub use error::PaginationError;
pub use fetch::FetchMode;
pub use keys::{Coercion, KeyRegistry, DEFAULT_PAGE, DEFAULT_PER_PAGE};
pub use router::{MemoryRouter, Router};
pub use sort::{NoopSortIndicator, SortIndicator};
pub use view::{DataMeta, PaginationView};

use fetch::{Completion, FetchOrchestrator, FetchTicket};
use gate::SyncGate;
use keys::TrackedKey;
use state::{FilterState, QueryState, RouteParams};

#[derive(Debug, Clone, PartialEq)]
pub enum PaginationEvent {
    ItemsUpdated {
        mode: FetchMode,
        received: usize,
        total_rows: u64,
    },
    RouteReplaced(RouteLocation),
    /// Pagination went back to defaults because the page was past the result set.
    PaginationReset,
    /// Filters were cleared after a failed fetch.
    FiltersReset,
}

struct SyncState {
    filters: FilterState,
    query: QueryState,
    route_params: RouteParams,
    gate: SyncGate,
    fetch: FetchOrchestrator,
}

pub struct RoutePagination {
    registry: KeyRegistry,
    action_name: String,
    actions: Arc<ActionStore>,
    router: Arc<dyn Router>,
    sort_indicator: Arc<dyn SortIndicator>,
    inner: Mutex<SyncState>,
    events: broadcast::Sender<PaginationEvent>,
}

impl RoutePagination {
    pub fn new(
        actions: Arc<ActionStore>,
        router: Arc<dyn Router>,
        options: &PaginationOptions,
    ) -> Arc<Self> {
        Self::new_with_dependencies(
            actions,
            router,
            Arc::new(NoopSortIndicator),
            options.registry(),
            options.action_name.clone(),
        )
    }

    pub fn new_with_dependencies(
        actions: Arc<ActionStore>,
        router: Arc<dyn Router>,
        sort_indicator: Arc<dyn SortIndicator>,
        registry: KeyRegistry,
        action_name: impl Into<String>,
    ) -> Arc<Self> {
        let route_params = registry.route_params(&router.current().query);
        let query = QueryState::from_entries(registry.keys().iter().map(|key| {
            (
                key.canonical.clone(),
                route_params.get(key.canonical.as_str()).cloned(),
            )
        }));
        let filters = FilterState::from_entries(registry.keys().iter().map(|key| {
            (
                key.display.clone(),
                route_params.get(key.canonical.as_str()).cloned(),
            )
        }));
        let (events, _) = broadcast::channel(64);

        Arc::new(Self {
            registry,
            action_name: action_name.into(),
            actions,
            router,
            sort_indicator,
            inner: Mutex::new(SyncState {
                filters,
                query,
                route_params,
                gate: SyncGate::default(),
                fetch: FetchOrchestrator::default(),
            }),
            events,
        })
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PaginationEvent> {
        self.events.subscribe()
    }

    /// Fetches the list for the current route in the current mode.
    pub async fn fetch_items(&self) -> Result<(), PaginationError> {
        self.run_fetch_cycle().await
    }

    /// Advances one page and appends the next page's rows to the current items.
    pub async fn load_more(&self) -> Result<(), PaginationError> {
        let reload = {
            let mut state = self.inner.lock().await;
            let current_page = self.effective_int(&state, self.registry.page());
            let Some(next_page) = current_page.checked_add(1) else {
                warn!(page = current_page, "load more: already on the last addressable page");
                return Ok(());
            };
            state.fetch.set_append();
            let page_key = self.registry.page().canonical.clone();
            Self::write_query(&mut state, &page_key, Some(ParamValue::Int(next_page)));
            self.flush_outbound(&mut state)
        };
        self.reload_if(reload).await
    }

    /// Commits the working filters to the route, back on the first page.
    pub async fn apply_filters(&self) -> Result<(), PaginationError> {
        let reload = {
            let mut state = self.inner.lock().await;
            self.commit_filters(&mut state)
        };
        self.reload_if(reload).await
    }

    pub async fn clear_filters(&self) -> Result<(), PaginationError> {
        let reload = {
            let mut state = self.inner.lock().await;
            for key in self.registry.sort_keys() {
                self.sort_indicator.render(&key.canonical, SortDirection::None);
            }
            state.filters.clear();
            self.commit_filters(&mut state)
        };
        self.reload_if(reload).await
    }

    /// Edits a working filter value. Nothing is synced until
    /// [`RoutePagination::apply_filters`].
    pub async fn set_filter(
        &self,
        key: &str,
        value: Option<ParamValue>,
    ) -> Result<(), PaginationError> {
        let tracked = self.tracked(key)?;
        let mut state = self.inner.lock().await;
        state.filters.set(tracked.display.as_str(), value);
        Ok(())
    }

    pub async fn set_current_page(&self, page: i64) -> Result<(), PaginationError> {
        let key = self.registry.page().canonical.clone();
        self.write_and_sync(&key, ParamValue::Int(page)).await
    }

    pub async fn set_per_page(&self, per_page: i64) -> Result<(), PaginationError> {
        let key = self.registry.per_page().canonical.clone();
        self.write_and_sync(&key, ParamValue::Int(per_page)).await
    }

    /// Cycles a sort column none -> asc -> desc -> none and commits it.
    pub async fn toggle_sort(&self, key: &str) -> Result<(), PaginationError> {
        let tracked = self.tracked(key)?;
        if !tracked.is_sort_key() {
            return Err(PaginationError::NotSortable {
                key: key.to_string(),
            });
        }

        let reload = {
            let mut state = self.inner.lock().await;
            let (direction, value) = sort::toggle(state.filters.get(tracked.display.as_str()));
            debug!(key = tracked.canonical.as_str(), ?direction, "sort: toggled column");
            state.filters.set(tracked.display.as_str(), value);
            self.sort_indicator.render(&tracked.canonical, direction);
            self.commit_filters(&mut state)
        };
        self.reload_if(reload).await
    }

    /// Pushes every sort column's current direction to the indicator.
    pub async fn render_sort_indicators(&self) {
        let state = self.inner.lock().await;
        self.render_sort_state(&state);
    }

    /// Forces an outbound pass, navigating if the query state differs from the route.
    pub async fn update_route_query(&self) -> Result<(), PaginationError> {
        let reload = {
            let mut state = self.inner.lock().await;
            self.sync_outbound(&mut state)
        };
        self.reload_if(reload).await
    }

    /// Inbound sync for an externally observed route change.
    pub async fn on_route_change(&self, location: RouteLocation) -> Result<(), PaginationError> {
        let reload = {
            let mut state = self.inner.lock().await;
            self.ingest_route(&mut state, &location)
        };
        self.reload_if(reload).await
    }

    /// Feeds route notifications into [`RoutePagination::on_route_change`]
    /// until the sender goes away.
    pub async fn run(
        self: Arc<Self>,
        route_changes: watch::Receiver<RouteLocation>,
    ) -> Result<(), PaginationError> {
        let mut changes = WatchStream::from_changes(route_changes);
        while let Some(location) = changes.next().await {
            self.on_route_change(location).await?;
        }
        debug!("sync: route watch closed");
        Ok(())
    }

    pub async fn items(&self) -> Vec<Record> {
        self.inner.lock().await.fetch.items().to_vec()
    }

    pub async fn total_rows(&self) -> u64 {
        self.inner.lock().await.fetch.total_rows()
    }

    pub async fn mode(&self) -> FetchMode {
        self.inner.lock().await.fetch.mode()
    }

    pub async fn current_page(&self) -> i64 {
        let state = self.inner.lock().await;
        self.effective_int(&state, self.registry.page())
    }

    pub async fn per_page(&self) -> i64 {
        let state = self.inner.lock().await;
        self.effective_int(&state, self.registry.per_page())
    }

    pub async fn filters(&self) -> FilterState {
        self.inner.lock().await.filters.clone()
    }

    pub async fn filter(&self, key: &str) -> Option<ParamValue> {
        let tracked = self.registry.lookup(key)?;
        self.inner
            .lock()
            .await
            .filters
            .get(tracked.display.as_str())
            .cloned()
    }

    pub async fn query(&self) -> QueryState {
        self.inner.lock().await.query.clone()
    }

    pub async fn route_params(&self) -> RouteParams {
        self.inner.lock().await.route_params.clone()
    }

    pub async fn view(&self) -> PaginationView {
        let state = self.inner.lock().await;
        let has_active_filter = self
            .registry
            .keys()
            .iter()
            .filter(|key| !self.registry.is_pagination(key))
            .any(|key| is_truthy(state.filters.get(key.display.as_str())));
        PaginationView::compute(
            self.effective_int(&state, self.registry.page()),
            self.effective_int(&state, self.registry.per_page()),
            state.fetch.total_rows(),
            state.fetch.items().len(),
            has_active_filter,
        )
    }

    fn tracked(&self, key: &str) -> Result<&TrackedKey, PaginationError> {
        self.registry
            .lookup(key)
            .ok_or_else(|| PaginationError::UnknownKey {
                key: key.to_string(),
            })
    }

    fn effective_int(&self, state: &SyncState, key: &TrackedKey) -> i64 {
        let fallback = match key.coercion {
            Coercion::Integer { default } => default,
            _ => 0,
        };
        key.coercion
            .apply_value(state.query.get(key.canonical.as_str()))
            .and_then(|value| value.as_int())
            .unwrap_or(fallback)
    }

    async fn write_and_sync(
        &self,
        key: &CanonicalKey,
        value: ParamValue,
    ) -> Result<(), PaginationError> {
        let reload = {
            let mut state = self.inner.lock().await;
            Self::write_query(&mut state, key, Some(value));
            self.flush_outbound(&mut state)
        };
        self.reload_if(reload).await
    }

    async fn reload_if(&self, reload: bool) -> Result<(), PaginationError> {
        if reload {
            self.run_fetch_cycle().await
        } else {
            Ok(())
        }
    }

    fn write_query(state: &mut SyncState, key: &CanonicalKey, value: Option<ParamValue>) {
        if state.query.set(key.as_str(), value) {
            state.gate.note_query_write();
        }
    }

    fn reset_pagination(&self, state: &mut SyncState) {
        Self::write_query(
            state,
            &self.registry.page().canonical,
            Some(ParamValue::Int(DEFAULT_PAGE)),
        );
        Self::write_query(
            state,
            &self.registry.per_page().canonical,
            Some(ParamValue::Int(DEFAULT_PER_PAGE)),
        );
    }

    /// Copies the working filters into the query state with the gate closed,
    /// resets pagination, then reopens the gate and forces one outbound pass.
    /// Every write happens under the same lock, so the pass observes the
    /// settled state. Returns whether the route params changed.
    fn commit_filters(&self, state: &mut SyncState) -> bool {
        state.gate.suppress();
        for key in self.registry.keys() {
            let value = state.filters.get(key.display.as_str()).cloned();
            Self::write_query(state, &key.canonical, value);
        }
        self.reset_pagination(state);
        state.gate.resume();
        self.sync_outbound(state)
    }

    /// Runs the outbound pass only if a query write is pending.
    fn flush_outbound(&self, state: &mut SyncState) -> bool {
        if state.gate.take_pending() {
            self.sync_outbound(state)
        } else {
            false
        }
    }

    /// Replaces the route query when the truthy query state differs from it,
    /// then ingests the location the router landed on. Returns whether the
    /// route params changed.
    fn sync_outbound(&self, state: &mut SyncState) -> bool {
        let current = self.router.current();
        let wanted: Vec<(&CanonicalKey, &ParamValue)> = state
            .query
            .iter()
            .filter_map(|(key, value)| value.filter(|value| value.is_truthy()).map(|v| (key, v)))
            .collect();

        let changed = wanted.len() != current.query.len()
            || wanted.iter().any(|(key, value)| {
                current
                    .query
                    .get(key.as_str())
                    .map_or(true, |raw| !value.loosely_eq(raw))
            });
        if !changed {
            debug!(route = %current.name, "sync: route query already up to date");
            return false;
        }

        let query: Query = wanted
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        let location = RouteLocation {
            name: current.name,
            query,
        };
        info!(
            route = %location.name,
            params = location.query.len(),
            "sync: replacing route query"
        );
        self.router.replace(location.clone());
        let _ = self.events.send(PaginationEvent::RouteReplaced(location));

        let landed = self.router.current();
        self.ingest_route(state, &landed)
    }

    /// Snapshot-copies the raw route query into query and filter state with
    /// outbound sync suppressed, then recomputes the route params. Returns
    /// whether they changed.
    fn ingest_route(&self, state: &mut SyncState, location: &RouteLocation) -> bool {
        state.gate.suppress();
        for key in self.registry.keys() {
            let raw = location
                .query
                .get(key.canonical.as_str())
                .map(|value| ParamValue::Text(value.clone()));
            Self::write_query(state, &key.canonical, raw.clone());
            state.filters.set(key.display.as_str(), raw);
        }
        state.gate.resume();

        let route_params = self.registry.route_params(&location.query);
        if route_params == state.route_params {
            return false;
        }
        debug!(route = %location.name, "sync: route params changed");
        state.route_params = route_params;
        self.render_sort_state(state);
        true
    }

    fn render_sort_state(&self, state: &SyncState) {
        for key in self.registry.sort_keys() {
            let direction = sort::direction_of(state.filters.get(key.display.as_str()));
            self.sort_indicator.render(&key.canonical, direction);
        }
    }

    /// Issues fetches until no follow-up is needed: one for the current route
    /// params, one more after stale-page recovery navigates, and at most one
    /// recovery fetch after a failure.
    async fn run_fetch_cycle(&self) -> Result<(), PaginationError> {
        let action = self.actions.resolve(&self.action_name)?;
        let mut recovery_spent = false;

        loop {
            let ticket = {
                let mut state = self.inner.lock().await;
                let payload = state.route_params.to_payload();
                state.fetch.begin(payload)
            };
            debug!(
                action = self.action_name.as_str(),
                generation = ticket.generation(),
                mode = ?ticket.mode(),
                "fetch: dispatching list action"
            );

            let result = action.dispatch(ticket.payload()).await;

            let follow_up = {
                let mut state = self.inner.lock().await;
                match result {
                    Ok(response) => self.apply_response(&mut state, ticket, response),
                    Err(err) if !state.fetch.is_current(&ticket) => {
                        debug!(error = ?err, "fetch: ignoring failure of superseded request");
                        false
                    }
                    Err(err) if recovery_spent => {
                        error!(error = ?err, "fetch: recovery fetch failed; giving up");
                        false
                    }
                    Err(err) => {
                        warn!(error = ?err, "fetch: list action failed; clearing filters");
                        recovery_spent = true;
                        state.fetch.set_replace();
                        state.filters.clear();
                        self.commit_filters(&mut state);
                        let _ = self.events.send(PaginationEvent::FiltersReset);
                        true
                    }
                }
            };

            if !follow_up {
                return Ok(());
            }
        }
    }

    fn apply_response(
        &self,
        state: &mut SyncState,
        ticket: FetchTicket,
        response: ListResponse,
    ) -> bool {
        let mode = ticket.mode();
        let generation = ticket.generation();
        let received = response.data.len();
        let total_rows = response.total;

        match state.fetch.complete(ticket, response) {
            Completion::Superseded => {
                debug!(generation, "fetch: discarding superseded response");
                false
            }
            Completion::Applied { stale_page } => {
                info!(generation, ?mode, received, total_rows, "fetch: list updated");
                let _ = self.events.send(PaginationEvent::ItemsUpdated {
                    mode,
                    received,
                    total_rows,
                });
                if !stale_page {
                    return false;
                }
                warn!(
                    total_rows,
                    "fetch: current page is past the result set; resetting pagination"
                );
                self.reset_pagination(state);
                let _ = self.events.send(PaginationEvent::PaginationReset);
                self.flush_outbound(state)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
