//! Server-driven table state.
//!
//! [`QueryStateController`] is the single place that decides when the product
//! list has to be fetched. Everything that goes into a request (filters, page,
//! page size, sort and the refetch epoch) lives in [`QueryState`]; everything
//! that comes back (rows and total count) lives in a separate
//! [`ResultCache`]. Writing results therefore cannot change the request key,
//! and a completed fetch can never schedule another one.
//!
//! A fetch cycle is two requests issued together: the current page, and the
//! whole filtered collection whose length is the total. Both responses are
//! tagged with the [`FetchTicket`] of their cycle and joined here before any
//! state changes. Responses for a cycle that has since been superseded are
//! dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub const fn as_query_value(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Field name to search value. Blank values are never stored, so "no
/// filter" has exactly one representation and equality is meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSet(BTreeMap<String, String>);

impl FilterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        if value.trim().is_empty() {
            self.0.remove(&field);
        } else {
            self.0.insert(field, value);
        }
    }

    /// Normalizes the table widget's filter map, which holds a list of
    /// selected values per column. The first non-blank value wins.
    #[must_use]
    pub fn from_raw(raw: &BTreeMap<String, Vec<String>>) -> Self {
        let filters = raw
            .iter()
            .filter_map(|(field, values)| {
                values
                    .iter()
                    .find(|value| !value.trim().is_empty())
                    .map(|value| (field.clone(), value.clone()))
            })
            .collect();
        Self(filters)
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Requested page; both numbers are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub current_page: u32,
    pub page_size: u32,
}

impl PageRequest {
    #[must_use]
    pub fn new(current_page: u32, page_size: u32) -> Self {
        Self {
            current_page: current_page.max(1),
            page_size: page_size.max(1),
        }
    }
}

/// Pagination as the table widget displays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub page_size: u32,
    pub total: u64,
}

/// One `onChange` from the table: requested page, raw column filters and
/// sort descriptors. Only the first sort descriptor is honored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableChange {
    pub pagination: PageRequest,
    #[serde(default)]
    pub filters: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub sorts: Vec<SortSpec>,
}

impl TableChange {
    #[must_use]
    pub fn page(current_page: u32, page_size: u32) -> Self {
        Self {
            pagination: PageRequest::new(current_page, page_size),
            filters: BTreeMap::new(),
            sorts: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), vec![value.into()]);
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sorts.push(sort);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDefaults {
    pub page_size: u32,
    pub sort: Option<SortSpec>,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
        }
    }
}

/// What should be fetched right now. Holds no response data: two states that
/// compare equal describe the same request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryState {
    page: PageRequest,
    filters: FilterSet,
    sort: Option<SortSpec>,
    refetch_epoch: u64,
}

impl QueryState {
    #[must_use]
    pub fn new(defaults: &QueryDefaults) -> Self {
        Self {
            page: PageRequest::new(1, defaults.page_size),
            filters: FilterSet::new(),
            sort: defaults.sort.clone(),
            refetch_epoch: 0,
        }
    }

    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.page.current_page
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page.page_size
    }

    #[must_use]
    pub const fn filters(&self) -> &FilterSet {
        &self.filters
    }

    #[must_use]
    pub const fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    #[must_use]
    pub const fn refetch_epoch(&self) -> u64 {
        self.refetch_epoch
    }

    #[must_use]
    pub fn outbound_query(&self) -> OutboundQuery {
        OutboundQuery {
            filters: self.filters.clone(),
            page: self.page.current_page,
            limit: self.page.page_size,
            sort_by: self.sort.as_ref().map(|sort| sort.field.clone()),
            order: self.sort.as_ref().map(|sort| sort.direction),
        }
    }

    #[must_use]
    pub fn count_query(&self) -> CountQuery {
        CountQuery {
            filters: self.filters.clone(),
        }
    }
}

/// Parameters of the list request. Derive it from the state at the moment
/// of the fetch; never keep one around across state changes.
#[must_use]
pub fn derive_outbound_query(state: &QueryState) -> OutboundQuery {
    state.outbound_query()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundQuery {
    pub filters: FilterSet,
    pub page: u32,
    pub limit: u32,
    pub sort_by: Option<String>,
    pub order: Option<SortDirection>,
}

impl OutboundQuery {
    /// Query string pairs: filters by field name, then `page`, `limit`,
    /// `sortBy`, `order`.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        pairs.push(("page".into(), self.page.to_string()));
        pairs.push(("limit".into(), self.limit.to_string()));
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sortBy".into(), sort_by.clone()));
        }
        if let Some(order) = self.order {
            pairs.push(("order".into(), order.as_query_value().into()));
        }
        pairs
    }
}

/// The unpaginated request whose result length is the total count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountQuery {
    pub filters: FilterSet,
}

impl CountQuery {
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.filters
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FetchTicket(pub u64);

impl std::fmt::Display for FetchTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Both requests of one fetch cycle, built from the same state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchPlan {
    pub ticket: FetchTicket,
    pub page_query: OutboundQuery,
    pub count_query: CountQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchOutcome {
    /// The other half of the cycle has not arrived yet.
    Pending,
    Applied,
    Failed,
    /// The response belongs to a cycle that is no longer current.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultCache<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Default for ResultCache<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct PendingFetch<T> {
    ticket: FetchTicket,
    total: Option<u64>,
    items: Option<Vec<T>>,
}

#[derive(Debug, Clone)]
pub struct QueryStateController<T> {
    state: QueryState,
    results: ResultCache<T>,
    last_issued: Option<QueryState>,
    pending: Option<PendingFetch<T>>,
    next_ticket: u64,
    loading: bool,
    error: Option<String>,
}

impl<T> Default for QueryStateController<T> {
    fn default() -> Self {
        Self::initialize(QueryDefaults::default())
    }
}

impl<T> QueryStateController<T> {
    /// Initial state: page 1, no filters, default size and sort. Issues
    /// nothing; call [`Self::poll_fetch`] for the first load.
    #[must_use]
    pub fn initialize(defaults: QueryDefaults) -> Self {
        Self {
            state: QueryState::new(&defaults),
            results: ResultCache::default(),
            last_issued: None,
            pending: None,
            next_ticket: 1,
            loading: false,
            error: None,
        }
    }

    /// Starts over from new defaults: page 1, no filters, empty results,
    /// nothing in flight. Ticket numbering carries on, so responses to a
    /// cycle issued before the reset can never match a later one.
    pub fn reconfigure(&mut self, defaults: QueryDefaults) {
        if let Some(previous) = self.in_flight() {
            debug!(previous = %previous, "abandoning fetch cycle on reconfigure");
        }
        *self = Self {
            next_ticket: self.next_ticket,
            ..Self::initialize(defaults)
        };
    }

    #[must_use]
    pub const fn state(&self) -> &QueryState {
        &self.state
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.results.items
    }

    #[must_use]
    pub const fn pagination(&self) -> Pagination {
        Pagination {
            current_page: self.state.page.current_page,
            page_size: self.state.page.page_size,
            total: self.results.total,
        }
    }

    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.results.total.div_ceil(u64::from(self.state.page.page_size))
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    #[must_use]
    pub fn in_flight(&self) -> Option<FetchTicket> {
        self.pending.as_ref().map(|pending| pending.ticket)
    }

    /// Applies one table interaction. A changed filter set always sends the
    /// user back to page 1, whatever page the table asked for.
    pub fn on_table_interaction(&mut self, change: TableChange) -> Option<FetchPlan> {
        let filters = FilterSet::from_raw(&change.filters);
        let filters_changed = filters != self.state.filters;
        let requested = PageRequest::new(change.pagination.current_page, change.pagination.page_size);

        self.state.page = PageRequest {
            current_page: if filters_changed { 1 } else { requested.current_page },
            page_size: requested.page_size,
        };
        self.state.filters = filters;
        self.state.sort = change.sorts.into_iter().next();

        debug!(
            filters_changed,
            page = self.state.page.current_page,
            page_size = self.state.page.page_size,
            "table interaction"
        );

        self.poll_fetch()
    }

    /// Forces a new fetch cycle without touching anything else. Each call is
    /// its own cycle.
    pub fn request_refetch(&mut self) -> Option<FetchPlan> {
        self.state.refetch_epoch += 1;
        debug!(epoch = self.state.refetch_epoch, "refetch requested");
        self.poll_fetch()
    }

    /// Returns a plan when the state differs from the one last fetched.
    pub fn poll_fetch(&mut self) -> Option<FetchPlan> {
        if self.last_issued.as_ref() == Some(&self.state) {
            return None;
        }

        let ticket = FetchTicket(self.next_ticket);
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.last_issued = Some(self.state.clone());

        let superseded = self.pending.replace(PendingFetch {
            ticket,
            total: None,
            items: None,
        });
        if let Some(previous) = superseded {
            debug!(previous = %previous.ticket, current = %ticket, "superseding fetch cycle");
        }
        self.loading = true;

        let plan = FetchPlan {
            ticket,
            page_query: self.state.outbound_query(),
            count_query: self.state.count_query(),
        };
        info!(
            ticket = %ticket,
            page = plan.page_query.page,
            limit = plan.page_query.limit,
            filters = plan.page_query.filters.len(),
            "issuing fetch cycle"
        );
        Some(plan)
    }

    /// Count half of a cycle: the length of the unpaginated filtered list.
    pub fn record_count(&mut self, ticket: FetchTicket, result: Result<u64, String>) -> FetchOutcome {
        if self.in_flight() != Some(ticket) {
            debug!(ticket = %ticket, "discarding stale count response");
            return FetchOutcome::Stale;
        }
        match result {
            Ok(total) => {
                if let Some(pending) = self.pending.as_mut() {
                    pending.total = Some(total);
                }
                self.try_complete()
            }
            Err(message) => self.apply_fetch_failure(ticket, message),
        }
    }

    /// Page half of a cycle.
    pub fn record_page(&mut self, ticket: FetchTicket, result: Result<Vec<T>, String>) -> FetchOutcome {
        if self.in_flight() != Some(ticket) {
            debug!(ticket = %ticket, "discarding stale page response");
            return FetchOutcome::Stale;
        }
        match result {
            Ok(items) => {
                if let Some(pending) = self.pending.as_mut() {
                    pending.items = Some(items);
                }
                self.try_complete()
            }
            Err(message) => self.apply_fetch_failure(ticket, message),
        }
    }

    /// Stores a completed cycle. Only the result cache changes, so this can
    /// never schedule another fetch.
    pub fn apply_fetch_result(&mut self, ticket: FetchTicket, total: u64, items: Vec<T>) -> FetchOutcome {
        if self.in_flight() != Some(ticket) {
            debug!(ticket = %ticket, "discarding stale fetch result");
            return FetchOutcome::Stale;
        }
        self.pending = None;
        self.commit(total, items);
        FetchOutcome::Applied
    }

    /// Ends the cycle with an error. Rows and total keep their last good
    /// values; nothing is retried.
    pub fn apply_fetch_failure(&mut self, ticket: FetchTicket, message: impl Into<String>) -> FetchOutcome {
        if self.in_flight() != Some(ticket) {
            debug!(ticket = %ticket, "discarding stale fetch failure");
            return FetchOutcome::Stale;
        }
        let message = message.into();
        warn!(ticket = %ticket, error = %message, "fetch cycle failed");
        self.pending = None;
        self.loading = false;
        self.error = Some(message);
        FetchOutcome::Failed
    }

    fn try_complete(&mut self) -> FetchOutcome {
        match self.pending.take() {
            Some(PendingFetch {
                total: Some(total),
                items: Some(items),
                ..
            }) => {
                self.commit(total, items);
                FetchOutcome::Applied
            }
            other => {
                self.pending = other;
                FetchOutcome::Pending
            }
        }
    }

    fn commit(&mut self, total: u64, items: Vec<T>) {
        self.results.total = total;
        self.results.items = items;
        self.loading = false;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    type Controller = QueryStateController<&'static str>;

    fn loaded_controller() -> Controller {
        let mut controller = Controller::default();
        let plan = controller.poll_fetch().unwrap();
        controller.apply_fetch_result(plan.ticket, 47, vec!["a", "b"]);
        controller
    }

    #[test]
    fn test_initial_state() {
        let controller = Controller::initialize(QueryDefaults::default());
        let state = controller.state();
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.page_size(), DEFAULT_PAGE_SIZE);
        assert!(state.filters().is_empty());
        assert_eq!(state.sort(), None);
        assert_eq!(state.refetch_epoch(), 0);
        assert_eq!(controller.pagination().total, 0);
        assert!(!controller.is_loading());
        assert_eq!(controller.in_flight(), None);
    }

    #[test]
    fn test_first_poll_issues_exactly_one_fetch() {
        let mut controller = Controller::default();
        let plan = controller.poll_fetch().unwrap();
        assert_eq!(plan.page_query.page, 1);
        assert_eq!(plan.page_query.limit, DEFAULT_PAGE_SIZE);
        assert!(controller.is_loading());
        assert_eq!(controller.poll_fetch(), None);
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut controller = loaded_controller();
        controller.on_table_interaction(TableChange::page(3, 10));
        assert_eq!(controller.state().current_page(), 3);

        let plan = controller
            .on_table_interaction(TableChange::page(3, 10).with_filter("nome", "mouse"))
            .unwrap();
        assert_eq!(controller.state().current_page(), 1);
        assert_eq!(plan.page_query.page, 1);
        assert_eq!(plan.page_query.filters.get("nome"), Some("mouse"));
    }

    #[test]
    fn test_unchanged_filters_keep_requested_page() {
        let mut controller = loaded_controller();
        controller.on_table_interaction(TableChange::page(1, 10).with_filter("categoria", "Games"));
        let plan = controller
            .on_table_interaction(TableChange::page(4, 10).with_filter("categoria", "Games"))
            .unwrap();
        assert_eq!(plan.page_query.page, 4);
        assert_eq!(controller.state().filters().get("categoria"), Some("Games"));
    }

    #[test]
    fn test_blank_filter_values_count_as_no_filter() {
        let mut controller = loaded_controller();
        controller.on_table_interaction(TableChange::page(2, 10));

        let mut change = TableChange::page(2, 10);
        change.filters.insert("nome".into(), vec![]);
        change.filters.insert("categoria".into(), vec!["  ".into()]);

        assert_eq!(controller.on_table_interaction(change), None);
        assert_eq!(controller.state().current_page(), 2);
    }

    #[test]
    fn test_identical_interaction_does_not_refetch() {
        let mut controller = loaded_controller();
        assert!(controller.on_table_interaction(TableChange::page(2, 10)).is_some());
        assert_eq!(controller.on_table_interaction(TableChange::page(2, 10)), None);
    }

    #[test]
    fn test_page_size_change_issues_fetch() {
        let mut controller = loaded_controller();
        let plan = controller.on_table_interaction(TableChange::page(1, 20)).unwrap();
        assert_eq!(plan.page_query.limit, 20);
    }

    #[test]
    fn test_only_first_sort_is_honored() {
        let mut controller = loaded_controller();
        let change = TableChange::page(1, 10)
            .with_sort(SortSpec::descending("preco"))
            .with_sort(SortSpec::ascending("nome"));
        let plan = controller.on_table_interaction(change).unwrap();
        assert_eq!(plan.page_query.sort_by.as_deref(), Some("preco"));
        assert_eq!(plan.page_query.order, Some(SortDirection::Descending));
    }

    #[test]
    fn test_refetch_twice_bumps_epoch_by_two() {
        let mut controller = loaded_controller();
        let before = controller.state().refetch_epoch();
        let first = controller.request_refetch().unwrap();
        let second = controller.request_refetch().unwrap();
        assert_eq!(controller.state().refetch_epoch(), before + 2);
        assert_ne!(first.ticket, second.ticket);
    }

    #[test]
    fn test_apply_fetch_result_only_updates_results() {
        let mut controller = Controller::default();
        controller.on_table_interaction(
            TableChange::page(1, 5)
                .with_filter("nome", "cadeira")
                .with_sort(SortSpec::ascending("nome")),
        );
        let plan = controller.request_refetch().unwrap();
        let before = controller.state().clone();

        assert_eq!(
            controller.apply_fetch_result(plan.ticket, 12, vec!["x"]),
            FetchOutcome::Applied
        );
        assert_eq!(controller.state(), &before);
        assert_eq!(controller.pagination().total, 12);
        assert_eq!(controller.items(), &["x"]);
        assert!(!controller.is_loading());
        assert_eq!(controller.poll_fetch(), None);
    }

    #[test]
    fn test_outbound_query_shape() {
        let mut controller = Controller::default();
        controller.on_table_interaction(
            TableChange::page(1, 10)
                .with_filter("nome", "mesa")
                .with_filter("categoria", "Casa")
                .with_sort(SortSpec::ascending("preco")),
        );
        let pairs = derive_outbound_query(controller.state()).to_pairs();
        let expected: Vec<(String, String)> = [
            ("categoria", "Casa"),
            ("nome", "mesa"),
            ("page", "1"),
            ("limit", "10"),
            ("sortBy", "preco"),
            ("order", "asc"),
        ]
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_outbound_query_without_sort_omits_sort_params() {
        let controller = Controller::default();
        let pairs = controller.state().outbound_query().to_pairs();
        assert!(pairs.iter().all(|(k, _)| k != "sortBy" && k != "order"));
    }

    #[test]
    fn test_count_query_ignores_pagination_and_sort() {
        let mut controller = Controller::default();
        let plan = controller
            .on_table_interaction(
                TableChange::page(1, 10)
                    .with_filter("nome", "mesa")
                    .with_sort(SortSpec::descending("nome")),
            )
            .unwrap();
        assert_eq!(
            plan.count_query.to_pairs(),
            vec![("nome".to_string(), "mesa".to_string())]
        );
        assert_eq!(plan.count_query.filters, plan.page_query.filters);
    }

    #[test]
    fn test_cycle_applies_only_after_both_halves() {
        let mut controller = Controller::default();
        let plan = controller.poll_fetch().unwrap();

        assert_eq!(controller.record_page(plan.ticket, Ok(vec!["a"])), FetchOutcome::Pending);
        assert_eq!(controller.pagination().total, 0);
        assert!(controller.items().is_empty());
        assert!(controller.is_loading());

        assert_eq!(controller.record_count(plan.ticket, Ok(31)), FetchOutcome::Applied);
        assert_eq!(controller.pagination().total, 31);
        assert_eq!(controller.items(), &["a"]);
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_superseded_cycle_is_discarded() {
        let mut controller = Controller::default();
        let first = controller.poll_fetch().unwrap();
        let second = controller
            .on_table_interaction(TableChange::page(1, 10).with_filter("nome", "x"))
            .unwrap();

        assert_eq!(controller.record_count(first.ticket, Ok(99)), FetchOutcome::Stale);
        assert_eq!(controller.record_page(first.ticket, Ok(vec!["old"])), FetchOutcome::Stale);
        assert_eq!(controller.pagination().total, 0);

        controller.record_count(second.ticket, Ok(1));
        assert_eq!(controller.record_page(second.ticket, Ok(vec!["new"])), FetchOutcome::Applied);
        assert_eq!(controller.items(), &["new"]);
        assert_eq!(
            controller.apply_fetch_result(first.ticket, 5, vec![]),
            FetchOutcome::Stale
        );
        assert_eq!(controller.items(), &["new"]);
    }

    #[test]
    fn test_failure_keeps_last_good_results() {
        let mut controller = loaded_controller();
        let plan = controller.request_refetch().unwrap();

        assert_eq!(
            controller.record_count(plan.ticket, Err("offline".into())),
            FetchOutcome::Failed
        );
        assert_eq!(controller.error(), Some("offline"));
        assert!(!controller.is_loading());
        assert_eq!(controller.pagination().total, 47);
        assert_eq!(controller.items(), &["a", "b"]);

        assert_eq!(
            controller.record_page(plan.ticket, Ok(vec!["late"])),
            FetchOutcome::Stale
        );
        assert_eq!(controller.items(), &["a", "b"]);
    }

    #[test]
    fn test_success_clears_previous_error() {
        let mut controller = Controller::default();
        let plan = controller.poll_fetch().unwrap();
        controller.apply_fetch_failure(plan.ticket, "boom");
        assert_eq!(controller.poll_fetch(), None);

        let retry = controller.request_refetch().unwrap();
        controller.apply_fetch_result(retry.ticket, 0, vec![]);
        assert_eq!(controller.error(), None);
    }

    #[test]
    fn test_reconfigure_discards_cycles_issued_before_it() {
        let mut controller = Controller::default();
        let old = controller.poll_fetch().unwrap();

        controller.reconfigure(QueryDefaults {
            page_size: 25,
            sort: None,
        });
        assert_eq!(controller.in_flight(), None);
        assert!(!controller.is_loading());
        assert_eq!(controller.state().page_size(), 25);

        let new = controller.poll_fetch().unwrap();
        assert_ne!(new.ticket, old.ticket);
        assert_eq!(new.page_query.limit, 25);

        assert_eq!(controller.record_count(old.ticket, Ok(999)), FetchOutcome::Stale);
        assert_eq!(controller.record_page(old.ticket, Ok(vec!["old"])), FetchOutcome::Stale);
        assert_eq!(controller.pagination().total, 0);

        controller.record_count(new.ticket, Ok(1));
        assert_eq!(controller.record_page(new.ticket, Ok(vec!["new"])), FetchOutcome::Applied);
        assert_eq!(controller.items(), &["new"]);
    }

    #[test]
    fn test_reconfigure_resets_query_and_results() {
        let mut controller = loaded_controller();
        controller.on_table_interaction(TableChange::page(3, 10).with_filter("nome", "mesa"));
        controller.reconfigure(QueryDefaults::default());

        assert_eq!(controller.state().current_page(), 1);
        assert!(controller.state().filters().is_empty());
        assert!(controller.items().is_empty());
        assert_eq!(controller.pagination().total, 0);
        assert!(controller.poll_fetch().is_some());
    }

    #[test]
    fn test_total_pages() {
        let controller = loaded_controller();
        assert_eq!(controller.total_pages(), 5);
    }

    #[test]
    fn test_end_to_end_paging_scenario() {
        let mut controller = Controller::default();
        let first = controller.poll_fetch().unwrap();
        assert_eq!(controller.pagination().total, 0);

        controller.record_count(first.ticket, Ok(47));
        controller.record_page(first.ticket, Ok(vec!["p1"]));
        assert_eq!(controller.pagination().total, 47);
        assert_eq!(controller.poll_fetch(), None);

        let filters_before = controller.state().filters().clone();
        let next = controller.on_table_interaction(TableChange::page(2, 10)).unwrap();
        assert_eq!(next.page_query.page, 2);
        assert_eq!(controller.state().current_page(), 2);
        assert_eq!(controller.state().filters(), &filters_before);
    }

    proptest! {
        #[test]
        fn prop_filter_change_always_lands_on_page_one(
            page in 2u32..500,
            size in 1u32..100,
            value in "[a-z]{1,12}",
        ) {
            let mut controller = loaded_controller();
            controller.on_table_interaction(TableChange::page(page, size));
            controller.on_table_interaction(TableChange::page(page, size).with_filter("nome", value));
            prop_assert_eq!(controller.state().current_page(), 1);
        }

        #[test]
        fn prop_results_never_move_the_query(
            totals in proptest::collection::vec(0u64..10_000, 1..8),
            refetches in 0usize..4,
        ) {
            let mut controller = Controller::default();
            controller.on_table_interaction(TableChange::page(3, 7).with_sort(SortSpec::ascending("nome")));
            for _ in 0..refetches {
                controller.request_refetch();
            }
            let before = controller.state().clone();
            for total in totals {
                if let Some(ticket) = controller.in_flight() {
                    controller.apply_fetch_result(ticket, total, vec![]);
                }
                prop_assert_eq!(controller.state(), &before);
                prop_assert_eq!(controller.poll_fetch(), None);
            }
        }
    }
}
