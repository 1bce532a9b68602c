use super::event::UserEvent;
use super::request::{Completion, Outcome, Request};
use super::state::{Operation, Step, Ticket, WizardState};
use crate::config::ResolvedConfig;
use crate::cpv::normalize_cpv;
use crate::errors::{AppError, AppResult};
use crate::models::{Region, RegionSuggestions, ResultSet, TenderSummary};
use crate::regions::canonical_region;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Coordinator owning the [`WizardState`].
///
/// Every user action is a method returning the backend [`Request`] to perform,
/// if any; the caller executes it and feeds the [`Completion`] back through
/// [`Wizard::complete`], which may return follow-up requests.
///
/// Duplicate triggers: while a `Search`, `PopulateCpv`, `ListAvailableCpv`,
/// `FilterByCpv` or `SuggestRegions` request is outstanding, a second trigger
/// of the same operation is ignored (`Ok(None)`). `FetchDetail` is
/// last-request-wins: a new detail request replaces the tracked one and the
/// older completion is discarded when it arrives.
#[derive(Debug, Clone)]
pub struct Wizard {
    state: WizardState,
    next_seq: u64,
    search_limit: usize,
    suggested_preselect: usize,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new(&ResolvedConfig::default())
    }
}

impl Wizard {
    pub fn new(config: &ResolvedConfig) -> Self {
        Self {
            state: WizardState::default(),
            next_seq: 0,
            search_limit: config.search_limit,
            suggested_preselect: config.suggested_region_preselect,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Routes a [`UserEvent`] to the matching action.
    pub fn handle(&mut self, event: UserEvent) -> AppResult<Option<Request>> {
        match event {
            UserEvent::ToggleRegion(region) => self.toggle_region(region).map(|_| None),
            UserEvent::SubmitRegions => self.submit_regions(),
            UserEvent::ToggleCpv(code) => self.toggle_cpv(&code).map(|_| None),
            UserEvent::ApplyCpvFilter => self.apply_cpv_filter(),
            UserEvent::ClearCpvFilter => {
                self.clear_cpv_filter();
                Ok(None)
            }
            UserEvent::OpenDetail(key) => self.open_detail(&key).map(Some),
            UserEvent::GoBack => {
                self.go_back();
                Ok(None)
            }
            UserEvent::StartCpvIntent => self.start_cpv_intent().map(|_| None),
            UserEvent::AddCpvIntent(input) => self.add_cpv_intent(&input).map(|_| None),
            UserEvent::RemoveCpvIntent(input) => {
                self.remove_cpv_intent(&input);
                Ok(None)
            }
            UserEvent::SubmitCpvIntent => self.submit_cpv_intent(),
        }
    }

    /// Adds or removes a region.
    ///
    /// Any change invalidates search results, the CPV selection and the
    /// related in-flight requests. From `ViewResults` the wizard returns to
    /// `SelectRegions`, since there are no results left to show.
    pub fn toggle_region(&mut self, region: Region) -> AppResult<()> {
        self.require_step(&[Step::SelectRegions, Step::ViewResults], "change regions")?;

        if !self.state.selected_regions.remove(&region) {
            self.state.selected_regions.insert(region);
        }
        self.invalidate_results();
        self.state.step = Step::SelectRegions;
        Ok(())
    }

    /// Starts a search over the selected regions.
    ///
    /// # Errors
    ///
    /// `ValidationError` when no region is selected.
    pub fn submit_regions(&mut self) -> AppResult<Option<Request>> {
        if self.state.selected_regions.is_empty() {
            return Err(AppError::ValidationError(
                "Select at least one region".into(),
            ));
        }
        self.require_step(&[Step::SelectRegions], "search")?;

        let regions: Vec<Region> = self.state.selected_regions.iter().cloned().collect();
        let limit = self.search_limit;
        Ok(self
            .issue(Operation::Search)
            .map(|ticket| Request::Search {
                ticket,
                regions,
                limit,
            }))
    }

    /// Adds or removes a CPV code from the filter selection.
    ///
    /// The filtered result set no longer matches the selection and is dropped.
    pub fn toggle_cpv(&mut self, input: &str) -> AppResult<()> {
        self.require_step(&[Step::ViewResults], "change the CPV filter")?;
        let code = normalize_cpv(input).ok_or_else(|| {
            AppError::ValidationError(format!("'{}' is not an 8-digit CPV code", input.trim()))
        })?;

        if !self.state.selected_cpv_codes.remove(&code) {
            self.state.selected_cpv_codes.insert(code);
        }
        self.drop_filter();
        Ok(())
    }

    /// Requests the tenders matching the selected CPV codes.
    ///
    /// The backend filters over the codes extracted for the last search, so
    /// the filter is only available once extraction and listing have finished.
    ///
    /// # Errors
    ///
    /// `ValidationError` when no CPV code is selected or CPV extraction is
    /// still running.
    pub fn apply_cpv_filter(&mut self) -> AppResult<Option<Request>> {
        if self.state.selected_cpv_codes.is_empty() {
            return Err(AppError::ValidationError(
                "Select at least one CPV code".into(),
            ));
        }
        self.require_step(&[Step::ViewResults], "apply the CPV filter")?;
        if self.state.is_loading(Operation::PopulateCpv)
            || self.state.is_loading(Operation::ListAvailableCpv)
        {
            return Err(AppError::ValidationError(
                "CPV codes are still being extracted, try again when they are listed".into(),
            ));
        }
        Ok(self.filter_request())
    }

    /// Empties the CPV selection and drops the filtered result set.
    pub fn clear_cpv_filter(&mut self) {
        self.state.selected_cpv_codes.clear();
        self.drop_filter();
    }

    /// Requests the detail of the tender identified by `key` in the active set.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when no tender in the active result set has that key.
    pub fn open_detail(&mut self, key: &str) -> AppResult<Request> {
        self.require_step(&[Step::ViewResults], "open a tender")?;
        let tender = self
            .state
            .active_results()
            .and_then(|results| results.find_by_key(key))
            .ok_or_else(|| AppError::InvalidInput(format!("No tender with key '{key}'")))?;
        let url = tender.url.clone();
        let feed_origin = tender.feed_origin.clone();

        if let Some(previous) = self.state.pending_detail_key.as_deref() {
            debug!(previous, key, "Replacing pending detail request");
        }
        let ticket = self.issue_replacing(Operation::FetchDetail);
        self.state.pending_detail_key = Some(key.to_string());
        Ok(Request::FetchDetail {
            ticket,
            key: key.to_string(),
            url,
            feed_origin,
        })
    }

    /// Moves one step back, clearing whatever the left step owned.
    pub fn go_back(&mut self) {
        match self.state.step {
            Step::ViewDetail => {
                self.state.active_detail = None;
                self.state.pending_detail_key = None;
                self.state.in_flight.remove(&Operation::FetchDetail);
                self.state.step = Step::ViewResults;
            }
            Step::ViewResults => {
                self.invalidate_results();
                self.state.step = Step::SelectRegions;
            }
            Step::SelectCpvIntent => {
                self.state.in_flight.remove(&Operation::SuggestRegions);
                self.state.step = Step::SelectRegions;
            }
            Step::SelectRegions => {}
        }
    }

    /// Enters the CPV-first path, where regions are suggested from CPV codes.
    pub fn start_cpv_intent(&mut self) -> AppResult<()> {
        self.require_step(&[Step::SelectRegions], "enter CPV codes")?;
        self.state.step = Step::SelectCpvIntent;
        Ok(())
    }

    /// Adds the 8-digit code found in `input` to the CPV intent.
    pub fn add_cpv_intent(&mut self, input: &str) -> AppResult<()> {
        self.require_step(&[Step::SelectCpvIntent], "add a CPV code")?;
        let code = normalize_cpv(input).ok_or_else(|| {
            AppError::ValidationError(
                "Enter a valid 8-digit CPV code (e.g. 30200000)".into(),
            )
        })?;
        self.state.cpv_intent.insert(code);
        Ok(())
    }

    pub fn remove_cpv_intent(&mut self, input: &str) {
        let code = normalize_cpv(input).unwrap_or_else(|| input.trim().to_string());
        self.state.cpv_intent.remove(&code);
    }

    /// Asks the backend which regions match the CPV intent.
    ///
    /// # Errors
    ///
    /// `ValidationError` when the intent is empty.
    pub fn submit_cpv_intent(&mut self) -> AppResult<Option<Request>> {
        if self.state.cpv_intent.is_empty() {
            return Err(AppError::ValidationError(
                "Add at least one CPV code to continue".into(),
            ));
        }
        self.require_step(&[Step::SelectCpvIntent], "look up regions")?;

        let codes: Vec<String> = self.state.cpv_intent.iter().cloned().collect();
        Ok(self
            .issue(Operation::SuggestRegions)
            .map(|ticket| Request::SuggestRegions { ticket, codes }))
    }

    /// Commits a finished request and returns the follow-up requests.
    ///
    /// Completions whose ticket is no longer tracked are discarded. On failure
    /// the in-flight marker is cleared, state is otherwise left untouched and
    /// the error is returned for display.
    pub fn complete(&mut self, completion: Completion) -> AppResult<Vec<Request>> {
        let Completion { ticket, result } = completion;
        if !self.is_current(ticket) {
            debug!(operation = ?ticket.operation, seq = ticket.seq, "Discarding stale completion");
            return Ok(Vec::new());
        }
        self.state.in_flight.remove(&ticket.operation);

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                if ticket.operation == Operation::FetchDetail {
                    self.state.pending_detail_key = None;
                }
                warn!(operation = ?ticket.operation, error = %e, "Request failed");
                return Err(e);
            }
        };

        if outcome.operation() != ticket.operation {
            return Err(AppError::InvalidInput(format!(
                "Completion for {:?} carried a {:?} outcome",
                ticket.operation,
                outcome.operation()
            )));
        }

        match outcome {
            Outcome::Searched(results) => Ok(self.commit_search(results)),
            Outcome::Populated(_) => Ok(self.commit_populated()),
            Outcome::CpvsListed(codes) => {
                info!(codes = codes.len(), "CPV codes available for filtering");
                self.state.available_cpvs = Some(codes);
                Ok(self.intent_filter_request().into_iter().collect())
            }
            Outcome::Filtered(results) => {
                if self.state.selected_cpv_codes.is_empty() {
                    debug!("Discarding filter result for an empty CPV selection");
                } else {
                    info!(total = results.total_count, "CPV filter applied");
                    self.state.filtered_results = Some(results);
                }
                Ok(Vec::new())
            }
            Outcome::DetailFetched(detail) => {
                self.state.active_detail = Some(detail);
                self.state.pending_detail_key = None;
                self.state.step = Step::ViewDetail;
                Ok(Vec::new())
            }
            Outcome::RegionsSuggested(suggestions) => {
                self.commit_suggestions(suggestions);
                Ok(Vec::new())
            }
        }
    }

    fn commit_search(&mut self, results: ResultSet<TenderSummary>) -> Vec<Request> {
        info!(
            regions = self.state.selected_regions.len(),
            total = results.total_count,
            "Search results stored"
        );
        self.state.base_results = Some(results);
        self.state.filtered_results = None;
        self.state.available_cpvs = None;
        self.state.step = Step::ViewResults;

        self.issue(Operation::PopulateCpv)
            .map(|ticket| Request::PopulateCpv { ticket })
            .into_iter()
            .collect()
    }

    fn commit_populated(&mut self) -> Vec<Request> {
        if !self.state.cpv_intent.is_empty() && self.state.selected_cpv_codes.is_empty() {
            self.state.selected_cpv_codes = self.state.cpv_intent.clone();
            self.drop_filter();
        }
        self.issue(Operation::ListAvailableCpv)
            .map(|ticket| Request::ListAvailableCpv { ticket })
            .into_iter()
            .collect()
    }

    fn commit_suggestions(&mut self, suggestions: RegionSuggestions) {
        let preselected: BTreeSet<Region> = suggestions
            .suggested
            .iter()
            .take(self.suggested_preselect)
            .map(|s| canonical_region(s.region.as_str()))
            .collect();
        info!(
            suggested = suggestions.suggested.len(),
            preselected = preselected.len(),
            "Regions suggested for CPV codes"
        );

        self.invalidate_results();
        self.state.selected_regions = preselected;
        self.state.suggestions = Some(suggestions);
        self.state.step = Step::SelectRegions;
    }

    /// Issues the filter implied by the CPV-first path once CPV data is ready.
    fn intent_filter_request(&mut self) -> Option<Request> {
        let seeded = !self.state.cpv_intent.is_empty()
            && self.state.selected_cpv_codes == self.state.cpv_intent
            && self.state.filtered_results.is_none();
        if seeded {
            self.filter_request()
        } else {
            None
        }
    }

    fn filter_request(&mut self) -> Option<Request> {
        let codes: Vec<String> = self.state.selected_cpv_codes.iter().cloned().collect();
        self.issue(Operation::FilterByCpv)
            .map(|ticket| Request::FilterByCpv { ticket, codes })
    }

    /// Drops the filtered set. When that changes the active set, a pending
    /// detail request no longer matches the rows on screen and is dropped too.
    fn drop_filter(&mut self) {
        if self.state.filtered_results.take().is_some() {
            self.state.pending_detail_key = None;
            self.state.in_flight.remove(&Operation::FetchDetail);
        }
        self.state.in_flight.remove(&Operation::FilterByCpv);
    }

    /// Clears everything derived from the selected regions.
    fn invalidate_results(&mut self) {
        let state = &mut self.state;
        state.base_results = None;
        state.filtered_results = None;
        state.selected_cpv_codes.clear();
        state.available_cpvs = None;
        state.active_detail = None;
        state.pending_detail_key = None;
        state
            .in_flight
            .retain(|operation, _| *operation == Operation::SuggestRegions);
    }

    fn require_step(&self, allowed: &[Step], action: &str) -> AppResult<()> {
        if allowed.contains(&self.state.step) {
            Ok(())
        } else {
            Err(AppError::InvalidTransition {
                action: action.to_string(),
                step: self.state.step.label().to_string(),
            })
        }
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.state.in_flight.get(&ticket.operation) == Some(&ticket.seq)
    }

    /// Issues a ticket unless one is already outstanding for `operation`.
    fn issue(&mut self, operation: Operation) -> Option<Ticket> {
        if self.state.in_flight.contains_key(&operation) {
            debug!(?operation, "Ignoring duplicate trigger while a request is outstanding");
            return None;
        }
        Some(self.issue_replacing(operation))
    }

    /// Issues a ticket, replacing any outstanding one for `operation`.
    fn issue_replacing(&mut self, operation: Operation) -> Ticket {
        self.next_seq += 1;
        self.state.in_flight.insert(operation, self.next_seq);
        Ticket {
            operation,
            seq: self.next_seq,
        }
    }
}
