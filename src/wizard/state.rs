use crate::models::{CpvCode, Region, RegionSuggestions, ResultSet, TenderDetail, TenderSummary};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The wizard steps, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Step {
    /// Optional entry path: enter CPV codes and get region suggestions.
    SelectCpvIntent,
    #[default]
    SelectRegions,
    ViewResults,
    ViewDetail,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::SelectCpvIntent,
        Step::SelectRegions,
        Step::ViewResults,
        Step::ViewDetail,
    ];

    /// 1-based position shown in the step indicator.
    pub fn number(&self) -> u8 {
        match self {
            Self::SelectCpvIntent => 1,
            Self::SelectRegions => 2,
            Self::ViewResults => 3,
            Self::ViewDetail => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::SelectCpvIntent => "CPV codes",
            Self::SelectRegions => "Regions",
            Self::ViewResults => "Tenders",
            Self::ViewDetail => "Detail",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Logical backend operations. At most one request per operation is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    Search,
    PopulateCpv,
    ListAvailableCpv,
    FilterByCpv,
    FetchDetail,
    SuggestRegions,
}

impl Operation {
    /// Progress message shown while the operation is outstanding.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Search => "Searching tenders...",
            Self::PopulateCpv => "Extracting CPV codes (this may take a while)...",
            Self::ListAvailableCpv => "Loading available CPV codes...",
            Self::FilterByCpv => "Applying CPV filter...",
            Self::FetchDetail => "Loading tender detail...",
            Self::SuggestRegions => "Looking up regions for the CPV codes...",
        }
    }
}

/// Identifies one issued request. A completion is committed only while its
/// ticket is still the one tracked for the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub operation: Operation,
    pub seq: u64,
}

/// Everything the wizard knows during a session.
///
/// Fields are only mutated by [`crate::wizard::Wizard`]; read access goes through
/// the accessors so the views can never break an invariant.
#[derive(Debug, Clone, Default)]
pub struct WizardState {
    pub(crate) step: Step,
    pub(crate) selected_regions: BTreeSet<Region>,
    pub(crate) selected_cpv_codes: BTreeSet<String>,
    pub(crate) base_results: Option<ResultSet<TenderSummary>>,
    pub(crate) filtered_results: Option<ResultSet<TenderSummary>>,
    pub(crate) active_detail: Option<TenderDetail>,
    pub(crate) pending_detail_key: Option<String>,
    pub(crate) cpv_intent: BTreeSet<String>,
    pub(crate) suggestions: Option<RegionSuggestions>,
    pub(crate) available_cpvs: Option<Vec<CpvCode>>,
    pub(crate) in_flight: BTreeMap<Operation, u64>,
}

impl WizardState {
    pub fn step(&self) -> Step {
        self.step
    }

    pub fn selected_regions(&self) -> &BTreeSet<Region> {
        &self.selected_regions
    }

    pub fn selected_cpv_codes(&self) -> &BTreeSet<String> {
        &self.selected_cpv_codes
    }

    pub fn base_results(&self) -> Option<&ResultSet<TenderSummary>> {
        self.base_results.as_ref()
    }

    pub fn filtered_results(&self) -> Option<&ResultSet<TenderSummary>> {
        self.filtered_results.as_ref()
    }

    pub fn active_detail(&self) -> Option<&TenderDetail> {
        self.active_detail.as_ref()
    }

    pub fn pending_detail_key(&self) -> Option<&str> {
        self.pending_detail_key.as_deref()
    }

    pub fn cpv_intent(&self) -> &BTreeSet<String> {
        &self.cpv_intent
    }

    pub fn suggestions(&self) -> Option<&RegionSuggestions> {
        self.suggestions.as_ref()
    }

    pub fn available_cpvs(&self) -> Option<&[CpvCode]> {
        self.available_cpvs.as_deref()
    }

    /// The result set to display: the CPV-filtered set when one has completed
    /// for the current selection, otherwise the unfiltered search results.
    pub fn active_results(&self) -> Option<&ResultSet<TenderSummary>> {
        self.filtered_results.as_ref().or(self.base_results.as_ref())
    }

    /// Returns `true` when the active set is the CPV-filtered one.
    pub fn is_filtered(&self) -> bool {
        self.filtered_results.is_some()
    }

    pub fn is_loading(&self, operation: Operation) -> bool {
        self.in_flight.contains_key(&operation)
    }

    /// Operations currently awaiting a completion.
    pub fn loading(&self) -> impl Iterator<Item = Operation> + '_ {
        self.in_flight.keys().copied()
    }
}
