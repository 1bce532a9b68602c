use std::fmt;

/// A Spanish autonomous community or province used as a search scope.
///
/// Regions compare by their exact string; see [`crate::regions::canonical_region`]
/// for mapping user input onto the catalog spelling.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Region(String);

impl Region {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Region {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One entry of a search or filter response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenderSummary {
    pub id: Option<String>,
    pub title: String,
    pub url: String,
    pub feed_origin: Option<String>,
    pub summary: Option<String>,
    pub organ: Option<String>,
    pub amount: Option<String>,
    pub publication_date: Option<String>,
    pub province: Option<String>,
    pub guessed_cpv: Option<String>,
}

impl TenderSummary {
    /// Returns the key identifying this tender within its result set.
    ///
    /// The backend id is used when present; otherwise the key is derived from
    /// the title and the tender's position in the list.
    pub fn key(&self, index: usize) -> String {
        match self.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("{}#{index}", self.title),
        }
    }
}

/// A downloadable tender document ("pliego").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub url: String,
    pub kind: Option<String>,
}

/// Full record of a single tender, reconciled onto one canonical shape.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TenderDetail {
    pub title: String,
    pub url: String,
    pub feed_origin: Option<String>,
    pub summary: Option<String>,
    /// Contracting body
    pub entity: Option<String>,
    pub state: Option<String>,
    pub amount: Option<String>,
    pub estimated_value: Option<String>,
    pub publication_date: Option<String>,
    pub start_date: Option<String>,
    /// Submission deadline
    pub deadline: Option<String>,
    pub province: Option<String>,
    pub description: Option<String>,
    pub cpv_codes: Vec<String>,
    pub documents: Vec<Document>,
}

/// A procurement classification code offered for filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpvCode {
    pub code: String,
    pub description: Option<String>,
    pub match_count: Option<u64>,
}

/// An ordered page of results with the backend-reported total.
///
/// `total_count` is not required to equal `items.len()`; the backend may cap
/// the returned items. Display counts must use `total_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

impl<T> ResultSet<T> {
    pub fn new(items: Vec<T>, total_count: u64) -> Self {
        Self { items, total_count }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ResultSet<TenderSummary> {
    /// Finds a tender by the key produced by [`TenderSummary::key`].
    pub fn find_by_key(&self, key: &str) -> Option<&TenderSummary> {
        self.items
            .iter()
            .enumerate()
            .find(|(index, tender)| tender.key(*index) == key)
            .map(|(_, tender)| tender)
    }
}

/// A region suggested for a set of CPV codes, with its match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSuggestion {
    pub region: Region,
    pub matches: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSuggestions {
    pub cpv_codes: Vec<String>,
    pub suggested: Vec<RegionSuggestion>,
    pub note: Option<String>,
}

/// Acknowledgement of a CPV population run. The body is opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulateAck {
    pub raw: serde_json::Value,
}
