//! Typed access to the tenders backend.
//!
//! The [`TenderGateway`] trait is the seam between the wizard and the network;
//! [`HttpGateway`] is the production implementation. Payload normalisation lives
//! in [`wire`].

mod http;
pub mod wire;

use crate::errors::AppResult;
use crate::models::{
    CpvCode, PopulateAck, Region, RegionSuggestions, ResultSet, TenderDetail, TenderSummary,
};

// Re-export public API
pub use http::HttpGateway;

/// The backend operations the wizard depends on. Implementations own no state.
///
/// Every method fails with `NetworkError` (unreachable or non-2xx) or
/// `BackendError` (2xx error envelope); undecodable bodies are `ParseError`.
#[allow(async_fn_in_trait)]
pub trait TenderGateway {
    /// Searches tenders in the given regions, returning at most `limit` items.
    async fn search(&self, regions: &[Region], limit: usize)
        -> AppResult<ResultSet<TenderSummary>>;

    /// Triggers backend-side CPV extraction for the most recent search.
    ///
    /// May take several seconds.
    async fn populate_cpv(&self) -> AppResult<PopulateAck>;

    /// Lists the CPV codes available for filtering, unique by code.
    async fn list_available_cpv(&self) -> AppResult<Vec<CpvCode>>;

    /// Restricts the most recent search to tenders matching any of `codes`.
    async fn filter_by_cpv(&self, codes: &[String]) -> AppResult<ResultSet<TenderSummary>>;

    /// Fetches one tender in full. The returned record always carries `url`
    /// and, when given, `feed_origin`.
    async fn fetch_detail(&self, url: &str, feed_origin: Option<&str>) -> AppResult<TenderDetail>;

    /// Suggests regions likely to contain tenders for `codes`.
    async fn suggest_regions(&self, codes: &[String]) -> AppResult<RegionSuggestions>;
}
