use super::{wire, TenderGateway};
use crate::config::ResolvedConfig;
use crate::constants::{
    AVAILABLE_CPV_ENDPOINT, CPV_PARAM, DETAIL_ENDPOINT, FILTER_CPV_ENDPOINT,
    POPULATE_CPV_ENDPOINT, REGION_PARAM, SEARCH_ENDPOINT, SUGGEST_REGIONS_ENDPOINT,
};
use crate::errors::{AppError, AppResult};
use crate::models::{
    CpvCode, PopulateAck, Region, RegionSuggestions, ResultSet, TenderDetail, TenderSummary,
};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// `reqwest`-backed gateway issuing GET requests against the configured base URL.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: Url,
    populate_timeout: Duration,
}

impl HttpGateway {
    /// Builds a gateway from the resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns `UrlError` if the base URL is invalid and `NetworkError` if the
    /// HTTP client cannot be built.
    pub fn new(config: &ResolvedConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url(&config.api_base_url)?,
            populate_timeout: Duration::from_secs(config.populate_timeout_secs),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Performs a GET and decodes the JSON body.
    ///
    /// Non-2xx responses become `NetworkError("HTTP <status>: <detail>")`, using
    /// the `{ detail }` envelope when the body has one and `context` otherwise.
    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
        timeout: Option<Duration>,
        context: &str,
    ) -> AppResult<Value> {
        let url = self.endpoint(path)?;
        debug!(url = %url, params = query.len(), "GET");

        let mut request = self.client.get(url).query(query);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::NetworkError(format!("{context}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = wire::error_detail(&body).unwrap_or_else(|| context.to_string());
            return Err(AppError::NetworkError(format!(
                "HTTP {}: {detail}",
                status.as_u16()
            )));
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                AppError::ParseError(format!("{context}: invalid JSON body: {e}"))
            } else {
                AppError::NetworkError(format!("{context}: {e}"))
            }
        })
    }
}

/// Parses the base URL, ensuring a trailing slash so endpoints join beneath it.
fn base_url(raw: &str) -> AppResult<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash)?;
    if url.cannot_be_a_base() {
        return Err(AppError::UrlError(format!("{raw} cannot be used as a base URL")));
    }
    Ok(url)
}

/// Builds a query with one `key=value` pair per value.
fn repeated<'a>(key: &'a str, values: impl IntoIterator<Item = &'a str>) -> Vec<(&'a str, &'a str)> {
    values.into_iter().map(|v| (key, v)).collect()
}

impl TenderGateway for HttpGateway {
    async fn search(
        &self,
        regions: &[Region],
        limit: usize,
    ) -> AppResult<ResultSet<TenderSummary>> {
        let limit = limit.to_string();
        let mut query = repeated(REGION_PARAM, regions.iter().map(Region::as_str));
        query.push(("limit", limit.as_str()));

        let value = self
            .get_json(SEARCH_ENDPOINT, &query, None, "Failed to fetch tenders")
            .await?;
        let results = wire::parse_tender_list(value)?;
        info!(
            regions = regions.len(),
            returned = results.items.len(),
            total = results.total_count,
            "Tenders fetched"
        );
        Ok(results)
    }

    async fn populate_cpv(&self) -> AppResult<PopulateAck> {
        info!("Requesting CPV extraction");
        let raw = self
            .get_json(
                POPULATE_CPV_ENDPOINT,
                &[],
                Some(self.populate_timeout),
                "Failed to populate CPV codes",
            )
            .await?;
        wire::parse_populate_ack(raw)
    }

    async fn list_available_cpv(&self) -> AppResult<Vec<CpvCode>> {
        let value = self
            .get_json(AVAILABLE_CPV_ENDPOINT, &[], None, "Failed to list CPV codes")
            .await?;
        let codes = wire::parse_cpv_list(value)?;
        info!(codes = codes.len(), "Available CPV codes fetched");
        Ok(codes)
    }

    async fn filter_by_cpv(&self, codes: &[String]) -> AppResult<ResultSet<TenderSummary>> {
        let query = repeated(CPV_PARAM, codes.iter().map(String::as_str));
        let value = self
            .get_json(FILTER_CPV_ENDPOINT, &query, None, "Failed to filter by CPV")
            .await?;
        let results = wire::parse_tender_list(value)?;
        info!(
            codes = codes.len(),
            total = results.total_count,
            "Tenders filtered by CPV"
        );
        Ok(results)
    }

    async fn fetch_detail(&self, url: &str, feed_origin: Option<&str>) -> AppResult<TenderDetail> {
        let mut query = vec![("url", url)];
        if let Some(feed) = feed_origin {
            query.push(("feed", feed));
        }
        let value = self
            .get_json(DETAIL_ENDPOINT, &query, None, "Failed to fetch tender detail")
            .await?;
        wire::parse_detail(value, url, feed_origin)
    }

    async fn suggest_regions(&self, codes: &[String]) -> AppResult<RegionSuggestions> {
        let query = repeated(CPV_PARAM, codes.iter().map(String::as_str));
        let value = self
            .get_json(
                SUGGEST_REGIONS_ENDPOINT,
                &query,
                None,
                "Failed to fetch regions for CPV codes",
            )
            .await?;
        let suggestions = wire::parse_suggestions(value)?;
        info!(
            codes = codes.len(),
            suggested = suggestions.suggested.len(),
            "Region suggestions fetched"
        );
        Ok(suggestions)
    }
}
