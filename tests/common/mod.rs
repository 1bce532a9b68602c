//! Common test utilities for integration tests

use licitaciones_cli::errors::{AppError, AppResult};
use licitaciones_cli::gateway::TenderGateway;
use licitaciones_cli::models::{
    CpvCode, PopulateAck, Region, RegionSuggestion, RegionSuggestions, ResultSet, TenderDetail,
    TenderSummary,
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Gateway answering from per-operation scripts and recording every call.
///
/// An operation without a scripted response fails with `NetworkError`.
#[derive(Default)]
#[allow(dead_code)]
pub struct FakeGateway {
    searches: Mutex<VecDeque<AppResult<ResultSet<TenderSummary>>>>,
    populates: Mutex<VecDeque<AppResult<PopulateAck>>>,
    cpv_lists: Mutex<VecDeque<AppResult<Vec<CpvCode>>>>,
    filters: Mutex<VecDeque<AppResult<ResultSet<TenderSummary>>>>,
    details: Mutex<VecDeque<AppResult<TenderDetail>>>,
    suggestions: Mutex<VecDeque<AppResult<RegionSuggestions>>>,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_search(self, response: AppResult<ResultSet<TenderSummary>>) -> Self {
        self.searches.lock().unwrap().push_back(response);
        self
    }

    pub fn on_populate(self, response: AppResult<PopulateAck>) -> Self {
        self.populates.lock().unwrap().push_back(response);
        self
    }

    pub fn on_list_cpv(self, response: AppResult<Vec<CpvCode>>) -> Self {
        self.cpv_lists.lock().unwrap().push_back(response);
        self
    }

    pub fn on_filter(self, response: AppResult<ResultSet<TenderSummary>>) -> Self {
        self.filters.lock().unwrap().push_back(response);
        self
    }

    pub fn on_detail(self, response: AppResult<TenderDetail>) -> Self {
        self.details.lock().unwrap().push_back(response);
        self
    }

    pub fn on_suggest(self, response: AppResult<RegionSuggestions>) -> Self {
        self.suggestions.lock().unwrap().push_back(response);
        self
    }

    /// Calls made so far, oldest first, e.g. `search madrid limit=100`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn next<T>(script: &Mutex<VecDeque<AppResult<T>>>, operation: &str) -> AppResult<T> {
    script
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(AppError::NetworkError(format!("no scripted {operation}"))))
}

impl TenderGateway for FakeGateway {
    async fn search(
        &self,
        regions: &[Region],
        limit: usize,
    ) -> AppResult<ResultSet<TenderSummary>> {
        let names: Vec<&str> = regions.iter().map(Region::as_str).collect();
        self.record(format!("search {} limit={limit}", names.join(",")));
        next(&self.searches, "search")
    }

    async fn populate_cpv(&self) -> AppResult<PopulateAck> {
        self.record("populate".to_string());
        next(&self.populates, "populate")
    }

    async fn list_available_cpv(&self) -> AppResult<Vec<CpvCode>> {
        self.record("list_cpv".to_string());
        next(&self.cpv_lists, "CPV list")
    }

    async fn filter_by_cpv(&self, codes: &[String]) -> AppResult<ResultSet<TenderSummary>> {
        self.record(format!("filter {}", codes.join(",")));
        next(&self.filters, "filter")
    }

    async fn fetch_detail(&self, url: &str, feed_origin: Option<&str>) -> AppResult<TenderDetail> {
        self.record(format!("detail {url} feed={}", feed_origin.unwrap_or("-")));
        next(&self.details, "detail")
    }

    async fn suggest_regions(&self, codes: &[String]) -> AppResult<RegionSuggestions> {
        self.record(format!("suggest {}", codes.join(",")));
        next(&self.suggestions, "suggestion")
    }
}

#[allow(dead_code)]
pub fn tender(id: &str) -> TenderSummary {
    TenderSummary {
        id: Some(id.to_string()),
        title: format!("Licitación {id}"),
        url: format!("https://contrataciondelestado.es/licitacion/{id}"),
        feed_origin: Some("licitacionesPerfilesContratanteCompleto3".to_string()),
        summary: None,
        organ: Some("Ayuntamiento de Madrid".to_string()),
        amount: Some("15000".to_string()),
        publication_date: Some("2024-03-01".to_string()),
        province: Some("Madrid".to_string()),
        guessed_cpv: None,
    }
}

/// A result set of tenders with the given ids and backend total.
#[allow(dead_code)]
pub fn results(ids: &[&str], total_count: u64) -> ResultSet<TenderSummary> {
    ResultSet::new(ids.iter().map(|id| tender(id)).collect(), total_count)
}

#[allow(dead_code)]
pub fn cpv(code: &str, description: &str) -> CpvCode {
    CpvCode {
        code: code.to_string(),
        description: Some(description.to_string()),
        match_count: Some(1),
    }
}

#[allow(dead_code)]
pub fn ack() -> PopulateAck {
    PopulateAck {
        raw: serde_json::json!({ "status": "ok" }),
    }
}

#[allow(dead_code)]
pub fn detail(title: &str) -> TenderDetail {
    TenderDetail {
        title: title.to_string(),
        url: format!("https://contrataciondelestado.es/{title}"),
        ..TenderDetail::default()
    }
}

#[allow(dead_code)]
pub fn suggestions(pairs: &[(&str, u64)]) -> RegionSuggestions {
    RegionSuggestions {
        cpv_codes: vec!["30200000".to_string()],
        suggested: pairs
            .iter()
            .map(|(region, matches)| RegionSuggestion {
                region: Region::from(*region),
                matches: *matches,
            })
            .collect(),
        note: None,
    }
}

/// Search body mixing CPV shapes, numeric amounts and a missing id.
#[allow(dead_code)]
pub const SEARCH_BODY: &str = r#"{
  "results": [
    {
      "id": "ES-2024-001",
      "title": "Suministro de equipos informáticos",
      "url": "https://contrataciondelestado.es/licitacion/1",
      "feed_origen": "licitacionesPerfilesContratanteCompleto3",
      "organo_contratacion": "Ayuntamiento de Madrid",
      "importe": 48000.5,
      "fecha_publicacion": "2024-03-01",
      "provincia": "Madrid",
      "cpv_guess": "30200000"
    },
    {
      "title": "Obras de urbanización",
      "url": "https://contrataciondelestado.es/licitacion/2",
      "summary": "   "
    }
  ],
  "count": 812
}"#;

/// Detail body carrying both alternate names for entity, deadline and documents.
#[allow(dead_code)]
pub const DETAIL_BODY: &str = r#"{
  "title": "Suministro de equipos informáticos",
  "organo_contratacion": "Ayuntamiento de Madrid",
  "entidad": "Madrid",
  "plazo_presentacion": "2024-04-15",
  "fecha_limite": "2024-04-10",
  "cpv": ["30200000", " 30200000", "", "30213000"],
  "pliegos_xml": [
    { "nombre": "Pliego de cláusulas", "url": "https://contrataciondelestado.es/pcap.pdf", "tipo": "PCAP" },
    { "url": "https://contrataciondelestado.es/ppt.pdf", "tipo": "PPT" },
    { "url": "https://contrataciondelestado.es/anexo.pdf" }
  ],
  "pliegos": [
    { "nombre": "Ignored", "url": "https://contrataciondelestado.es/ignored.pdf" }
  ]
}"#;
