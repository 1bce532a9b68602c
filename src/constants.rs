// Backend
pub const DEFAULT_API_BASE_URL: &str = "https://licitaciones-backend-1.onrender.com";

// Endpoint paths, joined onto the base URL
pub const SEARCH_ENDPOINT: &str = "licitaciones_es";
pub const POPULATE_CPV_ENDPOINT: &str = "cpv_licitaciones";
pub const AVAILABLE_CPV_ENDPOINT: &str = "cpv_disponibles";
pub const FILTER_CPV_ENDPOINT: &str = "filtrar_cpvs";
pub const DETAIL_ENDPOINT: &str = "detalle_licitacion";
pub const SUGGEST_REGIONS_ENDPOINT: &str = "comunidades_por_cpvs";

// Query parameter names
pub const REGION_PARAM: &str = "comunidades";
pub const CPV_PARAM: &str = "cpvs";

// Defaults
pub const DEFAULT_SEARCH_LIMIT: usize = 100;
pub const DEFAULT_SUGGESTED_PRESELECT: usize = 5;

// Patterns
pub const CPV_CODE_PATTERN: &str = r"\b\d{8}\b";
