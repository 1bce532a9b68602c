use crate::constants::CPV_CODE_PATTERN;
use crate::models::CpvCode;
use regex::Regex;
use std::sync::OnceLock;

/// Cached regex matching a bare 8-digit CPV identifier.
static CPV_REGEX: OnceLock<Regex> = OnceLock::new();

/// Extracts the 8-digit CPV identifier from free-form input.
///
/// Accepts values such as `"30200000"`, `"30200000-1"` (with check digit) or
/// `"CPV 30200000 Equipo informático"`. Returns `None` when no 8-digit group
/// is present.
pub fn normalize_cpv(input: &str) -> Option<String> {
    let regex = CPV_REGEX.get_or_init(|| {
        Regex::new(CPV_CODE_PATTERN).expect("CPV_CODE_PATTERN is a valid regex pattern")
    });
    regex.find(input).map(|m| m.as_str().to_string())
}

/// Filters a CPV catalog by a case-insensitive substring over code and description.
///
/// An empty or blank term returns every entry.
pub fn search_catalog<'a>(catalog: &'a [CpvCode], term: &str) -> Vec<&'a CpvCode> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return catalog.iter().collect();
    }
    catalog
        .iter()
        .filter(|cpv| {
            cpv.code.to_lowercase().contains(&needle)
                || cpv
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .collect()
}
