//! Static catalog of the regions the backend accepts as search scopes.

use crate::models::Region;

/// Autonomous communities and cities, in display order.
const COMMUNITIES: &[&str] = &[
    "andalucía",
    "aragón",
    "asturias",
    "baleares",
    "canarias",
    "cantabria",
    "castilla-la mancha",
    "castilla y león",
    "cataluña",
    "comunidad valenciana",
    "extremadura",
    "galicia",
    "madrid",
    "murcia",
    "navarra",
    "la rioja",
    "país vasco",
    "ceuta",
    "melilla",
];

const PROVINCES: &[&str] = &[
    "Álava",
    "Albacete",
    "Alicante",
    "Almería",
    "Asturias",
    "Ávila",
    "Badajoz",
    "Baleares",
    "Barcelona",
    "Burgos",
    "Cáceres",
    "Cádiz",
    "Cantabria",
    "Castellón",
    "Ciudad Real",
    "Córdoba",
    "Coruña (A)",
    "Cuenca",
    "Girona",
    "Granada",
    "Guadalajara",
    "Guipúzcoa",
    "Huelva",
    "Huesca",
    "Jaén",
    "León",
    "Lleida",
    "Lugo",
    "Madrid",
    "Málaga",
    "Murcia",
    "Navarra",
    "Ourense",
    "Palencia",
    "Palmas (Las)",
    "Pontevedra",
    "Rioja (La)",
    "Salamanca",
    "Santa Cruz de Tenerife",
    "Segovia",
    "Sevilla",
    "Soria",
    "Tarragona",
    "Teruel",
    "Toledo",
    "Valencia",
    "Valladolid",
    "Vizcaya",
    "Zamora",
    "Zaragoza",
];

/// Returns the ordered list of autonomous communities offered for selection.
pub fn list_regions() -> &'static [&'static str] {
    COMMUNITIES
}

/// Returns the ordered list of provinces.
pub fn list_provinces() -> &'static [&'static str] {
    PROVINCES
}

/// Maps user input onto the catalog spelling.
///
/// Communities are checked before provinces, so `"madrid"` resolves to the
/// community. Input that matches neither list is kept verbatim (trimmed), since
/// backend suggestions may use names outside the catalog.
pub fn canonical_region(input: &str) -> Region {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    COMMUNITIES
        .iter()
        .chain(PROVINCES.iter())
        .find(|name| name.to_lowercase() == lower)
        .map(|name| Region::new(*name))
        .unwrap_or_else(|| Region::new(trimmed))
}
