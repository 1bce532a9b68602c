//! Backend payload shapes and their normalisation onto the crate's models.
//!
//! Everything the backend sends in more than one shape (scalar-or-list CPV
//! fields, alternate field names, numbers where strings are expected) is
//! reconciled here so the wizard and the views never branch on shape.

use crate::cpv::normalize_cpv;
use crate::errors::{AppError, AppResult};
use crate::models::{
    CpvCode, Document, PopulateAck, Region, RegionSuggestion, RegionSuggestions, ResultSet,
    TenderDetail, TenderSummary,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::warn;

/// Reads an optional display string, accepting numbers and booleans.
///
/// Blank strings become `None`.
fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Reads a display string that may be missing, `null`, numeric or boolean.
///
/// Anything without a textual form becomes the empty string.
fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_text(deserializer)?.unwrap_or_default())
}

/// Reads a count sent as a number, a numeric string or `null`.
fn count_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

/// Text of a string or number; other JSON values have none.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A field the backend sends either as a single value or as a list.
///
/// Codes may arrive as strings or numbers; entries of any other type are
/// dropped.
#[derive(Debug)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for OneOrMany {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => Self::Many(items.into_iter().filter_map(scalar_text).collect()),
            other => Self::One(scalar_text(other).unwrap_or_default()),
        })
    }
}

/// Normalises a scalar-or-sequence CPV field into a sequence.
///
/// Entries are trimmed, blanks dropped and duplicates removed, keeping the
/// first occurrence. A missing field yields an empty list.
pub fn normalize_cpv_field(field: Option<OneOrMany>) -> Vec<String> {
    let raw = match field {
        None => Vec::new(),
        Some(OneOrMany::One(code)) => vec![code],
        Some(OneOrMany::Many(codes)) => codes,
    };

    let mut seen = BTreeSet::new();
    raw.into_iter()
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
        .filter(|code| seen.insert(code.clone()))
        .collect()
}

#[derive(Debug, Deserialize)]
struct WireTender {
    #[serde(default, deserialize_with = "opt_text")]
    id: Option<String>,
    #[serde(default, deserialize_with = "text_or_empty")]
    title: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    url: String,
    #[serde(default, deserialize_with = "opt_text")]
    feed_origen: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    summary: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    organo_contratacion: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    importe: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    fecha_publicacion: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    provincia: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    cpv_guess: Option<String>,
}

impl From<WireTender> for TenderSummary {
    fn from(wire: WireTender) -> Self {
        Self {
            id: wire.id,
            title: wire.title.trim().to_string(),
            url: wire.url.trim().to_string(),
            feed_origin: wire.feed_origen,
            summary: wire.summary,
            organ: wire.organo_contratacion,
            amount: wire.importe,
            publication_date: wire.fecha_publicacion,
            province: wire.provincia,
            guessed_cpv: wire.cpv_guess,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireTenderList {
    results: Vec<WireTender>,
    #[serde(default)]
    count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WireCpvEntry {
    #[serde(default, deserialize_with = "text_or_empty")]
    code: String,
    #[serde(default, deserialize_with = "opt_text")]
    description: Option<String>,
    #[serde(default)]
    count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireCpv {
    Full(WireCpvEntry),
    Bare(Value),
}

#[derive(Debug, Deserialize)]
struct WireCpvList {
    cpvs: Vec<WireCpv>,
}

#[derive(Debug, Deserialize)]
struct WirePliego {
    #[serde(default, deserialize_with = "opt_text")]
    nombre: Option<String>,
    #[serde(default, deserialize_with = "text_or_empty")]
    url: String,
    #[serde(default, deserialize_with = "opt_text")]
    tipo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireDetail {
    #[serde(default, deserialize_with = "text_or_empty")]
    title: String,
    #[serde(default, deserialize_with = "opt_text")]
    url: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    feed_origen: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    summary: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    organo_contratacion: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    entidad: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    estado: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    importe: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    valor_estimado: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    fecha_publicacion: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    fecha_inicio: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    plazo_presentacion: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    fecha_limite: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    provincia: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    descripcion: Option<String>,
    #[serde(default)]
    cpv: Option<OneOrMany>,
    #[serde(default)]
    pliegos: Option<Vec<WirePliego>>,
    #[serde(default)]
    pliegos_xml: Option<Vec<WirePliego>>,
}

#[derive(Debug, Deserialize)]
struct WireSuggestion {
    #[serde(default, deserialize_with = "text_or_empty")]
    comunidad: String,
    #[serde(default, deserialize_with = "count_or_zero")]
    matches: u64,
}

#[derive(Debug, Deserialize)]
struct WireSuggestions {
    #[serde(default)]
    cpvs: Option<OneOrMany>,
    sugeridas: Vec<WireSuggestion>,
    #[serde(default, deserialize_with = "opt_text")]
    nota: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// Extracts the message of a `{ "detail": ... }` error body, if any.
///
/// Non-string details (e.g. validation error lists) are rendered as JSON.
pub fn error_detail(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let value = envelope.detail.or(envelope.error)?;
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::String(_) | Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Rejects a 2xx body that carries an error envelope instead of `expected_key`.
fn reject_envelope(value: &Value, expected_key: &str) -> AppResult<()> {
    if value.get(expected_key).is_some() {
        return Ok(());
    }
    match error_detail(&value.to_string()) {
        Some(detail) => Err(AppError::BackendError(detail)),
        None => Ok(()),
    }
}

fn decode<T: for<'de> Deserialize<'de>>(value: Value, what: &str) -> AppResult<T> {
    serde_json::from_value(value)
        .map_err(|e| AppError::ParseError(format!("Unexpected {what} response: {e}")))
}

/// Wraps the opaque body of a CPV population run.
///
/// The acknowledgement has no fixed key, so a body made only of error
/// envelope keys (`detail`, `error`) is taken as a backend error.
pub fn parse_populate_ack(value: Value) -> AppResult<PopulateAck> {
    let envelope_only = value.as_object().is_some_and(|body| {
        !body.is_empty() && body.keys().all(|key| key == "detail" || key == "error")
    });
    if envelope_only {
        if let Some(detail) = error_detail(&value.to_string()) {
            return Err(AppError::BackendError(detail));
        }
    }
    Ok(PopulateAck { raw: value })
}

/// Decodes a `{ results, count }` body. A missing `count` falls back to the item count.
pub fn parse_tender_list(value: Value) -> AppResult<ResultSet<TenderSummary>> {
    reject_envelope(&value, "results")?;
    let wire: WireTenderList = decode(value, "tender list")?;
    let items: Vec<TenderSummary> = wire.results.into_iter().map(Into::into).collect();
    let total_count = wire.count.unwrap_or(items.len() as u64);
    Ok(ResultSet::new(items, total_count))
}

/// Decodes a `{ cpvs, count }` body into codes unique by their 8-digit id.
pub fn parse_cpv_list(value: Value) -> AppResult<Vec<CpvCode>> {
    reject_envelope(&value, "cpvs")?;
    let wire: WireCpvList = decode(value, "CPV list")?;

    let mut seen = BTreeSet::new();
    let mut codes = Vec::with_capacity(wire.cpvs.len());
    for entry in wire.cpvs {
        let (raw, description, match_count) = match entry {
            WireCpv::Full(e) => (e.code, e.description, e.count),
            WireCpv::Bare(value) => (scalar_text(value).unwrap_or_default(), None, None),
        };
        let Some(code) = normalize_cpv(&raw) else {
            warn!(code = %raw, "Skipping CPV entry without an 8-digit code");
            continue;
        };
        if seen.insert(code.clone()) {
            codes.push(CpvCode {
                code,
                description,
                match_count,
            });
        }
    }
    Ok(codes)
}

fn to_documents(pliegos: Vec<WirePliego>) -> Vec<Document> {
    pliegos
        .into_iter()
        .filter(|p| !p.url.trim().is_empty())
        .enumerate()
        .map(|(index, p)| Document {
            name: p
                .nombre
                .or_else(|| p.tipo.clone())
                .unwrap_or_else(|| format!("Documento {}", index + 1)),
            url: p.url.trim().to_string(),
            kind: p.tipo,
        })
        .collect()
}

/// Decodes a detail body and reconciles alternate field names.
///
/// `url` and `feed_origin` are echoed from the request when the body omits them.
pub fn parse_detail(
    value: Value,
    request_url: &str,
    request_feed: Option<&str>,
) -> AppResult<TenderDetail> {
    reject_envelope(&value, "title")?;
    let wire: WireDetail = decode(value, "tender detail")?;

    let documents = match (wire.pliegos_xml, wire.pliegos) {
        (Some(xml), _) if !xml.is_empty() => to_documents(xml),
        (_, Some(plain)) => to_documents(plain),
        _ => Vec::new(),
    };

    Ok(TenderDetail {
        title: wire.title.trim().to_string(),
        url: wire.url.unwrap_or_else(|| request_url.to_string()),
        feed_origin: wire
            .feed_origen
            .or_else(|| request_feed.map(str::to_string)),
        summary: wire.summary,
        entity: wire.organo_contratacion.or(wire.entidad),
        state: wire.estado,
        amount: wire.importe,
        estimated_value: wire.valor_estimado,
        publication_date: wire.fecha_publicacion,
        start_date: wire.fecha_inicio,
        deadline: wire.plazo_presentacion.or(wire.fecha_limite),
        province: wire.provincia,
        description: wire.descripcion,
        cpv_codes: normalize_cpv_field(wire.cpv),
        documents,
    })
}

/// Decodes a `{ cpvs, sugeridas, nota }` body.
pub fn parse_suggestions(value: Value) -> AppResult<RegionSuggestions> {
    reject_envelope(&value, "sugeridas")?;
    let wire: WireSuggestions = decode(value, "region suggestion")?;
    Ok(RegionSuggestions {
        cpv_codes: normalize_cpv_field(wire.cpvs),
        suggested: wire
            .sugeridas
            .into_iter()
            .filter(|s| !s.comunidad.is_empty())
            .map(|s| RegionSuggestion {
                region: Region::new(s.comunidad.trim()),
                matches: s.matches,
            })
            .collect(),
        note: wire.nota,
    })
}
