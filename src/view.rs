//! Text rendering of the wizard.
//!
//! Every function here is a pure function of the state it receives. Counts
//! always come from the backend-reported `total_count`, never from the number
//! of items held.

use crate::cpv::search_catalog;
use crate::models::{CpvCode, ResultSet, TenderDetail, TenderSummary};
use crate::regions::{canonical_region, list_regions};
use crate::wizard::{Step, WizardState};
use std::collections::BTreeSet;

const SUMMARY_MAX_CHARS: usize = 160;
const CPV_PANEL_MAX_ROWS: usize = 25;

pub const HELP: &str = "\
Commands:
  region <n|name>   toggle a region (number from the list or its name)
  search            search tenders in the selected regions
  bycpv             start from CPV codes and get region suggestions
  cpv <code|n>      add a CPV code (CPV step) or toggle it in the filter (results)
  uncpv <code>      remove a CPV code from the CPV step
  suggest           look up regions for the entered CPV codes
  find <text>       search the available CPV codes by code or description
  filter            apply the CPV filter
  clear             clear the CPV filter
  open <n|key>      open a tender's detail
  back              go back one step
  show              redraw the current step
  help              show this help
  quit              exit";

/// Renders the current step, preceded by the step indicator.
pub fn render(state: &WizardState, cpv_term: &str) -> String {
    let mut sections = vec![render_steps(state.step())];
    if let Some(loading) = render_loading(state) {
        sections.push(loading);
    }
    sections.push(match state.step() {
        Step::SelectCpvIntent => render_cpv_intent(state),
        Step::SelectRegions => render_region_selection(state),
        Step::ViewResults => render_results(state, cpv_term),
        Step::ViewDetail => match state.active_detail() {
            Some(detail) => render_detail(detail),
            None => "No tender selected.".to_string(),
        },
    });
    sections.join("\n\n")
}

pub fn render_steps(current: Step) -> String {
    Step::ALL
        .iter()
        .map(|step| {
            let label = format!("{}. {}", step.number(), step.label());
            if *step == current {
                format!("[{label}]")
            } else if *step < current && *step != Step::SelectCpvIntent {
                format!("{label} ✓")
            } else {
                label
            }
        })
        .collect::<Vec<_>>()
        .join("  >  ")
}

/// Lists the operations still awaiting a response, if any.
pub fn render_loading(state: &WizardState) -> Option<String> {
    let labels: Vec<&str> = state.loading().map(|op| op.label()).collect();
    (!labels.is_empty()).then(|| labels.join("\n"))
}

pub fn render_region_selection(state: &WizardState) -> String {
    let selected = state.selected_regions();
    let mut lines = vec!["Select one or more regions:".to_string()];

    if let Some(suggestions) = state.suggestions() {
        lines.push(format!(
            "Suggested for CPV {}:",
            suggestions.cpv_codes.join(", ")
        ));
        for s in &suggestions.suggested {
            let mark = if selected.contains(&canonical_region(s.region.as_str())) {
                "x"
            } else {
                " "
            };
            lines.push(format!("  [{mark}] {} ({} matches)", s.region, s.matches));
        }
        if let Some(note) = &suggestions.note {
            lines.push(format!("  Note: {note}"));
        }
        lines.push("All regions:".to_string());
    }

    for (index, name) in list_regions().iter().enumerate() {
        let mark = if selected.iter().any(|r| r.as_str() == *name) {
            "x"
        } else {
            " "
        };
        lines.push(format!("  {:>2}. [{mark}] {name}", index + 1));
    }

    if selected.is_empty() {
        lines.push("No region selected.".to_string());
    } else {
        let names: Vec<&str> = selected.iter().map(|r| r.as_str()).collect();
        lines.push(format!("Selected: {}", names.join(", ")));
    }
    lines.join("\n")
}

pub fn render_cpv_intent(state: &WizardState) -> String {
    let mut lines = vec![
        "Add one or more CPV codes (8 digits). Regions with matching tenders will be suggested."
            .to_string(),
    ];
    if state.cpv_intent().is_empty() {
        lines.push("No CPV code added yet.".to_string());
    } else {
        let codes: Vec<&str> = state.cpv_intent().iter().map(String::as_str).collect();
        lines.push(format!("CPV codes: {}", codes.join(", ")));
    }
    lines.join("\n")
}

pub fn render_results(state: &WizardState, cpv_term: &str) -> String {
    let Some(results) = state.active_results() else {
        return "No results loaded.".to_string();
    };

    let mut sections = Vec::new();
    if state.is_filtered() {
        let codes: Vec<&str> = state.selected_cpv_codes().iter().map(String::as_str).collect();
        sections.push(format!(
            "Found {} tenders matching CPV {}",
            results.total_count,
            codes.join(", ")
        ));
    } else {
        sections.push(format!("Found {} tenders", results.total_count));
    }
    sections.push(render_tender_list(results, state.pending_detail_key()));
    sections.push(render_cpv_panel(
        state.available_cpvs(),
        state.selected_cpv_codes(),
        cpv_term,
    ));
    sections.join("\n\n")
}

/// Renders a numbered tender list; numbers are 1-based positions.
pub fn render_tender_list(results: &ResultSet<TenderSummary>, pending_key: Option<&str>) -> String {
    if results.is_empty() {
        return "No tenders to show.".to_string();
    }

    let mut lines = Vec::with_capacity(results.items.len() * 3);
    for (index, tender) in results.items.iter().enumerate() {
        let loading = if pending_key == Some(tender.key(index).as_str()) {
            "  (loading...)"
        } else {
            ""
        };
        lines.push(format!("{:>3}. {}{loading}", index + 1, tender.title));

        let meta: Vec<&str> = [
            tender.organ.as_deref(),
            tender.amount.as_deref(),
            tender.publication_date.as_deref(),
            tender.province.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !meta.is_empty() {
            lines.push(format!("     {}", meta.join(" | ")));
        }
        if let Some(cpv) = &tender.guessed_cpv {
            lines.push(format!("     CPV: {cpv}"));
        }
        if let Some(summary) = &tender.summary {
            lines.push(format!("     {}", truncate(summary, SUMMARY_MAX_CHARS)));
        }
    }
    lines.join("\n")
}

/// Renders the available CPV codes, narrowed by `term`, marking the selection.
pub fn render_cpv_panel(
    available: Option<&[CpvCode]>,
    selected: &BTreeSet<String>,
    term: &str,
) -> String {
    let Some(available) = available else {
        return "CPV codes not loaded yet.".to_string();
    };
    if available.is_empty() {
        return "No CPV codes available for the current tenders.".to_string();
    }

    let matching = search_catalog(available, term);
    let mut lines = vec![format!("Filter by CPV ({} available)", available.len())];
    if !term.trim().is_empty() {
        lines.push(format!("Search: \"{}\" ({} matching)", term.trim(), matching.len()));
    }
    for cpv in matching.iter().take(CPV_PANEL_MAX_ROWS) {
        let position = available
            .iter()
            .position(|c| c.code == cpv.code)
            .map(|p| p + 1)
            .unwrap_or_default();
        let mark = if selected.contains(&cpv.code) { "x" } else { " " };
        let mut line = format!("  {position:>3}. [{mark}] {}", cpv.code);
        if let Some(count) = cpv.match_count {
            line.push_str(&format!(" ({count})"));
        }
        if let Some(description) = &cpv.description {
            line.push_str(&format!("  {description}"));
        }
        lines.push(line);
    }
    if matching.len() > CPV_PANEL_MAX_ROWS {
        lines.push(format!(
            "  ... {} more, narrow with `find <text>`",
            matching.len() - CPV_PANEL_MAX_ROWS
        ));
    }
    if !selected.is_empty() {
        let codes: Vec<&str> = selected.iter().map(String::as_str).collect();
        lines.push(format!("Selected: {}", codes.join(", ")));
    }
    lines.join("\n")
}

pub fn render_detail(detail: &TenderDetail) -> String {
    let mut lines = vec![detail.title.clone(), String::new()];

    let fields = [
        ("Contracting body", &detail.entity),
        ("State", &detail.state),
        ("Amount", &detail.amount),
        ("Estimated value", &detail.estimated_value),
        ("Published", &detail.publication_date),
        ("Start date", &detail.start_date),
        ("Submission deadline", &detail.deadline),
        ("Province", &detail.province),
        ("Source feed", &detail.feed_origin),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            lines.push(format!("{label}: {value}"));
        }
    }
    lines.push(format!("URL: {}", detail.url));

    if let Some(description) = detail.description.as_ref().or(detail.summary.as_ref()) {
        lines.push(String::new());
        lines.push(description.clone());
    }

    if !detail.cpv_codes.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "CPV codes ({}): {}",
            detail.cpv_codes.len(),
            detail.cpv_codes.join(", ")
        ));
    }

    if !detail.documents.is_empty() {
        lines.push(String::new());
        lines.push(format!("Documents ({}):", detail.documents.len()));
        for document in &detail.documents {
            match &document.kind {
                Some(kind) if *kind != document.name => {
                    lines.push(format!("  - {} [{kind}] {}", document.name, document.url))
                }
                _ => lines.push(format!("  - {} {}", document.name, document.url)),
            }
        }
    }
    lines.join("\n")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
