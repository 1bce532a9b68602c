//! Parsing of interactive command lines into wizard events.

use crate::errors::{AppError, AppResult};
use crate::models::Region;
use crate::regions::{canonical_region, list_regions};
use crate::wizard::{Step, UserEvent, WizardState};

/// One parsed line of the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// An action for the wizard.
    Event(UserEvent),
    /// Narrows the CPV panel to codes or descriptions containing the term.
    FindCpv(String),
    Show,
    Help,
    Quit,
}

/// Parses a command line against the current state.
///
/// Numbers refer to the 1-based positions shown by the views: the region
/// catalog, the available CPV codes and the active tender list.
///
/// # Errors
///
/// Returns `InvalidInput` for unknown commands, missing arguments or
/// out-of-range positions.
pub fn parse_command(line: &str, state: &WizardState) -> AppResult<Command> {
    let line = line.trim();
    let (verb, arg) = match line.split_once(char::is_whitespace) {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (line, ""),
    };

    let command = match verb.to_lowercase().as_str() {
        "" | "show" | "ls" => Command::Show,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        "region" | "r" => Command::Event(UserEvent::ToggleRegion(region_arg(required(
            arg, "region",
        )?)?)),
        "search" | "s" => Command::Event(UserEvent::SubmitRegions),
        "bycpv" => Command::Event(UserEvent::StartCpvIntent),
        "suggest" => Command::Event(UserEvent::SubmitCpvIntent),
        "cpv" | "c" => {
            let code = cpv_arg(required(arg, "cpv")?, state)?;
            match state.step() {
                Step::SelectCpvIntent => Command::Event(UserEvent::AddCpvIntent(code)),
                _ => Command::Event(UserEvent::ToggleCpv(code)),
            }
        }
        "uncpv" => Command::Event(UserEvent::RemoveCpvIntent(
            required(arg, "uncpv")?.to_string(),
        )),
        "filter" | "f" => Command::Event(UserEvent::ApplyCpvFilter),
        "clear" => Command::Event(UserEvent::ClearCpvFilter),
        "open" | "o" => Command::Event(UserEvent::OpenDetail(tender_key(
            required(arg, "open")?,
            state,
        )?)),
        "back" | "b" => Command::Event(UserEvent::GoBack),
        "find" => Command::FindCpv(arg.to_string()),
        other => {
            return Err(AppError::InvalidInput(format!(
                "Unknown command '{other}', type 'help' for the list"
            )))
        }
    };
    Ok(command)
}

fn required<'a>(arg: &'a str, verb: &str) -> AppResult<&'a str> {
    if arg.is_empty() {
        Err(AppError::InvalidInput(format!("'{verb}' needs an argument")))
    } else {
        Ok(arg)
    }
}

fn position(arg: &str, len: usize, what: &str) -> AppResult<Option<usize>> {
    match arg.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Ok(Some(n - 1)),
        Ok(n) => Err(AppError::InvalidInput(format!(
            "No {what} number {n} (1-{len})"
        ))),
        Err(_) => Ok(None),
    }
}

fn region_arg(arg: &str) -> AppResult<Region> {
    let catalog = list_regions();
    match position(arg, catalog.len(), "region")? {
        Some(index) => Ok(canonical_region(catalog[index])),
        None => Ok(canonical_region(arg)),
    }
}

/// Small numbers pick from the available CPV codes; anything else is passed
/// through for the wizard to validate.
fn cpv_arg(arg: &str, state: &WizardState) -> AppResult<String> {
    if arg.len() >= 8 {
        return Ok(arg.to_string());
    }
    match state.available_cpvs() {
        Some(available) if state.step() == Step::ViewResults => {
            match position(arg, available.len(), "CPV code")? {
                Some(index) => Ok(available[index].code.clone()),
                None => Ok(arg.to_string()),
            }
        }
        _ => Ok(arg.to_string()),
    }
}

fn tender_key(arg: &str, state: &WizardState) -> AppResult<String> {
    let Some(results) = state.active_results() else {
        return Ok(arg.to_string());
    };
    match position(arg, results.items.len(), "tender")? {
        Some(index) => Ok(results.items[index].key(index)),
        None => Ok(arg.to_string()),
    }
}
