use crate::errors::{AppError, AppResult};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK_INTERVAL: Duration = Duration::from_millis(120);

/// Creates the spinner shown while a backend request is outstanding.
///
/// The spinner stays hidden until [`start`] is called, so it can be created
/// before knowing whether an action hits the network.
///
/// ```no_run
/// use licitaciones_cli::ui;
///
/// # fn main() -> Result<(), licitaciones_cli::errors::AppError> {
/// let spinner = ui::create_spinner()?;
/// ui::start(&spinner, "Searching tenders...");
/// spinner.finish_and_clear();
/// # Ok(())
/// # }
/// ```
pub fn create_spinner() -> AppResult<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .map_err(|e| AppError::IoError(format!("Failed to create spinner template: {e}")))?,
    );
    Ok(spinner)
}

/// Shows `message` and keeps the spinner animating.
pub fn start(spinner: &ProgressBar, message: &'static str) {
    spinner.set_message(message);
    spinner.enable_steady_tick(TICK_INTERVAL);
}
