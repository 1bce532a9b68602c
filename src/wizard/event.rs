use crate::models::Region;

/// User actions the wizard consumes, one per interaction the views expose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    ToggleRegion(Region),
    SubmitRegions,
    ToggleCpv(String),
    ApplyCpvFilter,
    ClearCpvFilter,
    /// Opens the tender with this key in the active result set.
    OpenDetail(String),
    GoBack,
    StartCpvIntent,
    AddCpvIntent(String),
    RemoveCpvIntent(String),
    SubmitCpvIntent,
}
