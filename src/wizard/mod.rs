//! Multi-step search wizard.
//!
//! [`Wizard`] is a synchronous state machine: actions return backend
//! [`Request`]s tagged with a [`Ticket`], and [`Wizard::complete`] commits the
//! matching [`Completion`] only while that ticket is still current. [`Session`]
//! runs the requests against a [`crate::gateway::TenderGateway`].

mod event;
mod machine;
mod request;
mod session;
mod state;

// Re-export public API
pub use event::UserEvent;
pub use machine::Wizard;
pub use request::{execute, Completion, Outcome, Request};
pub use session::Session;
pub use state::{Operation, Step, Ticket, WizardState};
