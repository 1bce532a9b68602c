//! licitaciones-cli library
//!
//! Core of the `licitaciones` binary, a guided search over Spanish public
//! tenders served by a remote backend.
//!
//! ## Overview
//!
//! - [`wizard`] - State machine driving region selection, results, CPV filtering and detail
//! - [`gateway`] - Typed HTTP access to the backend and payload normalisation
//! - [`view`] - Text rendering of each wizard step
//! - [`commands`] - Parsing of interactive command lines into wizard events
//! - [`regions`] - Static catalog of communities and provinces
//! - [`cpv`] - CPV code normalisation and catalog search
//! - [`cli`] - Command-line interface and the interactive loop
//! - [`config`], [`logging`], [`ui`] - Configuration, tracing setup and the loading spinner
//! - [`models`] - Domain records shared by the modules above
//! - [`errors`] - Error types used throughout the application
//!
//! ## Example Usage
//!
//! ```no_run
//! use licitaciones_cli::config::ResolvedConfig;
//! use licitaciones_cli::gateway::HttpGateway;
//! use licitaciones_cli::models::Region;
//! use licitaciones_cli::wizard::{Session, UserEvent, Wizard};
//! use licitaciones_cli::errors::AppResult;
//!
//! # async fn example() -> AppResult<()> {
//! let config = ResolvedConfig::default();
//! let mut session = Session::new(Wizard::new(&config), HttpGateway::new(&config)?);
//!
//! session.dispatch(UserEvent::ToggleRegion(Region::from("madrid"))).await?;
//! session.dispatch(UserEvent::SubmitRegions).await?;
//! println!("{} tenders", session.state().active_results().map_or(0, |r| r.total_count));
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod cpv;
pub mod errors;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod regions;
pub mod ui;
pub mod view;
pub mod wizard;
