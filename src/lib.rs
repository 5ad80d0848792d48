//! Form-field classification and fill orchestration.
//!
//! A pass walks the controls under a root node, classifies each one
//! (custom rules, then the ordered pattern rules, then the confidence
//! fallback), generates a value that fits the control and writes it back
//! through a [`dom::host::FormHost`] with the event sequence reactive
//! front-ends expect. See [`engine::session::fill_form`].

pub mod classify;
pub mod cli;
pub mod config;
pub mod dom;
pub mod engine;
pub mod error;
pub mod field;
pub mod fill;
pub mod generate;
pub mod report;
pub mod trace;

pub use config::settings::FillConfig;
pub use engine::session::fill_form;
pub use report::report_model::FillReport;
