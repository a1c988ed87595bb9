//! drillbook-core: answer history, mastery scoring, and quiz selection.
//!
//! This crate holds the adaptive review core. It never touches the
//! filesystem itself; callers hand it text lines and receive encoded lines
//! back through [`traits::HistorySink`].

pub mod bank;
pub mod error;
pub mod history;
pub mod learner;
pub mod mastery;
pub mod question;
pub mod record;
pub mod report;
pub mod selector;
pub mod session;
pub mod traits;

pub use error::{CoreError, Result};
