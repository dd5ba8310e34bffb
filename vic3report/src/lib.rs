//! Presentation layer for `vic3save`: builds report models from an
//! [`Analysis`] and renders them as text, CSV or JSON.

pub mod context;
pub mod format;
pub mod reports;

#[cfg(test)]
pub(crate) mod testing;

pub use context::Analysis;
pub use format::OutputFormat;
pub use reports::{render, Report};
