//! Error types for presentation markup parsing.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning generated markup into slides.
///
/// Only the parser tiers and the orchestrator produce these. Content
/// extraction helpers degrade to empty values instead of failing.
#[derive(Error, Debug)]
pub enum Error {
    /// The strict tier could not build a tree from the markup.
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// The markup parsed but contained no document element.
    #[error("Markup has no document element")]
    NoDocumentElement,

    /// Neither parser tier produced a single slide.
    #[error("Could not extract presentation: no slides found")]
    ExtractionFailed,

    /// A layout type name outside the known vocabulary.
    #[error("Unknown layout type: {0}")]
    UnknownLayoutType(String),
}
