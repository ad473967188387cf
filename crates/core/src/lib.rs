//! Core slide record types, error type, and markup sanitizing for
//! AI-generated presentation markup.

pub mod error;
pub mod sanitize;
pub mod types;

pub use error::{Error, Result};
pub use sanitize::sanitize;
pub use types::{
    ChartContent, ChartRow, ContentBody, ContentItem, ItemFamily, LayoutType, SlideContent,
    SlideData, DEFAULT_CHART_TYPE, DEFAULT_SECTION_LAYOUT,
};
